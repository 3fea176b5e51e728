//! Emoji extraction from free text.
//!
//! Splits text into "plain" emoji (no skin tone, no joiner) and the text that
//! remains once they are removed. Joined and toned emoji contribute only their
//! plain base codepoints.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::defaults::{EMOJI_KEYWORD_MAX_CHARS, EMOJI_KEYWORD_MIN_CHARS};

/// Variation selector 16, requests emoji presentation.
const VARIATION_SELECTOR: char = '\u{fe0f}';

/// Codepoints that modify or join emoji rather than being emoji themselves.
const EMOJI_MODIFIERS: [char; 6] = [
    // Skin tones
    '\u{1f3fb}',
    '\u{1f3fc}',
    '\u{1f3fd}',
    '\u{1f3fe}',
    '\u{1f3ff}',
    // Joiner
    '\u{200d}',
];

/// Every emoji from the Unicode table without skin tones or joins, with
/// surrounding variation selectors stripped.
static PLAIN_EMOJI: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    emojis::iter()
        .map(|e| e.as_str())
        .filter(|s| !s.chars().any(|c| EMOJI_MODIFIERS.contains(&c)))
        .map(|s| s.trim_matches(VARIATION_SELECTOR))
        .filter(|s| !s.is_empty())
        .collect()
});

/// Whether `s` is exactly one plain emoji.
pub fn is_plain_emoji(s: &str) -> bool {
    PLAIN_EMOJI.contains(s.trim_end_matches(VARIATION_SELECTOR))
}

/// Strip all emoji from `text`.
///
/// Returns the cleaned text and each plain emoji found, deduplicated in order
/// of first appearance. Graphemes that contain no emoji are kept verbatim.
///
/// ```
/// use tagbot_core::emoji::strip_emojis;
///
/// let (text, emoji) = strip_emojis("mugi💀");
/// assert_eq!(text, "mugi");
/// assert_eq!(emoji, vec!["💀"]);
/// ```
pub fn strip_emojis(text: &str) -> (String, Vec<String>) {
    let mut clean = String::with_capacity(text.len());
    let mut found: Vec<String> = Vec::new();
    let mut record = |e: &str| {
        if !found.iter().any(|f| f == e) {
            found.push(e.to_string());
        }
    };

    for grapheme in text.graphemes(true) {
        let stripped = grapheme.trim_end_matches(VARIATION_SELECTOR);
        if PLAIN_EMOJI.contains(stripped) {
            record(stripped);
            continue;
        }

        let mut has_emoji = false;
        let mut buf = [0u8; 4];
        for c in grapheme.chars() {
            let c: &str = c.encode_utf8(&mut buf);
            if PLAIN_EMOJI.contains(c) {
                record(c);
                has_emoji = true;
            }
        }
        if !has_emoji {
            clean.push_str(grapheme);
        }
    }

    (clean, found)
}

/// Tag suggestions for one emoji.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmojiKeywords {
    pub emoji: String,
    pub keywords: Vec<String>,
}

fn lookup(emoji: &str) -> Option<&'static emojis::Emoji> {
    emojis::get(emoji).or_else(|| emojis::get(&format!("{}{}", emoji, VARIATION_SELECTOR)))
}

fn is_keyword_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == ' ' || c == '-'
}

/// Tag-shaped keywords for one emoji, taken from its name, the words of its
/// name and its shortcodes.
///
/// Keywords are lowercase `[a-z0-9_]` of 2 to 12 characters. A keyword that
/// contains another suggested keyword is dropped in its favour, so
/// `["hug", "hugging"]` becomes `["hug"]`.
pub fn emoji_keywords(emoji: &str) -> Vec<String> {
    let Some(found) = lookup(emoji) else {
        return Vec::new();
    };
    let name = found.name().to_lowercase();
    let phrases = std::iter::once(name.clone())
        .chain(name.split_whitespace().map(str::to_string))
        .chain(found.shortcodes().map(|code| code.replace('_', " ")));

    let mut keywords: Vec<String> = Vec::new();
    for phrase in phrases {
        let len = phrase.chars().count();
        if !(EMOJI_KEYWORD_MIN_CHARS..=EMOJI_KEYWORD_MAX_CHARS).contains(&len)
            || !phrase.chars().all(is_keyword_char)
        {
            continue;
        }
        let keyword = phrase.replace([' ', '-'], "_");
        if !keywords.contains(&keyword) {
            keywords.push(keyword);
        }
    }

    keywords
        .iter()
        .filter(|k| !keywords.iter().any(|other| other != *k && k.contains(other.as_str())))
        .cloned()
        .collect()
}

/// Keyword suggestions for every plain emoji in `text` that has any, in
/// order of first appearance.
pub fn suggest_keywords(text: &str) -> Vec<EmojiKeywords> {
    let (_, found) = strip_emojis(text);
    found
        .into_iter()
        .filter_map(|emoji| {
            let keywords = emoji_keywords(&emoji);
            (!keywords.is_empty()).then_some(EmojiKeywords { emoji, keywords })
        })
        .collect()
}
