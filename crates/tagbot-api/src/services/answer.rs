//! Shaping search hits into an inline-query answer.

use serde::{Deserialize, Serialize};

use tagbot_core::defaults;
use tagbot_core::{MediaType, SearchPage, TaggedDocument};
use tagbot_search::Pagination;

use super::result_id::InlineResultId;

/// Parameter sent with the switch-to-PM button when a query had warnings.
pub const SWITCH_PM_PARSE: &str = "parse";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultKind {
    Photo,
    Document,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineResult {
    pub kind: ResultKind,
    pub id: String,
    pub media_id: i64,
    pub access_hash: i64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwitchPm {
    pub text: String,
    pub param: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlineAnswer {
    pub results: Vec<InlineResult>,
    pub cache_time: u32,
    pub private: bool,
    pub next_offset: Option<String>,
    pub switch_pm: Option<SwitchPm>,
}

/// Type the transport is asked to present results as.
///
/// The transport can only show mp3 audio as audio, so audio goes out as a
/// plain file.
pub fn presented_type(requested: MediaType) -> MediaType {
    match requested {
        MediaType::Audio => MediaType::File,
        other => other,
    }
}

/// Space-joined tags, cut back to a word boundary with `…` when longer than
/// `max_chars`.
pub fn truncate_tags(tags: &[String], max_chars: usize) -> Option<String> {
    let joined = tags.join(" ");
    if joined.is_empty() {
        return None;
    }
    if joined.chars().count() <= max_chars {
        return Some(joined);
    }
    let cut: String = joined.chars().take(max_chars).collect();
    let kept = match cut.rsplit_once(' ') {
        Some((head, _)) if !head.is_empty() => head.to_string(),
        _ => cut,
    };
    Some(format!("{}…", kept))
}

fn result_title(document: &TaggedDocument, presented: MediaType) -> String {
    if !document.title.is_empty() {
        return document.title.clone();
    }
    truncate_tags(&document.tags, defaults::INLINE_TITLE_MAX_CHARS)
        .unwrap_or_else(|| format!("[{}]", presented))
}

/// Build the answer for one page of hits.
///
/// Answers for queries with warnings are not cached by the transport and
/// offer a button that explains the warnings.
pub fn build_answer(
    requested: MediaType,
    page: &SearchPage,
    pagination: Pagination,
    warning_count: usize,
    skip_last_used: bool,
) -> InlineAnswer {
    let presented = presented_type(requested);
    let results = page
        .documents
        .iter()
        .map(|doc| {
            let id = InlineResultId::new(doc.id, skip_last_used).encode();
            if presented == MediaType::Photo {
                InlineResult {
                    kind: ResultKind::Photo,
                    id,
                    media_id: doc.id,
                    access_hash: doc.access_hash,
                    media_type: presented,
                    title: None,
                }
            } else {
                InlineResult {
                    kind: ResultKind::Document,
                    id,
                    media_id: doc.id,
                    access_hash: doc.access_hash,
                    media_type: presented,
                    title: Some(result_title(doc, presented)),
                }
            }
        })
        .collect();

    InlineAnswer {
        results,
        cache_time: if warning_count > 0 {
            0
        } else {
            defaults::INLINE_CACHE_TIME
        },
        private: true,
        next_offset: pagination.next_token(page.total),
        switch_pm: (warning_count > 0).then(|| SwitchPm {
            text: format!("{} warnings", warning_count),
            param: SWITCH_PM_PARSE.to_string(),
        }),
    }
}
