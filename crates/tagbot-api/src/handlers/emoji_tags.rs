//! Tag suggestions for emoji.

use axum::Json;
use serde::{Deserialize, Serialize};

use tagbot_core::{suggest_keywords, EmojiKeywords};

#[derive(Debug, Deserialize)]
pub struct EmojiTagsRequest {
    /// Free text or a sticker's declared emoji.
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct EmojiTagsResponse {
    pub suggestions: Vec<EmojiKeywords>,
    pub text: String,
}

fn describe(suggestions: &[EmojiKeywords]) -> String {
    if suggestions.is_empty() {
        return "No keywords found.".to_string();
    }
    suggestions
        .iter()
        .map(|s| format!("{} {}", s.emoji, s.keywords.join(" ")))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn emoji_tags(Json(req): Json<EmojiTagsRequest>) -> Json<EmojiTagsResponse> {
    let suggestions = suggest_keywords(&req.text);
    let text = describe(&suggestions);
    Json(EmojiTagsResponse { suggestions, text })
}
