//! HTTP handlers for tagbot-api.

pub mod correct;
pub mod emoji_tags;
pub mod inline;
pub mod mark;
pub mod media;
pub mod parse;
pub mod stats;

use axum::{response::IntoResponse, Json};

pub async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
