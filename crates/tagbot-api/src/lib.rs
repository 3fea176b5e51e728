//! # tagbot-api
//!
//! HTTP surface consumed by the chat transport gateway.
//!
//! Routes:
//! - `POST /v1/inline`: answer an inline search query
//! - `POST /v1/inline/selected`: record that an inline result was sent
//! - `POST /v1/parse`: explain how a query is parsed and corrected
//! - `POST /v1/media/tag`: apply tag edits to one item (or delete it)
//! - `DELETE /v1/media/:owner/:id`: delete one item
//! - `GET /v1/stats/:owner`: per-type counts of saved items
//! - `POST /v1/correct`: correct tags against the owner's vocabulary
//! - `POST /v1/mark/item`: mark or unmark one item for export
//! - `POST /v1/mark/query`: mark or unmark every item matching a query
//! - `POST /v1/emoji_tags`: suggest tags for emoji

pub mod config;
pub mod error;
pub mod handlers;
pub mod outcome;
pub mod services;
pub mod state;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{catch_panic::CatchPanicLayer, limit::RequestBodyLimitLayer, trace::TraceLayer};

pub use config::ApiConfig;
pub use error::ApiError;
pub use outcome::HandlerOutcome;
pub use state::AppState;

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/v1/inline", post(handlers::inline::inline_query))
        .route("/v1/inline/selected", post(handlers::inline::inline_selected))
        .route("/v1/parse", post(handlers::parse::parse))
        .route("/v1/media/tag", post(handlers::media::tag_media))
        .route("/v1/media/:owner/:id", delete(handlers::media::delete_media))
        .route("/v1/stats/:owner", get(handlers::stats::stats))
        .route("/v1/correct", post(handlers::correct::correct_tags))
        .route("/v1/mark/item", post(handlers::mark::mark_item))
        .route("/v1/mark/query", post(handlers::mark::mark_query))
        .route("/v1/emoji_tags", post(handlers::emoji_tags::emoji_tags))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .with_state(state)
}
