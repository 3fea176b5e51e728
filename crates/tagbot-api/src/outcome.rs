//! Result kind of a media-mode handler.

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::{Deserialize, Serialize};

/// What the transport gateway should do after a handler ran.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "reason", rename_all = "lowercase")]
pub enum HandlerOutcome {
    /// Handled; keep the current mode.
    Continue,
    /// Superseded or abandoned; end the current mode without a reply.
    Cancel,
    /// Refused; show the reason and end the current mode.
    Fail(String),
}

impl HandlerOutcome {
    pub fn status(&self) -> StatusCode {
        match self {
            HandlerOutcome::Continue => StatusCode::OK,
            HandlerOutcome::Cancel => StatusCode::CONFLICT,
            HandlerOutcome::Fail(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }

    pub fn is_continue(&self) -> bool {
        matches!(self, HandlerOutcome::Continue)
    }
}

impl IntoResponse for HandlerOutcome {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(serde_json::json!({ "outcome": self }))).into_response()
    }
}
