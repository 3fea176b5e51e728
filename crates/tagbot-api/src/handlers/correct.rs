//! Ad-hoc tag correction against an owner's vocabulary.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use tagbot_core::{CorrectionOutcome, MediaType, RejectedCorrection};

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct CorrectRequest {
    pub owner: i64,
    /// Media type name, possibly misspelled; the default type when absent.
    #[serde(default, rename = "type")]
    pub media_type: Option<String>,
    pub tags: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct CorrectResponse {
    #[serde(rename = "type")]
    pub media_type: MediaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_type: Option<RejectedCorrection>,
    #[serde(flatten)]
    pub outcome: CorrectionOutcome,
}

/// Returns `503` when no tag vocabulary is configured.
pub async fn correct_tags(
    State(state): State<AppState>,
    Json(req): Json<CorrectRequest>,
) -> Result<Json<CorrectResponse>, ApiError> {
    state.ensure_allowed(req.owner)?;
    let corrector = state.corrector()?;

    let (media_type, rejected_type) = match req.media_type.as_deref() {
        Some(raw) => match corrector.policy().resolve_media_type(raw) {
            Ok(t) => (t, None),
            Err(rejected) => (MediaType::default(), Some(rejected)),
        },
        None => (MediaType::default(), None),
    };

    let outcome = corrector.correct(req.owner, media_type, &req.tags).await?;
    Ok(Json(CorrectResponse {
        media_type,
        rejected_type,
        outcome,
    }))
}
