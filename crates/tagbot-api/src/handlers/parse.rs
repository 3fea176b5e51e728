//! The parse command: explain how a query was understood.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use tagbot_core::{parse_query, RejectedCorrection};

use crate::{ApiError, AppState};

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    pub owner: i64,
    /// Query to explain; the owner's last inline query when absent.
    pub query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ParseResponse {
    pub query: String,
    pub report: String,
    /// Canonical form of the query.
    pub pretty: String,
    pub warnings: Vec<String>,
    /// Canonical form after tag correction, when a vocabulary is configured.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected: Option<String>,
    /// One line per tag or type that had no confident correction.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dropped: Vec<String>,
}

/// `input ≉ nearest (Δ=NN%)`
pub fn describe_rejection(rejected: &RejectedCorrection) -> String {
    format!(
        "{} ≉ {} (Δ={}%)",
        rejected.input,
        rejected.nearest.as_deref().unwrap_or("?"),
        (rejected.distance * 100.0).round() as i64
    )
}

pub async fn parse(
    State(state): State<AppState>,
    Json(req): Json<ParseRequest>,
) -> Result<Json<ParseResponse>, ApiError> {
    state.ensure_allowed(req.owner)?;
    let text = match req.query {
        Some(query) => query,
        None => state
            .last_query
            .get(req.owner)
            .await
            .ok_or_else(|| ApiError::NotFound("No previous query found.".to_string()))?,
    };

    let query = parse_query(&text);
    let mut response = ParseResponse {
        report: query.report(state.registry),
        pretty: query.pretty(state.registry),
        warnings: query.warnings().iter().map(ToString::to_string).collect(),
        query: text,
        corrected: None,
        dropped: Vec::new(),
    };

    if let Some(corrector) = &state.corrector {
        let corrected = corrector.correct_query(req.owner, &query).await?;
        response.corrected = Some(corrected.query.pretty(state.registry));
        response.dropped = corrected
            .rejected_type
            .iter()
            .chain(&corrected.tags.rejected)
            .chain(&corrected.negated_tags.rejected)
            .map(describe_rejection)
            .collect();
    }

    Ok(Json(response))
}
