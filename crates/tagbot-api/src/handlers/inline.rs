//! Inline search and result selection.

use std::time::Instant;

use axum::{
    extract::State,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tagbot_core::fields::{DELETE, TAGS, TYPE, YES};
use tagbot_core::{parse_query, CorrectionOutcome, DocumentId, MediaType, ParsedQuery};
use tagbot_search::{CompileOptions, Pagination, SearchCompiler};

use crate::services::{build_answer, InlineAnswer, InlineResultId};
use crate::{ApiError, AppState, HandlerOutcome};

#[derive(Debug, Deserialize)]
pub struct InlineQueryRequest {
    pub owner: i64,
    #[serde(default)]
    pub query: String,
    /// Opaque offset token from the previous page.
    #[serde(default)]
    pub offset: String,
    #[serde(default)]
    pub skip_last_used: bool,
}

/// Answer an inline query.
///
/// A newer query from the same owner cancels this one; the cancelled
/// request gets `409` with a `cancel` outcome.
pub async fn inline_query(
    State(state): State<AppState>,
    Json(req): Json<InlineQueryRequest>,
) -> Result<Response, ApiError> {
    state.ensure_allowed(req.owner)?;
    state.last_query.remember(req.owner, &req.query).await;

    let ticket = state.inline.begin(req.owner).await;
    let token = ticket.token().clone();
    let answer = tokio::select! {
        biased;
        _ = token.cancelled() => None,
        answer = answer_inline(&state, &req) => Some(answer),
    };
    state.inline.finish(ticket).await;

    match answer {
        Some(answer) => Ok(Json(answer?).into_response()),
        None => {
            debug!(
                subsystem = "api",
                component = "inline",
                owner_id = req.owner,
                "Inline query superseded"
            );
            Ok(HandlerOutcome::Cancel.into_response())
        }
    }
}

async fn answer_inline(state: &AppState, req: &InlineQueryRequest) -> Result<InlineAnswer, ApiError> {
    let start = Instant::now();
    let mut query = parse_query(&req.query);
    if let Some(corrector) = &state.corrector {
        let corrected = corrector.correct_query(req.owner, &query).await?;
        apply_corrections(&mut query, false, &corrected.tags);
        apply_corrections(&mut query, true, &corrected.negated_tags);
    }

    let requested: MediaType = query
        .get_first(TYPE, false)
        .and_then(|t| t.parse().ok())
        .unwrap_or_default();
    let pagination = Pagination::from_token(&req.offset, state.config.inline_page_size);
    let request = SearchCompiler::new(state.registry).compile(
        req.owner,
        &query,
        &CompileOptions::inline(pagination),
    );
    let page = state.store.search(&request.to_json()).await?;

    let skip_last_used = req.skip_last_used || query.get_first(DELETE, false) == Some(YES);
    let answer = build_answer(
        requested,
        &page,
        pagination,
        query.warnings().len(),
        skip_last_used,
    );

    info!(
        subsystem = "api",
        component = "inline",
        op = "inline_query",
        owner_id = req.owner,
        result_count = answer.results.len(),
        total_count = page.total,
        warning_count = query.warnings().len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Inline query answered"
    );
    Ok(answer)
}

/// Swap confidently corrected tags in, keeping the rest as typed so they
/// can still match titles and file names.
fn apply_corrections(query: &mut ParsedQuery, negated: bool, outcome: &CorrectionOutcome) {
    let values: Vec<String> = query
        .get(TAGS, negated)
        .iter()
        .map(|value| {
            outcome
                .accepted
                .iter()
                .find(|a| &a.input == value)
                .map(|a| a.corrected.clone())
                .unwrap_or_else(|| value.clone())
        })
        .collect();
    query.replace(TAGS, negated, values);
}

#[derive(Debug, Deserialize)]
pub struct InlineSelectedRequest {
    pub owner: i64,
    pub result_id: String,
}

#[derive(Debug, Serialize)]
pub struct InlineSelectedResponse {
    pub touched: bool,
}

/// Record that an inline result was sent, updating its `last_used` time
/// unless the result id says otherwise.
pub async fn inline_selected(
    State(state): State<AppState>,
    Json(req): Json<InlineSelectedRequest>,
) -> Result<Json<InlineSelectedResponse>, ApiError> {
    state.ensure_allowed(req.owner)?;
    let result_id = InlineResultId::decode(&req.result_id)?;
    if result_id.skip_last_used {
        return Ok(Json(InlineSelectedResponse { touched: false }));
    }

    state
        .store
        .touch(
            DocumentId::new(req.owner, result_id.media_id),
            chrono::Utc::now().timestamp(),
        )
        .await?;
    Ok(Json(InlineSelectedResponse { touched: true }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tagbot_core::AcceptedCorrection;

    #[test]
    fn test_apply_corrections_keeps_unmatched_values() {
        let mut query = parse_query("kiten zzz !dgo");
        let outcome = CorrectionOutcome {
            accepted: vec![AcceptedCorrection {
                input: "kiten".into(),
                corrected: "kitten".into(),
            }],
            rejected: vec![],
        };
        apply_corrections(&mut query, false, &outcome);
        assert_eq!(query.get(TAGS, false), ["kitten".to_string(), "zzz".to_string()]);
        assert_eq!(query.get(TAGS, true), ["dgo".to_string()]);
    }
}
