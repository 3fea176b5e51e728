//! Transfer marks: selecting saved items for export.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use tagbot_core::fields::{DELETE, YES};
use tagbot_core::{parse_query, DocumentId, TypeHistogram};
use tagbot_search::{CompileOptions, SearchCompiler};

use crate::{ApiError, AppState};

fn marked_by_default() -> bool {
    true
}

#[derive(Debug, Deserialize)]
pub struct MarkItemRequest {
    pub owner: i64,
    pub media_id: i64,
    #[serde(default = "marked_by_default")]
    pub marked: bool,
}

#[derive(Debug, Deserialize)]
pub struct MarkQueryRequest {
    pub owner: i64,
    /// Inline query selecting the items; every item of the owner when absent.
    #[serde(default)]
    pub query: Option<String>,
    /// Defaults to unmarking for `delete:yes` queries and for the whole
    /// collection, marking otherwise.
    #[serde(default)]
    pub marked: Option<bool>,
}

#[derive(Debug, Serialize)]
pub struct MarkResponse {
    pub marked: bool,
    pub updated: u64,
    /// Counts restricted to marked items after the update.
    pub histogram: TypeHistogram,
    pub text: String,
}

fn describe(marked: bool, updated: u64, histogram: &TypeHistogram) -> String {
    let verb = if marked { "Selected" } else { "Unselected" };
    let summary = if histogram.sub_total.unwrap_or(0) > 0 {
        format!("Here's a summary of what will be exported:\n{}", histogram.pretty())
    } else {
        "No items are marked to be exported.".to_string()
    };
    format!("{} {} item(s) for export\n{}", verb, updated, summary)
}

async fn respond(
    state: &AppState,
    owner: i64,
    marked: bool,
    updated: u64,
) -> Result<Json<MarkResponse>, ApiError> {
    let histogram = state.store.count_by_type(owner, true).await?;
    let text = describe(marked, updated, &histogram);
    Ok(Json(MarkResponse {
        marked,
        updated,
        histogram,
        text,
    }))
}

/// Mark or unmark one item. Returns `404` when it is not saved.
pub async fn mark_item(
    State(state): State<AppState>,
    Json(req): Json<MarkItemRequest>,
) -> Result<Json<MarkResponse>, ApiError> {
    state.ensure_allowed(req.owner)?;
    let id = DocumentId::new(req.owner, req.media_id);
    if !state.store.mark(id, req.marked).await? {
        return Err(ApiError::NotFound(format!("media {} is not saved", req.media_id)));
    }
    respond(&state, req.owner, req.marked, 1).await
}

/// Mark or unmark every item matching an inline query.
pub async fn mark_query(
    State(state): State<AppState>,
    Json(req): Json<MarkQueryRequest>,
) -> Result<Json<MarkResponse>, ApiError> {
    state.ensure_allowed(req.owner)?;

    let (clause, marked) = match req.query.as_deref() {
        Some(text) => {
            let query = parse_query(text);
            let is_delete = query.get_first(DELETE, false) == Some(YES);
            let request = SearchCompiler::new(state.registry).compile(
                req.owner,
                &query,
                &CompileOptions::default(),
            );
            (request.query.to_json(), req.marked.unwrap_or(!is_delete))
        }
        None => (json!({"match_all": {}}), req.marked.unwrap_or(false)),
    };

    let updated = state.store.mark_matching(req.owner, &clause, marked).await?;
    info!(
        subsystem = "api",
        component = "mark",
        owner_id = req.owner,
        marked = marked,
        result_count = updated,
        "Transfer marks updated"
    );
    respond(&state, req.owner, marked, updated).await
}
