//! Per-owner statistics.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use tagbot_core::TypeHistogram;

use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    /// Count only items in the marked set.
    #[serde(default)]
    pub marked: bool,
}

#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub histogram: TypeHistogram,
    pub text: String,
}

pub async fn stats(
    State(state): State<AppState>,
    Path(owner): Path<i64>,
    Query(params): Query<StatsParams>,
) -> Result<Json<StatsResponse>, ApiError> {
    state.ensure_allowed(owner)?;
    let histogram = state.store.count_by_type(owner, params.marked).await?;
    let text = if histogram.total == 0 {
        "You have not saved any media. Send /start to get started.".to_string()
    } else {
        format!(
            "Here's a summary of what you have saved:\n{}",
            histogram.pretty()
        )
    };
    Ok(Json(StatsResponse { histogram, text }))
}
