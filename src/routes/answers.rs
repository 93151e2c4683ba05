use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::models::{AppState, Answer};

const DEFAULT_LIMIT: i64 = 20;
const MAX_LIMIT: i64 = 100;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/answers/recent", get(recent))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RecentParams {
    limit: Option<i64>,
}

/// Recent answers, newest first. This is the backfill path for clients
/// that connect to the live feed after results were published.
async fn recent(
    State(state): State<AppState>,
    Query(params): Query<RecentParams>,
) -> Result<Json<Vec<Answer>>, (StatusCode, Json<serde_json::Value>)> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);

    let answers = state.store.recent(limit).await.map_err(|e| {
        error!(error = %e, "recent answers query failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({"error": "history unavailable"})),
        )
    })?;

    Ok(Json(answers))
}
