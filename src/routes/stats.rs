use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, StatsResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/stats", get(stats))
        .with_state(state)
}

/// Queue backlog and processing counters. Useful for spotting whether the
/// producers are outpacing the workers.
async fn stats(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        queue_depth: state.queue.depth(),
        processed: state.stats.processed(),
        cache_hits: state.stats.cache_hits(),
        failed: state.stats.failed(),
    })
}
