use axum::{extract::State, routing::get, Json, Router};

use crate::models::{AppState, HealthResponse};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
        database: if state.config.database.url.is_some() {
            "postgres".to_string()
        } else {
            "memory".to_string()
        },
        redis: state.config.redis.enabled.then(|| "enabled".to_string()),
    };

    Json(response)
}
