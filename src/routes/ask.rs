use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde_json::json;
use tracing::info;

use crate::models::{AppState, AskRequest, AskResponse, Job};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ask", post(ask))
        .with_state(state)
}

/// Accept a question and queue it for asynchronous processing. The answer
/// arrives on the live feed; this handler only acknowledges submission.
async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AskResponse>, (StatusCode, Json<serde_json::Value>)> {
    let question = request
        .question
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    if question.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"error": "question required"})),
        ));
    }

    let user = request
        .user
        .filter(|u| !u.trim().is_empty())
        .unwrap_or_else(|| "web_user".to_string());
    let document_ids = if request.document_ids.is_empty() {
        state.config.pipeline.default_corpus.clone()
    } else {
        request.document_ids
    };

    let job = Job::new(user, question, document_ids);
    let job_id = job.id;
    info!(job_id = %job_id, user = %job.user, "submitting job");

    state.queue.enqueue(job).map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"error": e.to_string()})),
        )
    })?;

    Ok(Json(AskResponse { status: "queued".to_string(), job_id }))
}
