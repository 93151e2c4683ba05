//! API Routes
//!
//! This module organizes the HTTP boundary of the pipeline:
//! - `POST /api/ask` - Submit a question for asynchronous answering
//! - `GET /api/answers/recent` - Recent answer history (late-joiner backfill)
//! - `GET /ws/results` - Live result feed (WebSocket)
//! - `GET /api/stats` - Queue depth and processing counters
//! - `GET /api/health` - Health check

pub mod answers;
pub mod ask;
pub mod health;
pub mod live;
pub mod stats;

use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(ask::router(state.clone()))
        .merge(answers::router(state.clone()))
        .merge(live::router(state.clone()))
        .merge(stats::router(state.clone()))
        .merge(health::router(state))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
