// Ragline - Asynchronous RAG query pipeline with cache-aside deduplication
// and live result streaming

pub mod broadcast;
pub mod cache;
pub mod config;
pub mod engine;
pub mod models;
pub mod pipeline;
pub mod queue;
pub mod routes;
pub mod store;
pub mod types;
pub mod utils;

// Re-exports for convenience
pub use config::Config;
pub use models::AppState;
// Note: Import specific items from the types module instead of glob to avoid
// name conflicts, e.g. use ragline::types::{PipelineError, PipelineResult};

pub fn create_router(state: AppState) -> axum::Router {
    routes::create_router(state)
}
