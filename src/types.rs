// Error taxonomy for the query pipeline.
//
// Failure classes map to how the worker reacts:
// - Submission: surfaced to the caller immediately, job never created
// - Engine: retried per policy, then surfaced as a failure notification
// - Store: logged, non-fatal, never blocks live delivery
// - Cache: treated as a miss, degrades to full computation

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("submission failed: {0}")]
    Submission(String),

    #[error("answer engine error: {0}")]
    Engine(String),

    #[error("record store error: {0}")]
    Store(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
