use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::broadcast::ResultBroadcaster;
use crate::config::Config;
use crate::queue::JobQueue;
use crate::store::RecordStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub queue: Arc<JobQueue>,
    pub store: Arc<dyn RecordStore>,
    pub broadcaster: ResultBroadcaster,
    pub stats: Arc<PipelineStats>,
}

// Core records
// Note: FromRow is needed for runtime query_as (without DATABASE_URL at compile time)

/// A unit of work accepted by the queue. Immutable once submitted.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct Job {
    pub id: uuid::Uuid,
    pub user: String,
    pub question: String,
    /// Ordered corpus references; empty means the default corpus.
    pub document_ids: Vec<String>,
    pub submitted_at: chrono::DateTime<chrono::Utc>,
}

impl Job {
    pub fn new(user: impl Into<String>, question: impl Into<String>, document_ids: Vec<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            user: user.into(),
            question: question.into(),
            document_ids,
            submitted_at: chrono::Utc::now(),
        }
    }
}

/// A completed query/answer pair. Produced exactly once per job, even when
/// the underlying fingerprint was served from cache.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct Answer {
    pub job_id: uuid::Uuid,
    // "user" is reserved in Postgres; the column is "username"
    #[sqlx(rename = "username")]
    pub user: String,
    pub question: String,
    pub answer: String,
    pub llm_model: String,
    pub cache_hit: bool,
    pub completed_at: chrono::DateTime<chrono::Utc>,
}

impl Answer {
    pub fn fresh(job: &Job, answer: String, llm_model: String) -> Self {
        Self::build(job, answer, llm_model, false)
    }

    pub fn from_cache(job: &Job, answer: String, llm_model: String) -> Self {
        Self::build(job, answer, llm_model, true)
    }

    fn build(job: &Job, answer: String, llm_model: String, cache_hit: bool) -> Self {
        Self {
            job_id: job.id,
            user: job.user.clone(),
            question: job.question.clone(),
            answer,
            llm_model,
            cache_hit,
            completed_at: chrono::Utc::now(),
        }
    }
}

/// Live-feed payload pushed to connected subscribers. Best effort: no
/// history, no delivery guarantee.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResultEvent {
    Answer(Answer),
    Failed { job_id: uuid::Uuid, error: String },
}

// API request/response types

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AskRequest {
    pub user: Option<String>,
    pub question: Option<String>,
    #[serde(default)]
    pub document_ids: Vec<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct AskResponse {
    pub status: String,
    pub job_id: uuid::Uuid,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub database: String,
    pub redis: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StatsResponse {
    pub queue_depth: usize,
    pub processed: u64,
    pub cache_hits: u64,
    pub failed: u64,
}

/// Shared processing counters, bumped by workers and read by `/api/stats`.
#[derive(Debug, Default)]
pub struct PipelineStats {
    processed: AtomicU64,
    cache_hits: AtomicU64,
    failed: AtomicU64,
}

impl PipelineStats {
    pub fn record_processed(&self, cache_hit: bool) {
        self.processed.fetch_add(1, Ordering::Relaxed);
        if cache_hit {
            self.cache_hits.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failed(&self) {
        self.failed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn cache_hits(&self) -> u64 {
        self.cache_hits.load(Ordering::Relaxed)
    }

    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}
