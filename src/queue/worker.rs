// Consumer worker.
//
// Pulls jobs from the shared queue and drives each one through
// Received -> CacheCheck -> {CacheHit | Compute} -> Persisted -> Published.
// Terminal Failed is reached only when the answer engine exhausts its
// retry budget; cache and store failures degrade (miss / log) and never
// fail the job. Jobs are independent: nothing here is shared between jobs
// except the cache and the store, both internally synchronized.

use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

use super::JobQueue;
use crate::broadcast::ResultBroadcaster;
use crate::cache::{fingerprint, CacheEntry, FingerprintCache};
use crate::config::PipelineConfig;
use crate::engine::AnswerEngine;
use crate::models::{Answer, Job, PipelineStats, ResultEvent};
use crate::pipeline::selector::select_model;
use crate::pipeline::QuestionMetadata;
use crate::store::RecordStore;
use crate::utils::retry::with_backoff;

pub struct Worker {
    id: usize,
    queue: Arc<JobQueue>,
    cache: Arc<dyn FingerprintCache>,
    engine: Arc<dyn AnswerEngine>,
    store: Arc<dyn RecordStore>,
    broadcaster: ResultBroadcaster,
    stats: Arc<PipelineStats>,
    settings: PipelineConfig,
}

impl Worker {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: usize,
        queue: Arc<JobQueue>,
        cache: Arc<dyn FingerprintCache>,
        engine: Arc<dyn AnswerEngine>,
        store: Arc<dyn RecordStore>,
        broadcaster: ResultBroadcaster,
        stats: Arc<PipelineStats>,
        settings: PipelineConfig,
    ) -> Self {
        Self { id, queue, cache, engine, store, broadcaster, stats, settings }
    }

    /// Consume jobs until the queue shuts down and drains.
    pub async fn run(self) {
        info!(worker = self.id, "worker started");
        while let Some(job) = self.queue.dequeue().await {
            self.process_job(job).await;
        }
        info!(worker = self.id, "worker stopped");
    }

    /// Drive one job through the state machine. All error handling is
    /// internal; a bad job never takes the worker down with it.
    pub async fn process_job(&self, job: Job) {
        // Received
        info!(worker = self.id, job_id = %job.id, user = %job.user, "job received");
        let fp = fingerprint(&job.question, &job.document_ids);

        // CacheCheck: errors degrade to a miss
        let cached = match self.cache.get(&fp).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "cache lookup failed, treating as miss");
                None
            }
        };

        let answer = match cached {
            // CacheHit: fresh Answer for this job, model taken from the entry
            Some(entry) => {
                info!(job_id = %job.id, model = %entry.llm_model, "cache hit");
                Answer::from_cache(&job, entry.answer, entry.llm_model)
            }
            // Compute
            None => match self.compute(&job, &fp).await {
                Some(answer) => answer,
                None => return, // Failed; notification already published
            },
        };

        // Persisted: failure is logged and never blocks live delivery
        if let Err(e) = self.store.save(&answer).await {
            warn!(job_id = %job.id, error = %e, "persisting answer failed, publishing anyway");
        }

        // Published
        self.stats.record_processed(answer.cache_hit);
        self.broadcaster.publish(ResultEvent::Answer(answer));
        info!(worker = self.id, job_id = %job.id, "job done");
    }

    /// Select a model, invoke the engine with retries, write through the
    /// cache. Returns `None` after publishing a failure notification when
    /// the retry budget is exhausted.
    async fn compute(&self, job: &Job, fp: &str) -> Option<Answer> {
        let metadata = QuestionMetadata::extract(&job.question);
        let model = select_model(&job.question, &metadata, &self.settings.model_tiers);
        info!(job_id = %job.id, model = %model, intent = metadata.intent.as_str(), "computing answer");

        let generated = with_backoff(
            self.settings.max_retries,
            Duration::from_millis(self.settings.retry_backoff_ms),
            || self.engine.generate(&job.question, &job.document_ids, &model),
        )
        .await;

        match generated {
            Ok(text) => {
                let entry =
                    CacheEntry::new(text.clone(), model.clone(), self.settings.cache_ttl_secs);
                if let Err(e) = self.cache.put(fp, entry).await {
                    warn!(job_id = %job.id, error = %e, "cache write failed");
                }
                Some(Answer::fresh(job, text, model))
            }
            Err(e) => {
                error!(job_id = %job.id, error = %e, "engine failed after {} attempts", self.settings.max_retries);
                self.stats.record_failed();
                self.broadcaster.publish(ResultEvent::Failed {
                    job_id: job.id,
                    error: e.to_string(),
                });
                None
            }
        }
    }
}
