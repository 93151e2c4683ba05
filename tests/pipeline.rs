// End-to-end pipeline tests: queue -> worker -> cache/engine -> store ->
// broadcast, using an in-process mock engine and memory-backed stores.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::Receiver;
use tokio::time::timeout;

use ragline::broadcast::ResultBroadcaster;
use ragline::cache::{FingerprintCache, MemoryCache};
use ragline::config::PipelineConfig;
use ragline::engine::AnswerEngine;
use ragline::models::{Answer, Job, PipelineStats, ResultEvent};
use ragline::pipeline::selector::ModelTiers;
use ragline::queue::{JobQueue, Worker};
use ragline::store::{MemoryStore, RecordStore};
use ragline::types::{PipelineError, PipelineResult};

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

struct MockEngine {
    calls: AtomicU32,
    fail: bool,
}

impl MockEngine {
    fn working() -> Arc<Self> {
        Arc::new(Self { calls: AtomicU32::new(0), fail: false })
    }

    fn broken() -> Arc<Self> {
        Arc::new(Self { calls: AtomicU32::new(0), fail: true })
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnswerEngine for MockEngine {
    async fn generate(
        &self,
        question: &str,
        _document_ids: &[String],
        model: &str,
    ) -> PipelineResult<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(PipelineError::Engine("engine unavailable".to_string()));
        }
        Ok(format!("answer[{model}]: {question}"))
    }
}

/// Store whose writes always fail; used to prove persistence failures
/// never block live delivery.
struct FailingStore;

#[async_trait]
impl RecordStore for FailingStore {
    async fn save(&self, _answer: &Answer) -> PipelineResult<()> {
        Err(PipelineError::Store("disk on fire".to_string()))
    }

    async fn recent(&self, _limit: i64) -> PipelineResult<Vec<Answer>> {
        Ok(Vec::new())
    }
}

fn settings(cache_ttl_secs: u64) -> PipelineConfig {
    PipelineConfig {
        cache_ttl_secs,
        max_retries: 3,
        retry_backoff_ms: 1,
        model_tiers: ModelTiers::default(),
        default_corpus: Vec::new(),
    }
}

struct Harness {
    queue: Arc<JobQueue>,
    store: Arc<dyn RecordStore>,
    broadcaster: ResultBroadcaster,
    stats: Arc<PipelineStats>,
}

impl Harness {
    fn start(
        workers: usize,
        engine: Arc<dyn AnswerEngine>,
        store: Arc<dyn RecordStore>,
        config: PipelineConfig,
    ) -> Self {
        let queue = Arc::new(JobQueue::new(64));
        let cache: Arc<dyn FingerprintCache> = Arc::new(MemoryCache::new());
        let broadcaster = ResultBroadcaster::new(64);
        let stats = Arc::new(PipelineStats::default());

        for id in 0..workers {
            let worker = Worker::new(
                id,
                queue.clone(),
                cache.clone(),
                engine.clone(),
                store.clone(),
                broadcaster.clone(),
                stats.clone(),
                config.clone(),
            );
            tokio::spawn(worker.run());
        }

        Self { queue, store, broadcaster, stats }
    }

    fn subscribe(&self) -> Receiver<ResultEvent> {
        self.broadcaster.subscribe()
    }
}

async fn next_event(rx: &mut Receiver<ResultEvent>) -> ResultEvent {
    timeout(RECV_TIMEOUT, rx.recv())
        .await
        .expect("timed out waiting for a result event")
        .expect("broadcast channel closed")
}

fn alice_job() -> Job {
    Job::new("Alice", "Summarize the introduction.", vec!["sample.pdf".to_string()])
}

#[tokio::test]
async fn test_first_submission_computes_and_second_hits_cache() {
    let engine = MockEngine::working();
    let harness = Harness::start(1, engine.clone(), Arc::new(MemoryStore::new()), settings(3600));
    let mut rx = harness.subscribe();

    harness.queue.enqueue(alice_job()).unwrap();
    let first = match next_event(&mut rx).await {
        ResultEvent::Answer(answer) => answer,
        other => panic!("expected an answer, got {other:?}"),
    };
    assert_eq!(first.user, "Alice");
    assert!(!first.answer.is_empty());
    assert!(!first.cache_hit);

    // same payload again, before the TTL expires
    let second_job = alice_job();
    harness.queue.enqueue(second_job.clone()).unwrap();
    let second = match next_event(&mut rx).await {
        ResultEvent::Answer(answer) => answer,
        other => panic!("expected an answer, got {other:?}"),
    };
    assert!(second.cache_hit);
    assert_eq!(second.llm_model, first.llm_model);
    assert_eq!(second.job_id, second_job.id);
    assert_eq!(engine.calls(), 1);

    // a cache hit still produces a fresh Answer record for the new job
    let recent = harness.store.recent(10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(harness.stats.cache_hits(), 1);
}

#[tokio::test]
async fn test_engine_exhaustion_publishes_single_failure_and_no_record() {
    let engine = MockEngine::broken();
    let harness = Harness::start(1, engine.clone(), Arc::new(MemoryStore::new()), settings(3600));
    let mut rx = harness.subscribe();

    let job = alice_job();
    let job_id = job.id;
    harness.queue.enqueue(job).unwrap();

    match next_event(&mut rx).await {
        ResultEvent::Failed { job_id: failed_id, error } => {
            assert_eq!(failed_id, job_id);
            assert!(error.contains("engine unavailable"));
        }
        other => panic!("expected a failure notification, got {other:?}"),
    }

    // retried exactly max_retries times, exactly one notification, no record
    assert_eq!(engine.calls(), 3);
    assert!(timeout(Duration::from_millis(200), rx.recv()).await.is_err());
    assert!(harness.store.recent(10).await.unwrap().is_empty());
    assert_eq!(harness.stats.failed(), 1);
}

#[tokio::test]
async fn test_persistence_failure_does_not_block_live_delivery() {
    let harness = Harness::start(1, MockEngine::working(), Arc::new(FailingStore), settings(3600));
    let mut rx = harness.subscribe();

    harness.queue.enqueue(alice_job()).unwrap();

    match next_event(&mut rx).await {
        ResultEvent::Answer(answer) => {
            assert_eq!(answer.user, "Alice");
            assert!(!answer.answer.is_empty());
        }
        other => panic!("expected an answer despite store failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_zero_ttl_never_serves_cache() {
    let engine = MockEngine::working();
    let harness = Harness::start(1, engine.clone(), Arc::new(MemoryStore::new()), settings(0));
    let mut rx = harness.subscribe();

    harness.queue.enqueue(alice_job()).unwrap();
    harness.queue.enqueue(alice_job()).unwrap();

    for _ in 0..2 {
        match next_event(&mut rx).await {
            ResultEvent::Answer(answer) => assert!(!answer.cache_hit),
            other => panic!("expected an answer, got {other:?}"),
        }
    }
    assert_eq!(engine.calls(), 2);
}

#[tokio::test]
async fn test_two_workers_process_distinct_fingerprints_independently() {
    let engine = MockEngine::working();
    let harness = Harness::start(2, engine.clone(), Arc::new(MemoryStore::new()), settings(3600));
    let mut rx = harness.subscribe();

    harness
        .queue
        .enqueue(Job::new("Alice", "Summarize the introduction.", vec!["a.pdf".to_string()]))
        .unwrap();
    harness
        .queue
        .enqueue(Job::new("Bob", "Who wrote the appendix?", vec!["b.pdf".to_string()]))
        .unwrap();

    let mut users = Vec::new();
    for _ in 0..2 {
        match next_event(&mut rx).await {
            ResultEvent::Answer(answer) => {
                assert!(!answer.cache_hit);
                users.push(answer.user);
            }
            other => panic!("expected an answer, got {other:?}"),
        }
    }
    users.sort();
    assert_eq!(users, vec!["Alice".to_string(), "Bob".to_string()]);

    // both persisted, no cross-job ordering assumed
    assert_eq!(harness.store.recent(10).await.unwrap().len(), 2);
    assert_eq!(engine.calls(), 2);
}
