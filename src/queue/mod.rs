// Job queue.
//
// Bounded in-process hand-off channel between the submission side and the
// consumer workers. FIFO, one delivery at a time per job: workers share a
// single receiver behind an async mutex, so a job goes to exactly one
// worker. `enqueue` fails closed when the queue is full or shut down;
// callers treat that as a retryable submission failure, never a silently
// lost job.

pub mod worker;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex as StdMutex;
use tokio::sync::{mpsc, Mutex};
use tracing::debug;

use crate::models::Job;
use crate::types::{PipelineError, PipelineResult};

pub use worker::Worker;

pub struct JobQueue {
    tx: StdMutex<Option<mpsc::Sender<Job>>>,
    rx: Mutex<mpsc::Receiver<Job>>,
    depth: AtomicUsize,
}

impl JobQueue {
    pub fn new(capacity: usize) -> Self {
        let (tx, rx) = mpsc::channel(capacity);
        Self {
            tx: StdMutex::new(Some(tx)),
            rx: Mutex::new(rx),
            depth: AtomicUsize::new(0),
        }
    }

    /// Accept a job. Fails closed with a submission error when the queue
    /// is full or shut down.
    pub fn enqueue(&self, job: Job) -> PipelineResult<()> {
        let guard = self
            .tx
            .lock()
            .map_err(|_| PipelineError::Submission("queue lock poisoned".to_string()))?;
        let tx = guard
            .as_ref()
            .ok_or_else(|| PipelineError::Submission("queue is shut down".to_string()))?;

        tx.try_send(job).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                PipelineError::Submission("queue is full, retry later".to_string())
            }
            mpsc::error::TrySendError::Closed(_) => {
                PipelineError::Submission("queue is unavailable".to_string())
            }
        })?;

        self.depth.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Wait for the next job. Returns `None` once the queue is shut down
    /// and drained; workers use that as their exit signal.
    pub async fn dequeue(&self) -> Option<Job> {
        let job = self.rx.lock().await.recv().await?;
        self.depth.fetch_sub(1, Ordering::Relaxed);
        debug!(job_id = %job.id, "job dequeued");
        Some(job)
    }

    /// Jobs accepted but not yet picked up by a worker.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::Relaxed)
    }

    /// Stop accepting jobs. Already-queued jobs are still delivered;
    /// workers exit once the backlog drains.
    pub fn shutdown(&self) {
        if let Ok(mut guard) = self.tx.lock() {
            guard.take();
        }
    }
}
