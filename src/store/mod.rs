// Record store boundary.
//
// Completed query/answer pairs land here. Persistence is best effort from
// the pipeline's point of view: a failed `save` is logged by the worker
// and never blocks live delivery.

pub mod postgres;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::models::Answer;
use crate::types::PipelineResult;

pub use postgres::PgRecordStore;

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn save(&self, answer: &Answer) -> PipelineResult<()>;

    /// Most recent answers first.
    async fn recent(&self, limit: i64) -> PipelineResult<Vec<Answer>>;
}

/// In-process store used for tests and database-less runs. History does
/// not survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    answers: RwLock<Vec<Answer>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn save(&self, answer: &Answer) -> PipelineResult<()> {
        self.answers.write().await.push(answer.clone());
        Ok(())
    }

    async fn recent(&self, limit: i64) -> PipelineResult<Vec<Answer>> {
        let answers = self.answers.read().await;
        let limit = usize::try_from(limit).unwrap_or(0);
        Ok(answers.iter().rev().take(limit).cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Job;

    fn answer(question: &str) -> Answer {
        let job = Job::new("alice", question, vec![]);
        Answer::fresh(&job, format!("answer to {question}"), "gpt-4o-mini".to_string())
    }

    #[tokio::test]
    async fn test_recent_returns_newest_first() {
        let store = MemoryStore::new();
        store.save(&answer("first")).await.unwrap();
        store.save(&answer("second")).await.unwrap();
        store.save(&answer("third")).await.unwrap();

        let recent = store.recent(2).await.unwrap();
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].question, "third");
        assert_eq!(recent[1].question, "second");
    }

    #[tokio::test]
    async fn test_recent_with_zero_limit_is_empty() {
        let store = MemoryStore::new();
        store.save(&answer("only")).await.unwrap();
        assert!(store.recent(0).await.unwrap().is_empty());
    }
}
