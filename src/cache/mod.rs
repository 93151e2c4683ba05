// Cache-aside fingerprint cache.
//
// The worker checks here before computing and writes through after. The
// cache itself knows nothing about the computation; entries are passive
// records with a TTL. `get` never returns an expired entry. Concurrent
// `put`s for the same fingerprint are last-write-wins: only requests
// arriving after a completed `put` are guaranteed a hit.

pub mod redis;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::types::PipelineResult;

pub use redis::RedisCache;

const KEY_PREFIX: &str = "rag_cache:";

/// Deterministic digest of a normalized question plus its sorted document
/// set. Two jobs with the same fingerprint request the same answer.
pub fn fingerprint(question: &str, document_ids: &[String]) -> String {
    let normalized = question
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");

    let mut docs: Vec<&str> = document_ids.iter().map(String::as_str).collect();
    docs.sort_unstable();

    let mut hasher = Sha256::new();
    hasher.update(docs.join(",").as_bytes());
    hasher.update(b":");
    hasher.update(normalized.as_bytes());
    format!("{KEY_PREFIX}{}", hex::encode(hasher.finalize()))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub answer: String,
    pub llm_model: String,
    pub created_at: DateTime<Utc>,
    pub ttl_secs: u64,
}

impl CacheEntry {
    pub fn new(answer: String, llm_model: String, ttl_secs: u64) -> Self {
        Self { answer, llm_model, created_at: Utc::now(), ttl_secs }
    }

    /// A zero TTL is expired from the moment it is created.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        let Ok(secs) = i64::try_from(self.ttl_secs) else {
            return false;
        };
        now >= self.created_at + Duration::seconds(secs)
    }
}

#[async_trait]
pub trait FingerprintCache: Send + Sync {
    /// Look up a fingerprint. Never returns an expired entry.
    async fn get(&self, fingerprint: &str) -> PipelineResult<Option<CacheEntry>>;

    async fn put(&self, fingerprint: &str, entry: CacheEntry) -> PipelineResult<()>;
}

/// In-process cache with lazy expiry: expired entries are evicted when read.
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FingerprintCache for MemoryCache {
    async fn get(&self, fingerprint: &str) -> PipelineResult<Option<CacheEntry>> {
        let now = Utc::now();
        let expired = {
            let entries = self.entries.read().await;
            match entries.get(fingerprint) {
                Some(entry) if entry.is_expired(now) => true,
                Some(entry) => return Ok(Some(entry.clone())),
                None => return Ok(None),
            }
        };

        if expired {
            let mut entries = self.entries.write().await;
            // recheck under the write lock; a fresher put may have landed
            if entries.get(fingerprint).is_some_and(|e| e.is_expired(now)) {
                entries.remove(fingerprint);
            }
        }
        Ok(None)
    }

    async fn put(&self, fingerprint: &str, entry: CacheEntry) -> PipelineResult<()> {
        self.entries
            .write()
            .await
            .insert(fingerprint.to_string(), entry);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fingerprint_normalizes_question_text() {
        let docs = vec!["a.pdf".to_string()];
        let a = fingerprint("Summarize the introduction.", &docs);
        let b = fingerprint("  summarize   THE introduction.  ", &docs);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_ignores_document_order() {
        let a = fingerprint("q", &["b.pdf".to_string(), "a.pdf".to_string()]);
        let b = fingerprint("q", &["a.pdf".to_string(), "b.pdf".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_fingerprint_distinguishes_document_sets() {
        let a = fingerprint("q", &["a.pdf".to_string()]);
        let b = fingerprint("q", &["b.pdf".to_string()]);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_put_then_get_round_trip() {
        let cache = MemoryCache::new();
        let entry = CacheEntry::new("answer".into(), "gpt-4o".into(), 60);
        cache.put("fp", entry).await.unwrap();

        let got = cache.get("fp").await.unwrap().unwrap();
        assert_eq!(got.answer, "answer");
        assert_eq!(got.llm_model, "gpt-4o");
    }

    #[tokio::test]
    async fn test_zero_ttl_entry_is_never_served() {
        let cache = MemoryCache::new();
        cache
            .put("fp", CacheEntry::new("answer".into(), "gpt-4o".into(), 0))
            .await
            .unwrap();
        assert!(cache.get("fp").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_elapsed_entry_is_evicted() {
        let cache = MemoryCache::new();
        let mut entry = CacheEntry::new("answer".into(), "gpt-4o".into(), 10);
        entry.created_at = Utc::now() - Duration::seconds(11);
        cache.put("fp", entry).await.unwrap();

        assert!(cache.get("fp").await.unwrap().is_none());
        // evicted, not just hidden
        assert!(cache.entries.read().await.get("fp").is_none());
    }

    #[tokio::test]
    async fn test_last_write_wins_on_same_fingerprint() {
        let cache = MemoryCache::new();
        cache
            .put("fp", CacheEntry::new("first".into(), "gpt-4o-mini".into(), 60))
            .await
            .unwrap();
        cache
            .put("fp", CacheEntry::new("second".into(), "gpt-4o".into(), 60))
            .await
            .unwrap();

        let got = cache.get("fp").await.unwrap().unwrap();
        assert_eq!(got.answer, "second");
    }
}
