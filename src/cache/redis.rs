// Redis-backed fingerprint cache.
//
// Entries are JSON-encoded and stored with `SET EX`, so Redis handles
// expiry server-side; `is_expired` is still checked on read to cover a
// zero TTL and clock edge cases. Shared across processes, which makes it
// the backend of choice when several pipeline instances run side by side.

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;

use super::{CacheEntry, FingerprintCache};
use crate::config::RedisConfig;
use crate::types::{PipelineError, PipelineResult};

pub struct RedisCache {
    conn: ConnectionManager,
}

impl RedisCache {
    pub async fn connect(config: &RedisConfig) -> PipelineResult<Self> {
        let client = redis::Client::open(config.url.as_str())
            .map_err(|e| PipelineError::Cache(e.to_string()))?;
        let conn = client
            .get_connection_manager()
            .await
            .map_err(|e| PipelineError::Cache(e.to_string()))?;
        Ok(Self { conn })
    }
}

#[async_trait]
impl FingerprintCache for RedisCache {
    async fn get(&self, fingerprint: &str) -> PipelineResult<Option<CacheEntry>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(fingerprint)
            .await
            .map_err(|e| PipelineError::Cache(e.to_string()))?;

        let Some(raw) = raw else {
            return Ok(None);
        };
        let entry: CacheEntry =
            serde_json::from_str(&raw).map_err(|e| PipelineError::Cache(e.to_string()))?;
        if entry.is_expired(Utc::now()) {
            return Ok(None);
        }
        Ok(Some(entry))
    }

    async fn put(&self, fingerprint: &str, entry: CacheEntry) -> PipelineResult<()> {
        // SET with EX 0 is a Redis error; a zero-TTL entry is already expired
        if entry.ttl_secs == 0 {
            return Ok(());
        }
        let raw =
            serde_json::to_string(&entry).map_err(|e| PipelineError::Cache(e.to_string()))?;
        let mut conn = self.conn.clone();
        let _: () = conn
            .set_ex(fingerprint, raw, entry.ttl_secs)
            .await
            .map_err(|e| PipelineError::Cache(e.to_string()))?;
        Ok(())
    }
}
