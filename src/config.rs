use anyhow::Result;
use serde::Deserialize;
use std::env;

use crate::pipeline::selector::ModelTiers;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub queue: QueueConfig,
    pub engine: EngineConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Unset means persistence runs on the in-memory store (no history
    /// across restarts; live delivery is unaffected).
    pub url: Option<String>,
    pub max_connections: u32,
    pub min_connections: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    /// Bounded queue capacity; `enqueue` fails closed when full.
    pub capacity: usize,
    pub workers: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// Base URL of an OpenAI-compatible chat-completions endpoint.
    pub base_url: String,
    pub api_key: String,
    pub temperature: f32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub cache_ttl_secs: u64,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
    pub model_tiers: ModelTiers,
    /// Documents assumed when a job names none. Empty means "all documents"
    /// is left to the answer engine.
    pub default_corpus: Vec<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        Ok(Self {
            server: ServerConfig {
                port: env::var("PORT")
                    .unwrap_or_else(|_| "3000".to_string())
                    .parse()?,
                host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                cors_allowed_origins: env::var("ALLOWED_ORIGINS")
                    .unwrap_or_else(|_| "http://localhost:3000,http://localhost:5173".to_string())
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .collect(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").ok(),
                max_connections: env::var("DB_MAX_CONNECTIONS")
                    .unwrap_or_else(|_| "10".to_string())
                    .parse()?,
                min_connections: env::var("DB_MIN_CONNECTIONS")
                    .unwrap_or_else(|_| "1".to_string())
                    .parse()?,
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string()),
                enabled: env::var("USE_REDIS_CACHE")
                    .unwrap_or_else(|_| "false".to_string())
                    .parse()?,
            },
            queue: QueueConfig {
                capacity: env::var("QUEUE_CAPACITY")
                    .unwrap_or_else(|_| "1024".to_string())
                    .parse()?,
                workers: env::var("WORKER_COUNT")
                    .unwrap_or_else(|_| "4".to_string())
                    .parse()?,
            },
            engine: EngineConfig {
                base_url: env::var("ENGINE_BASE_URL")
                    .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
                api_key: env::var("ENGINE_API_KEY").unwrap_or_default(),
                temperature: env::var("ENGINE_TEMPERATURE")
                    .unwrap_or_else(|_| "0.2".to_string())
                    .parse()?,
            },
            pipeline: PipelineConfig {
                cache_ttl_secs: env::var("CACHE_TTL_SECONDS")
                    .unwrap_or_else(|_| "3600".to_string())
                    .parse()?,
                max_retries: env::var("MAX_RETRIES")
                    .unwrap_or_else(|_| "3".to_string())
                    .parse()?,
                retry_backoff_ms: env::var("RETRY_BACKOFF_MS")
                    .unwrap_or_else(|_| "2000".to_string())
                    .parse()?,
                model_tiers: {
                    let mut tiers = match env::var("MODEL_TIERS") {
                        Ok(raw) => raw.parse::<ModelTiers>()?,
                        Err(_) => ModelTiers::default(),
                    };
                    tiers.prefer_quality = env::var("MODEL_PREFER_QUALITY")
                        .unwrap_or_else(|_| "false".to_string())
                        .parse()?;
                    tiers
                },
                default_corpus: env::var("DEFAULT_CORPUS")
                    .map(|s| {
                        s.split(',')
                            .map(|d| d.trim().to_string())
                            .filter(|d| !d.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
            },
        })
    }
}
