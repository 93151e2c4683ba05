use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use ragline::broadcast::ResultBroadcaster;
use ragline::cache::{FingerprintCache, MemoryCache, RedisCache};
use ragline::config::Config;
use ragline::engine::{AnswerEngine, OpenAiEngine};
use ragline::models::{AppState, PipelineStats};
use ragline::queue::{JobQueue, Worker};
use ragline::store::{MemoryStore, PgRecordStore, RecordStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ragline=debug,tower_http=debug,axum=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Configuration loaded: {:?}", config.server);

    // Record store: Postgres when configured, in-memory otherwise
    let store: Arc<dyn RecordStore> = match &config.database.url {
        Some(url) => {
            info!("Connecting to Postgres record store");
            Arc::new(PgRecordStore::connect(url, &config.database).await?)
        }
        None => {
            info!("DATABASE_URL not set, using in-memory record store");
            Arc::new(MemoryStore::new())
        }
    };

    // Fingerprint cache: Redis when enabled, in-memory otherwise
    let cache: Arc<dyn FingerprintCache> = if config.redis.enabled {
        info!("Connecting to Redis fingerprint cache");
        Arc::new(
            RedisCache::connect(&config.redis)
                .await
                .map_err(|e| anyhow::anyhow!("redis connection failed: {e}"))?,
        )
    } else {
        Arc::new(MemoryCache::new())
    };

    let engine: Arc<dyn AnswerEngine> = Arc::new(OpenAiEngine::new(&config.engine));
    let queue = Arc::new(JobQueue::new(config.queue.capacity));
    let broadcaster = ResultBroadcaster::default();
    let stats = Arc::new(PipelineStats::default());

    // Spawn consumer workers
    for id in 0..config.queue.workers {
        let worker = Worker::new(
            id,
            queue.clone(),
            cache.clone(),
            engine.clone(),
            store.clone(),
            broadcaster.clone(),
            stats.clone(),
            config.pipeline.clone(),
        );
        tokio::spawn(worker.run());
    }
    info!("Spawned {} consumer workers", config.queue.workers);

    // Create shared state and router
    let state = AppState {
        config: config.clone(),
        queue,
        store,
        broadcaster,
        stats,
    };
    let app = ragline::create_router(state);

    // Start server
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);
    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .await
        .map_err(|e| anyhow::anyhow!("Server error: {}", e))?;

    Ok(())
}
