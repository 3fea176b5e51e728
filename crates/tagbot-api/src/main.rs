//! tagbot-api - HTTP API server for tagbot

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagbot_api::{router, ApiConfig, AppState};
use tagbot_db::{
    create_pool_with_config, log_pool_metrics, CorrectionCache, ElasticStore, PgTagVocabulary, TagCorrector,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing with configurable output
    //
    // Environment variables:
    //   LOG_FORMAT  - "json" or "text" (default: "text")
    //   LOG_FILE    - path to log file (optional, enables file logging)
    //   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
    //   RUST_LOG    - standard env filter (default: "tagbot_api=debug,tower_http=debug")
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let log_file = std::env::var("LOG_FILE").ok();
    let log_ansi = std::env::var("LOG_ANSI")
        .ok()
        .map(|v| v == "true" || v == "1");

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "tagbot_api=debug,tagbot_db=debug,tower_http=debug".into());

    let registry = tracing_subscriber::registry().with(env_filter);

    // Optionally create a file appender with daily rotation
    let _file_guard = if let Some(ref path) = log_file {
        let file_dir = std::path::Path::new(path)
            .parent()
            .unwrap_or(std::path::Path::new("."));
        let file_name = std::path::Path::new(path)
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("tagbot-api.log");
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if log_format == "json" {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(log_ansi.unwrap_or(false)); // no ANSI in files by default
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        // Console-only output
        if log_format == "json" {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = log_ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        log_format = %log_format,
        log_file = log_file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );

    let config = ApiConfig::from_env()?;

    // Document store
    info!(
        subsystem = "api",
        elastic_url = %config.elastic.url,
        index = %config.elastic.index,
        "Connecting to document store"
    );
    let store = ElasticStore::new(config.elastic.clone(), config.limits)?;
    store.ensure_index().await?;

    let mut state = AppState::new(Arc::new(store), config.clone());

    // Tag vocabulary (optional)
    if let Some(database_url) = &config.database_url {
        info!(
            max_connections = config.pool.max_connections,
            "Connecting to vocabulary database..."
        );
        let pool = create_pool_with_config(database_url, &config.pool).await?;
        log_pool_metrics(&pool);
        let vocabulary = PgTagVocabulary::new(pool);
        vocabulary.ensure_schema().await?;
        let cache = CorrectionCache::new(config.correction_cache_size)?;
        state = state.with_corrector(TagCorrector::new(Arc::new(vocabulary), cache));
        info!("Tag correction enabled");
    } else {
        warn!("DATABASE_URL not set, tag correction disabled");
    }

    if !config.allowed_user_ids.is_empty() {
        info!(
            allowed = config.allowed_user_ids.len(),
            "Whitelist enabled"
        );
    }

    let app = router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Starting server on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
