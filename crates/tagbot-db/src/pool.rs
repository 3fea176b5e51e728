//! PostgreSQL pool for the tag vocabulary.

use std::time::{Duration, Instant};

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{debug, info, warn};

use tagbot_core::defaults::{
    VOCABULARY_POOL_ACQUIRE_TIMEOUT_SECS, VOCABULARY_POOL_IDLE_TIMEOUT_SECS,
    VOCABULARY_POOL_MAX_CONNECTIONS,
};
use tagbot_core::{Error, Result};

/// Sizing and timeouts of the vocabulary pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    pub max_connections: u32,
    /// How long a vocabulary lookup waits for a free connection.
    pub acquire_timeout: Duration,
    /// `None` keeps idle connections open indefinitely.
    pub idle_timeout: Option<Duration>,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: VOCABULARY_POOL_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(VOCABULARY_POOL_ACQUIRE_TIMEOUT_SECS),
            idle_timeout: Some(Duration::from_secs(VOCABULARY_POOL_IDLE_TIMEOUT_SECS)),
        }
    }
}

impl PoolConfig {
    /// sqlx options for this configuration. Connections are opened lazily.
    pub fn options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .min_connections(0)
            .acquire_timeout(self.acquire_timeout)
            .idle_timeout(self.idle_timeout)
    }
}

/// Vocabulary pool with [`PoolConfig::default`].
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    create_pool_with_config(database_url, &PoolConfig::default()).await
}

pub async fn create_pool_with_config(database_url: &str, config: &PoolConfig) -> Result<PgPool> {
    let start = Instant::now();
    let pool = config
        .options()
        .connect(database_url)
        .await
        .map_err(Error::Database)?;

    info!(
        subsystem = "db",
        component = "pool",
        op = "connect",
        max_connections = config.max_connections,
        acquire_timeout_secs = config.acquire_timeout.as_secs(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Vocabulary pool connected"
    );
    Ok(pool)
}

/// Log pool occupancy; warns when every connection is checked out.
pub fn log_pool_metrics(pool: &PgPool) {
    let (size, idle) = (pool.size(), pool.num_idle());
    debug!(
        subsystem = "db",
        component = "pool",
        op = "metrics",
        pool_size = size,
        pool_idle = idle,
        "Vocabulary pool status"
    );
    if size > 0 && idle == 0 {
        warn!(
            subsystem = "db",
            component = "pool",
            pool_size = size,
            "Vocabulary pool exhausted, corrections may stall"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_follow_config() {
        let config = PoolConfig {
            max_connections: 9,
            acquire_timeout: Duration::from_secs(2),
            idle_timeout: None,
        };
        let options = config.options();
        assert_eq!(options.get_max_connections(), 9);
        assert_eq!(options.get_min_connections(), 0);
        assert_eq!(options.get_acquire_timeout(), Duration::from_secs(2));
        assert_eq!(options.get_idle_timeout(), None);
    }

    #[test]
    fn test_default_keeps_idle_timeout() {
        let options = PoolConfig::default().options();
        assert_eq!(
            options.get_idle_timeout(),
            Some(Duration::from_secs(VOCABULARY_POOL_IDLE_TIMEOUT_SECS))
        );
    }
}
