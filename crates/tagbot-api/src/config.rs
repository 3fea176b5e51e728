//! Process configuration read from the environment.
//!
//! Environment variables:
//! - `HOST` / `PORT`: listen address (default `0.0.0.0:3000`)
//! - `ELASTIC_URL`, `ELASTIC_INDEX`: document store (default
//!   `http://localhost:9200`, `tagbot`)
//! - `ELASTIC_USERNAME`, `ELASTIC_PASSWORD`: optional basic auth
//! - `DATABASE_URL`: optional; enables the relational tag corrector
//! - `DATABASE_MAX_CONNECTIONS`, `DATABASE_ACQUIRE_TIMEOUT_SECS`,
//!   `DATABASE_IDLE_TIMEOUT_SECS` (0 keeps idle connections): vocabulary pool
//! - `ALLOWED_USER_IDS`: comma separated owner whitelist (empty = everyone)
//! - `INLINE_PAGE_SIZE`, `MAX_TAG_LENGTH`, `MAX_TAGS_PER_ITEM`,
//!   `MAX_EMOJI_PER_ITEM`, `MAX_ITEMS_PER_OWNER`, `CORRECTION_CACHE_SIZE`

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use tagbot_core::{defaults, Error, Limits, Result};
use tagbot_db::{ElasticConfig, PoolConfig};

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_ELASTIC_URL: &str = "http://localhost:9200";
pub const DEFAULT_ELASTIC_INDEX: &str = "tagbot";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub elastic: ElasticConfig,
    pub database_url: Option<String>,
    pub pool: PoolConfig,
    /// Owners allowed to use the bot; empty allows everyone.
    pub allowed_user_ids: HashSet<i64>,
    pub inline_page_size: u32,
    pub limits: Limits,
    pub correction_cache_size: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            elastic: ElasticConfig::new(DEFAULT_ELASTIC_URL, DEFAULT_ELASTIC_INDEX),
            database_url: None,
            pool: PoolConfig::default(),
            allowed_user_ids: HashSet::new(),
            inline_page_size: defaults::INLINE_PAGE_SIZE,
            limits: Limits::default(),
            correction_cache_size: defaults::CORRECTION_CACHE_SIZE,
        }
    }
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let base = Self::default();

        let mut elastic = ElasticConfig::new(
            var("ELASTIC_URL").unwrap_or_else(|| DEFAULT_ELASTIC_URL.to_string()),
            var("ELASTIC_INDEX").unwrap_or_else(|| DEFAULT_ELASTIC_INDEX.to_string()),
        );
        if let Some(username) = var("ELASTIC_USERNAME") {
            elastic = elastic.with_credentials(username, var("ELASTIC_PASSWORD"));
        }

        let allowed_user_ids = match var("ALLOWED_USER_IDS") {
            Some(raw) => parse_id_list(&raw)?,
            None => HashSet::new(),
        };

        let limits = Limits {
            max_tag_length: parse_or(&var, "MAX_TAG_LENGTH", base.limits.max_tag_length)?,
            max_tags_per_item: parse_or(&var, "MAX_TAGS_PER_ITEM", base.limits.max_tags_per_item)?,
            max_emoji_per_item: parse_or(
                &var,
                "MAX_EMOJI_PER_ITEM",
                base.limits.max_emoji_per_item,
            )?,
            max_items_per_owner: parse_or(
                &var,
                "MAX_ITEMS_PER_OWNER",
                base.limits.max_items_per_owner,
            )?,
        };

        let pool = PoolConfig {
            max_connections: parse_or(&var, "DATABASE_MAX_CONNECTIONS", base.pool.max_connections)?,
            acquire_timeout: Duration::from_secs(parse_or(
                &var,
                "DATABASE_ACQUIRE_TIMEOUT_SECS",
                base.pool.acquire_timeout.as_secs(),
            )?),
            idle_timeout: match parse_or(
                &var,
                "DATABASE_IDLE_TIMEOUT_SECS",
                base.pool.idle_timeout.map_or(0, |t| t.as_secs()),
            )? {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        };
        if pool.max_connections == 0 {
            return Err(Error::Config("DATABASE_MAX_CONNECTIONS must be positive".to_string()));
        }

        let inline_page_size = parse_or(&var, "INLINE_PAGE_SIZE", base.inline_page_size)?;
        if inline_page_size == 0 {
            return Err(Error::Config("INLINE_PAGE_SIZE must be positive".to_string()));
        }

        Ok(Self {
            host: var("HOST").unwrap_or(base.host),
            port: parse_or(&var, "PORT", base.port)?,
            elastic,
            database_url: var("DATABASE_URL"),
            pool,
            allowed_user_ids,
            inline_page_size,
            limits,
            correction_cache_size: parse_or(
                &var,
                "CORRECTION_CACHE_SIZE",
                base.correction_cache_size,
            )?,
        })
    }

    pub fn is_allowed(&self, owner: i64) -> bool {
        self.allowed_user_ids.is_empty() || self.allowed_user_ids.contains(&owner)
    }
}

fn parse_or<T: FromStr>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T> {
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::Config(format!("{} has an invalid value: {:?}", key, raw))),
        None => Ok(default),
    }
}

fn parse_id_list(raw: &str) -> Result<HashSet<i64>> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| Error::Config(format!("ALLOWED_USER_IDS has an invalid id: {:?}", s)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ApiConfig> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ApiConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.port, DEFAULT_PORT);
        assert_eq!(cfg.elastic.index, "tagbot");
        assert_eq!(cfg.elastic.username, None);
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.limits, Limits::default());
        assert!(cfg.is_allowed(12345));
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            ("PORT", "8080"),
            ("ELASTIC_USERNAME", "elastic"),
            ("ELASTIC_PASSWORD", "changeme"),
            ("DATABASE_URL", "postgres://localhost/tagbot"),
            ("MAX_TAGS_PER_ITEM", "10"),
            ("INLINE_PAGE_SIZE", "20"),
        ])
        .unwrap();
        assert_eq!(cfg.port, 8080);
        assert_eq!(cfg.elastic.username.as_deref(), Some("elastic"));
        assert_eq!(cfg.elastic.password.as_deref(), Some("changeme"));
        assert_eq!(cfg.database_url.as_deref(), Some("postgres://localhost/tagbot"));
        assert_eq!(cfg.limits.max_tags_per_item, 10);
        assert_eq!(cfg.inline_page_size, 20);
    }

    #[test]
    fn test_pool_options() {
        let cfg = config(&[]).unwrap();
        assert_eq!(cfg.pool, PoolConfig::default());

        let cfg = config(&[
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", "1"),
            ("DATABASE_IDLE_TIMEOUT_SECS", "0"),
        ])
        .unwrap();
        assert_eq!(cfg.pool.max_connections, 12);
        assert_eq!(cfg.pool.acquire_timeout, Duration::from_secs(1));
        assert_eq!(cfg.pool.idle_timeout, None);

        assert!(matches!(
            config(&[("DATABASE_MAX_CONNECTIONS", "0")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_whitelist() {
        let cfg = config(&[("ALLOWED_USER_IDS", "232787997, 151462131,")]).unwrap();
        assert!(cfg.is_allowed(232787997));
        assert!(cfg.is_allowed(151462131));
        assert!(!cfg.is_allowed(1));
    }

    #[test]
    fn test_invalid_values_are_config_errors() {
        assert!(matches!(config(&[("PORT", "http")]), Err(Error::Config(_))));
        assert!(matches!(
            config(&[("ALLOWED_USER_IDS", "1,two")]),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            config(&[("INLINE_PAGE_SIZE", "0")]),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_blank_values_count_as_unset() {
        let cfg = config(&[("DATABASE_URL", "  "), ("HOST", "")]).unwrap();
        assert!(cfg.database_url.is_none());
        assert_eq!(cfg.host, DEFAULT_HOST);
    }
}
