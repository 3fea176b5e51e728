//! Remembers each owner's most recent inline query so it can be explained
//! later by the parse command.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;

/// Number of owners whose last query is kept.
pub const LAST_QUERY_CAPACITY: usize = 128;

#[derive(Clone)]
pub struct LastQueryCache {
    cache: Arc<Mutex<LruCache<i64, String>>>,
}

impl Default for LastQueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl LastQueryCache {
    pub fn new() -> Self {
        Self::with_capacity(NonZeroUsize::new(LAST_QUERY_CAPACITY).unwrap_or(NonZeroUsize::MIN))
    }

    pub fn with_capacity(capacity: NonZeroUsize) -> Self {
        Self {
            cache: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    pub async fn remember(&self, owner: i64, query: &str) {
        self.cache.lock().await.put(owner, query.to_string());
    }

    pub async fn get(&self, owner: i64) -> Option<String> {
        self.cache.lock().await.get(&owner).cloned()
    }
}
