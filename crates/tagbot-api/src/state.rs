//! Shared handler state.

use std::sync::Arc;

use tagbot_core::{FieldRegistry, MediaStore};
use tagbot_db::TagCorrector;

use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::services::{InlineQueryTracker, LastQueryCache};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn MediaStore>,
    /// Present when a tag vocabulary is configured.
    pub corrector: Option<TagCorrector>,
    pub registry: &'static FieldRegistry,
    pub config: Arc<ApiConfig>,
    pub inline: InlineQueryTracker,
    pub last_query: LastQueryCache,
}

impl AppState {
    pub fn new(store: Arc<dyn MediaStore>, config: ApiConfig) -> Self {
        Self {
            store,
            corrector: None,
            registry: FieldRegistry::standard(),
            config: Arc::new(config),
            inline: InlineQueryTracker::new(),
            last_query: LastQueryCache::new(),
        }
    }

    pub fn with_corrector(mut self, corrector: TagCorrector) -> Self {
        self.corrector = Some(corrector);
        self
    }

    /// Reject owners outside the whitelist.
    pub fn ensure_allowed(&self, owner: i64) -> Result<(), ApiError> {
        if self.config.is_allowed(owner) {
            Ok(())
        } else {
            Err(ApiError::Forbidden(format!("user {} is not allowed", owner)))
        }
    }

    pub fn corrector(&self) -> Result<&TagCorrector, ApiError> {
        self.corrector
            .as_ref()
            .ok_or_else(|| ApiError::Unavailable("tag correction is not configured".to_string()))
    }
}
