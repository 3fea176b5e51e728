//! Fuzzy tag corrector and its bounded correction cache.
//!
//! Lookups are cached per `(owner, media type, input tag)`. Every
//! invalidation advances an epoch counter and is recorded against its key;
//! a lookup captures the epoch before it goes to the vocabulary and may only
//! populate the cache if neither its key nor its matched tag was invalidated
//! since. This keeps an in-flight lookup from writing back a stale
//! correction after a fresher invalidation.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;
use tracing::{debug, trace};

use tagbot_core::defaults;
use tagbot_core::fields::{TAGS, TYPE};
use tagbot_core::{
    CorrectionOutcome, CorrectionPolicy, Error, MediaType, NearestTag, ParsedQuery,
    RejectedCorrection, Result, TagDiff, TagVocabulary,
};

type CacheKey = (i64, MediaType, String);

struct CacheState {
    entries: LruCache<CacheKey, NearestTag>,
    /// Epoch of the latest invalidation per key.
    invalidated_at: LruCache<CacheKey, u64>,
    /// Keys evicted from `invalidated_at` count as invalidated at this epoch.
    floor: u64,
    epoch: u64,
}

impl CacheState {
    fn last_invalidation(&self, key: &CacheKey) -> u64 {
        self.invalidated_at.peek(key).copied().unwrap_or(self.floor)
    }

    fn record_invalidation(&mut self, key: CacheKey) {
        self.epoch += 1;
        self.entries.pop(&key);
        if let Some((evicted, at)) = self.invalidated_at.push(key.clone(), self.epoch) {
            if evicted != key {
                self.floor = self.floor.max(at);
            }
        }
    }
}

/// Size-bounded LRU of nearest-tag lookups.
#[derive(Clone)]
pub struct CorrectionCache {
    state: Arc<Mutex<CacheState>>,
}

impl CorrectionCache {
    pub fn new(capacity: usize) -> Result<Self> {
        let capacity = NonZeroUsize::new(capacity)
            .ok_or_else(|| Error::Config("correction cache size must be non-zero".to_string()))?;
        Ok(Self {
            state: Arc::new(Mutex::new(CacheState {
                entries: LruCache::new(capacity),
                invalidated_at: LruCache::new(capacity),
                floor: 0,
                epoch: 0,
            })),
        })
    }

    /// Cached lookups for `inputs`, plus the epoch ticket to insert misses with.
    pub async fn lookup(
        &self,
        owner: i64,
        media_type: MediaType,
        inputs: &[String],
    ) -> (Vec<Option<NearestTag>>, u64) {
        let mut state = self.state.lock().await;
        let hits = inputs
            .iter()
            .map(|input| {
                state
                    .entries
                    .get(&(owner, media_type, input.clone()))
                    .cloned()
            })
            .collect();
        (hits, state.epoch)
    }

    /// Store a lookup result taken at `ticket`.
    ///
    /// Returns `false` when the key or its match was invalidated after the
    /// ticket was issued; the value is then dropped.
    pub async fn insert(&self, owner: i64, media_type: MediaType, value: NearestTag, ticket: u64) -> bool {
        let mut state = self.state.lock().await;
        let key = (owner, media_type, value.input.clone());
        let mut latest = state.last_invalidation(&key);
        if let Some(matched) = &value.matched {
            latest = latest.max(state.last_invalidation(&(owner, media_type, matched.clone())));
        }
        if latest > ticket {
            trace!(
                subsystem = "db",
                component = "correction_cache",
                op = "insert",
                owner_id = owner,
                "Dropped lookup invalidated while in flight"
            );
            return false;
        }
        state.entries.put(key, value);
        true
    }

    /// Forget the cached correction for `tag` itself.
    pub async fn invalidate(&self, owner: i64, media_type: MediaType, tag: &str) {
        let mut state = self.state.lock().await;
        state.record_invalidation((owner, media_type, tag.to_string()));
    }

    /// Forget every cached correction that resolves to `tag`, and `tag` itself.
    pub async fn invalidate_target(&self, owner: i64, media_type: MediaType, tag: &str) {
        let mut state = self.state.lock().await;
        let stale: Vec<CacheKey> = state
            .entries
            .iter()
            .filter(|((o, t, _), v)| *o == owner && *t == media_type && v.matched.as_deref() == Some(tag))
            .map(|(k, _)| k.clone())
            .collect();
        for key in stale {
            state.record_invalidation(key);
        }
        state.record_invalidation((owner, media_type, tag.to_string()));
    }

    /// Apply the invalidations implied by a vocabulary change made under
    /// `media_type`. Deletions are applied to the type they were removed
    /// from, which differs when the item changed type.
    pub async fn apply_diff(&self, owner: i64, media_type: MediaType, diff: &TagDiff) {
        for tag in &diff.created {
            self.invalidate(owner, media_type, tag).await;
        }
        let deleted_type = diff.deleted_type(media_type);
        for tag in &diff.deleted {
            self.invalidate_target(owner, deleted_type, tag).await;
        }
        if !diff.is_empty() {
            debug!(
                subsystem = "db",
                component = "correction_cache",
                op = "invalidate",
                owner_id = owner,
                media_type = %media_type,
                deleted_type = %deleted_type,
                created = diff.created.len(),
                deleted = diff.deleted.len(),
                "Correction cache invalidated"
            );
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Corrected form of a parsed query.
#[derive(Debug, Clone)]
pub struct CorrectedQuery {
    pub query: ParsedQuery,
    pub media_type: MediaType,
    pub tags: CorrectionOutcome,
    pub negated_tags: CorrectionOutcome,
    /// Set when the requested type could not be resolved.
    pub rejected_type: Option<RejectedCorrection>,
}

/// Nearest-neighbour tag corrector over a [`TagVocabulary`].
#[derive(Clone)]
pub struct TagCorrector {
    vocabulary: Arc<dyn TagVocabulary>,
    cache: CorrectionCache,
    policy: CorrectionPolicy,
}

impl TagCorrector {
    pub fn new(vocabulary: Arc<dyn TagVocabulary>, cache: CorrectionCache) -> Self {
        Self {
            vocabulary,
            cache,
            policy: CorrectionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CorrectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn cache(&self) -> &CorrectionCache {
        &self.cache
    }

    pub fn policy(&self) -> &CorrectionPolicy {
        &self.policy
    }

    /// Correct `candidates` against the owner's vocabulary for `media_type`.
    ///
    /// Dropping the returned future abandons the lookup without touching
    /// the cache.
    pub async fn correct(
        &self,
        owner: i64,
        media_type: MediaType,
        candidates: &[String],
    ) -> Result<CorrectionOutcome> {
        let (cached, ticket) = self.cache.lookup(owner, media_type, candidates).await;
        let misses: Vec<String> = candidates
            .iter()
            .zip(&cached)
            .filter(|(_, hit)| hit.is_none())
            .map(|(c, _)| c.clone())
            .collect();

        let fetched = if misses.is_empty() {
            Vec::new()
        } else {
            self.vocabulary.nearest(owner, media_type, &misses).await?
        };
        let mut fetched = fetched.into_iter();

        let mut nearest = Vec::with_capacity(candidates.len());
        for (input, hit) in candidates.iter().zip(cached) {
            let found = match hit {
                Some(found) => found,
                None => {
                    let found = fetched
                        .next()
                        .unwrap_or_else(|| NearestTag::unmatched(input.clone()));
                    self.cache.insert(owner, media_type, found.clone(), ticket).await;
                    found
                }
            };
            nearest.push(found);
        }

        debug!(
            subsystem = "db",
            component = "corrector",
            op = "correct",
            owner_id = owner,
            media_type = %media_type,
            result_count = candidates.len(),
            cache_hit = candidates.len() - misses.len(),
            "Tags corrected"
        );
        Ok(self.policy.judge(nearest))
    }

    /// Correct the tag fields of a parsed query in place.
    ///
    /// The media type is resolved first (exactly or by nearest neighbour,
    /// falling back to the query default) since vocabularies are per type.
    /// Rejected tags are dropped from the returned query.
    pub async fn correct_query(&self, owner: i64, query: &ParsedQuery) -> Result<CorrectedQuery> {
        let mut corrected = query.clone();
        let requested = query.get_first(TYPE, false).unwrap_or(MediaType::default().as_str());
        let (media_type, rejected_type) = match self.policy.resolve_media_type(requested) {
            Ok(t) => (t, None),
            Err(rejected) => (MediaType::default(), Some(rejected)),
        };

        let tags = self.correct(owner, media_type, query.get(TAGS, false)).await?;
        let negated_tags = self.correct(owner, media_type, query.get(TAGS, true)).await?;
        corrected.replace(TAGS, false, tags.corrected_tags());
        corrected.replace(TAGS, true, negated_tags.corrected_tags());

        Ok(CorrectedQuery {
            query: corrected,
            media_type,
            tags,
            negated_tags,
            rejected_type,
        })
    }

    /// Record an item's new tag set and invalidate the affected cache entries.
    ///
    /// The diff comes from a single atomic read-modify-write in the vocabulary.
    pub async fn apply_tags(
        &self,
        owner: i64,
        media_id: i64,
        media_type: MediaType,
        tags: &[String],
    ) -> Result<TagDiff> {
        let diff = self
            .vocabulary
            .apply_tags(owner, media_id, media_type, tags)
            .await?;
        self.cache.apply_diff(owner, media_type, &diff).await;
        Ok(diff)
    }

    /// Remove an item from the vocabulary.
    pub async fn forget(&self, owner: i64, media_id: i64, media_type: MediaType) -> Result<TagDiff> {
        self.apply_tags(owner, media_id, media_type, &[]).await
    }
}

/// Correction cache with the default capacity.
pub fn default_cache() -> CorrectionCache {
    match CorrectionCache::new(defaults::CORRECTION_CACHE_SIZE) {
        Ok(cache) => cache,
        Err(e) => unreachable!("default cache size is non-zero: {}", e),
    }
}
