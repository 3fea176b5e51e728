//! Collaborator traits implemented by the storage crates.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::correction::NearestTag;
use crate::error::Result;
use crate::models::{DocumentId, MediaType, SearchPage, TaggedDocument, TypeHistogram};

/// Document store holding every owner's tagged items.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Run a compiled search request body.
    async fn search(&self, body: &serde_json::Value) -> Result<SearchPage>;

    async fn get(&self, id: DocumentId) -> Result<Option<TaggedDocument>>;

    /// Insert or replace a document, enforcing write limits.
    async fn upsert(&self, document: &TaggedDocument) -> Result<()>;

    /// Remove a document. Returns `false` when it did not exist.
    async fn delete(&self, id: DocumentId) -> Result<bool>;

    /// Number of items an owner has saved.
    async fn count_items(&self, owner: i64) -> Result<u64>;

    /// Per-type counts, optionally restricted to marked items.
    async fn count_by_type(&self, owner: i64, only_marked: bool) -> Result<TypeHistogram>;

    /// Record that a document was picked from search results at `at` (unix seconds).
    async fn touch(&self, id: DocumentId, at: i64) -> Result<()>;

    /// Set or clear the transfer mark on one document. Returns `false` when
    /// it does not exist.
    async fn mark(&self, id: DocumentId, marked: bool) -> Result<bool>;

    /// Set or clear the transfer mark on every document of `owner` matching
    /// `query`, a compiled query clause. Returns the number of documents
    /// updated.
    async fn mark_matching(&self, owner: i64, query: &serde_json::Value, marked: bool)
        -> Result<u64>;
}

/// Change to the distinct tags an owner uses, caused by one item update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagDiff {
    /// Tags that had no prior use.
    pub created: Vec<String>,
    /// Tags whose last use was removed.
    pub deleted: Vec<String>,
    /// Vocabulary `deleted` refers to when the item changed type; `None`
    /// means the type the tags were applied under.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_from: Option<MediaType>,
}

impl TagDiff {
    pub fn is_empty(&self) -> bool {
        self.created.is_empty() && self.deleted.is_empty()
    }

    /// Vocabulary the deleted tags were removed from.
    pub fn deleted_type(&self, applied: MediaType) -> MediaType {
        self.deleted_from.unwrap_or(applied)
    }
}

/// Per-owner, per-type tag vocabulary with nearest-neighbour lookup.
#[async_trait]
pub trait TagVocabulary: Send + Sync {
    /// Nearest known tag for each candidate, in input order.
    async fn nearest(
        &self,
        owner: i64,
        media_type: MediaType,
        candidates: &[String],
    ) -> Result<Vec<NearestTag>>;

    /// Atomically replace the tags recorded for one item and report which
    /// vocabulary entries appeared or disappeared as a result.
    async fn apply_tags(
        &self,
        owner: i64,
        media_id: i64,
        media_type: MediaType,
        tags: &[String],
    ) -> Result<TagDiff>;

    /// Drop an item from the vocabulary. Same as applying an empty tag list.
    async fn forget(&self, owner: i64, media_id: i64, media_type: MediaType) -> Result<TagDiff> {
        self.apply_tags(owner, media_id, media_type, &[]).await
    }
}
