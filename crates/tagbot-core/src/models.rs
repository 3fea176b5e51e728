//! Data model shared by every tagbot crate.

use std::fmt;
use std::str::FromStr;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

// =============================================================================
// MEDIA TYPE
// =============================================================================

/// Kind of media a saved item holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaType {
    Photo,
    Audio,
    Voice,
    Gif,
    Video,
    Sticker,
    File,
    /// Search-only alias meaning "anything that is not a photo".
    Document,
}

impl MediaType {
    /// Every member, in declaration order.
    pub const ALL: [MediaType; 8] = [
        MediaType::Photo,
        MediaType::Audio,
        MediaType::Voice,
        MediaType::Gif,
        MediaType::Video,
        MediaType::Sticker,
        MediaType::File,
        MediaType::Document,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Photo => "photo",
            MediaType::Audio => "audio",
            MediaType::Voice => "voice",
            MediaType::Gif => "gif",
            MediaType::Video => "video",
            MediaType::Sticker => "sticker",
            MediaType::File => "file",
            MediaType::Document => "document",
        }
    }

    /// Names of every member, used as the allowed values of the `type` field.
    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(MediaType::as_str).collect()
    }
}

impl Default for MediaType {
    fn default() -> Self {
        MediaType::Sticker
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        MediaType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::InvalidInput(format!("unknown media type: {}", s)))
    }
}

// =============================================================================
// TAGGED DOCUMENT
// =============================================================================

/// One saved media item.
///
/// Owned by the storage collaborator; the core only reads it to seed a tag
/// merge and hands back a mutated copy. Every field has a default so that
/// projected search hits (which carry only a few fields) still deserialize.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggedDocument {
    pub owner: i64,
    pub id: i64,
    pub access_hash: i64,
    #[serde(rename = "type")]
    pub media_type: MediaType,
    pub ext: String,
    pub is_animated: bool,
    pub pack_name: String,
    pub pack_link: String,
    pub filename: String,
    pub title: String,
    /// Unix seconds.
    pub created: i64,
    /// Unix seconds.
    pub last_used: i64,
    pub tags: Vec<String>,
    pub emoji: Vec<String>,
    pub marked: bool,
}

impl TaggedDocument {
    /// Create an untagged document stamped with the current time.
    pub fn new(owner: i64, id: i64, access_hash: i64, media_type: MediaType) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            owner,
            id,
            access_hash,
            media_type,
            created: now,
            last_used: now,
            ..Default::default()
        }
    }

    /// Backend id of this document.
    pub fn document_id(&self) -> DocumentId {
        DocumentId::new(self.owner, self.id)
    }

    pub fn has_tags(&self) -> bool {
        !self.tags.is_empty() || !self.emoji.is_empty()
    }
}

// =============================================================================
// DOCUMENT ID
// =============================================================================

/// Backend identity of a saved item: the pair (owner, media id).
///
/// Rendered as standard base64 of the two big-endian `i64`s, which is what
/// lets request logs recover the owner from a document path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId {
    pub owner: i64,
    pub media_id: i64,
}

impl DocumentId {
    pub fn new(owner: i64, media_id: i64) -> Self {
        Self { owner, media_id }
    }

    pub fn pack(&self) -> String {
        let mut bytes = [0u8; 16];
        bytes[..8].copy_from_slice(&self.owner.to_be_bytes());
        bytes[8..].copy_from_slice(&self.media_id.to_be_bytes());
        STANDARD.encode(bytes)
    }

    pub fn unpack(packed: &str) -> Result<Self> {
        let bytes = STANDARD
            .decode(packed)
            .map_err(|e| Error::InvalidInput(format!("invalid document id: {}", e)))?;
        if bytes.len() != 16 {
            return Err(Error::InvalidInput(format!(
                "invalid document id length: {}",
                bytes.len()
            )));
        }
        let mut owner = [0u8; 8];
        let mut media_id = [0u8; 8];
        owner.copy_from_slice(&bytes[..8]);
        media_id.copy_from_slice(&bytes[8..]);
        Ok(Self {
            owner: i64::from_be_bytes(owner),
            media_id: i64::from_be_bytes(media_id),
        })
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pack())
    }
}

// =============================================================================
// SEARCH RESULTS & STATS
// =============================================================================

/// One page of search hits.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchPage {
    /// Total number of matching documents, across all pages.
    pub total: u64,
    pub documents: Vec<TaggedDocument>,
}

/// Per-type counts of an owner's saved items.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeHistogram {
    /// All items the owner has saved.
    pub total: u64,
    /// Items matching the `only_marked` restriction, when it was requested.
    pub sub_total: Option<u64>,
    /// Counts per type, in the order reported by the backend.
    pub counts: Vec<(MediaType, u64)>,
}

impl TypeHistogram {
    pub fn has_photos(&self) -> bool {
        self.count_for(MediaType::Photo) > 0
    }

    /// Whether any non-photo item is counted.
    pub fn has_documents(&self) -> bool {
        self.counts
            .iter()
            .any(|(t, n)| *t != MediaType::Photo && *n > 0)
    }

    pub fn count_for(&self, media_type: MediaType) -> u64 {
        self.counts
            .iter()
            .find(|(t, _)| *t == media_type)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    /// Human readable summary, one line per type.
    pub fn pretty(&self) -> String {
        let mut lines = vec![match self.sub_total {
            Some(sub) => format!("Total: {} out of your {} saved items", sub, self.total),
            None => format!("Total: {}", self.total),
        }];
        lines.extend(self.counts.iter().map(|(t, n)| format!("{}: {}", t, n)));
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_media_type_round_trips_through_str() {
        for t in MediaType::ALL {
            assert_eq!(t.as_str().parse::<MediaType>().unwrap(), t);
        }
        assert!("stickers".parse::<MediaType>().is_err());
    }

    #[test]
    fn test_document_id_pack_unpack() {
        let id = DocumentId::new(232787997, -5_000_000_123);
        let packed = id.pack();
        assert_eq!(packed.len(), 24);
        assert!(packed.ends_with("=="));
        assert_eq!(DocumentId::unpack(&packed).unwrap(), id);
    }

    #[test]
    fn test_document_id_rejects_wrong_length() {
        assert!(DocumentId::unpack("AAAA").is_err());
        assert!(DocumentId::unpack("not base64!").is_err());
    }

    #[test]
    fn test_document_serializes_type_key() {
        let doc = TaggedDocument::new(1, 2, 3, MediaType::Gif);
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["type"], "gif");
        assert!(doc.created > 0);
        assert_eq!(doc.created, doc.last_used);
    }

    #[test]
    fn test_partial_source_deserializes() {
        let doc: TaggedDocument =
            serde_json::from_str(r#"{"id": 7, "access_hash": 9, "tags": ["a"]}"#).unwrap();
        assert_eq!(doc.id, 7);
        assert_eq!(doc.tags, vec!["a"]);
        assert_eq!(doc.owner, 0);
    }

    #[test]
    fn test_histogram_pretty() {
        let hist = TypeHistogram {
            total: 10,
            sub_total: None,
            counts: vec![(MediaType::Sticker, 7), (MediaType::Photo, 3)],
        };
        assert_eq!(hist.pretty(), "Total: 10\nsticker: 7\nphoto: 3");
        assert!(hist.has_photos());
        assert!(hist.has_documents());

        let marked = TypeHistogram {
            total: 10,
            sub_total: Some(2),
            counts: vec![(MediaType::Photo, 2)],
        };
        assert!(marked.pretty().starts_with("Total: 2 out of your 10 saved items"));
        assert!(!marked.has_documents());
    }
}
