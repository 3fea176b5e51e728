//! Write-time limits on tagged documents.

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::ValidationError;
use crate::models::TaggedDocument;

/// Per-item and per-owner limits enforced before a document is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Limits {
    pub max_tag_length: usize,
    pub max_tags_per_item: usize,
    pub max_emoji_per_item: usize,
    pub max_items_per_owner: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_tag_length: defaults::MAX_TAG_LENGTH,
            max_tags_per_item: defaults::MAX_TAGS_PER_ITEM,
            max_emoji_per_item: defaults::MAX_EMOJI_PER_ITEM,
            max_items_per_owner: defaults::MAX_ITEMS_PER_OWNER,
        }
    }
}

impl Limits {
    /// Check the per-item limits of `document`.
    pub fn validate_document(&self, document: &TaggedDocument) -> Result<(), ValidationError> {
        if document.tags.len() > self.max_tags_per_item {
            return Err(ValidationError::TooManyTags {
                count: document.tags.len(),
                max: self.max_tags_per_item,
            });
        }
        if document.emoji.len() > self.max_emoji_per_item {
            return Err(ValidationError::TooManyEmoji {
                count: document.emoji.len(),
                max: self.max_emoji_per_item,
            });
        }
        if let Some(tag) = document
            .tags
            .iter()
            .find(|t| t.chars().count() > self.max_tag_length)
        {
            return Err(ValidationError::TagTooLong {
                tag: tag.clone(),
                max: self.max_tag_length,
            });
        }
        Ok(())
    }

    /// Check that an owner holding `current` items may store one more.
    pub fn check_capacity(&self, current: u64) -> Result<(), ValidationError> {
        if current >= self.max_items_per_owner {
            return Err(ValidationError::LimitExceeded {
                max: self.max_items_per_owner,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MediaType;

    fn doc_with_tags(tags: &[&str]) -> TaggedDocument {
        let mut doc = TaggedDocument::new(1, 1, 0, MediaType::Sticker);
        doc.tags = tags.iter().map(|t| t.to_string()).collect();
        doc
    }

    #[test]
    fn test_default_limits_accept_normal_document() {
        assert!(Limits::default()
            .validate_document(&doc_with_tags(&["cat", "cute"]))
            .is_ok());
    }

    #[test]
    fn test_tag_length_counts_chars() {
        let limits = Limits {
            max_tag_length: 3,
            ..Limits::default()
        };
        assert!(limits.validate_document(&doc_with_tags(&["ёжи"])).is_ok());
        assert_eq!(
            limits.validate_document(&doc_with_tags(&["ok", "long"])),
            Err(ValidationError::TagTooLong {
                tag: "long".into(),
                max: 3
            })
        );
    }

    #[test]
    fn test_too_many_tags() {
        let limits = Limits {
            max_tags_per_item: 1,
            ..Limits::default()
        };
        assert!(matches!(
            limits.validate_document(&doc_with_tags(&["a", "b"])),
            Err(ValidationError::TooManyTags { count: 2, max: 1 })
        ));
    }

    #[test]
    fn test_too_many_emoji() {
        let limits = Limits {
            max_emoji_per_item: 0,
            ..Limits::default()
        };
        let mut doc = doc_with_tags(&[]);
        doc.emoji = vec!["😀".into()];
        assert!(matches!(
            limits.validate_document(&doc),
            Err(ValidationError::TooManyEmoji { .. })
        ));
    }

    #[test]
    fn test_capacity() {
        let limits = Limits {
            max_items_per_owner: 2,
            ..Limits::default()
        };
        assert!(limits.check_capacity(1).is_ok());
        assert_eq!(
            limits.check_capacity(2),
            Err(ValidationError::LimitExceeded { max: 2 })
        );
    }
}
