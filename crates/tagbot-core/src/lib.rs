//! # tagbot-core
//!
//! Core types, the query language, and collaborator traits for tagbot.
//!
//! The query language pieces (emoji extraction, field registry, parser,
//! parsed query) are pure and synchronous; storage lives behind the traits in
//! [`traits`] and is implemented by `tagbot-db`.

pub mod correction;
pub mod defaults;
pub mod emoji;
pub mod error;
pub mod fields;
pub mod logging;
pub mod media;
pub mod models;
pub mod parser;
pub mod query;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use correction::{
    AcceptedCorrection, CorrectionOutcome, CorrectionPolicy, NearestTag, RejectedCorrection,
};
pub use emoji::{emoji_keywords, is_plain_emoji, strip_emojis, suggest_keywords, EmojiKeywords};
pub use error::{Error, Result, ValidationError};
pub use fields::{EnumMatch, Field, FieldRegistry, MatchStrategy};
pub use media::{AudioAttributes, MediaInfo, StickerAttributes};
pub use models::*;
pub use parser::{parse_query, parse_tags, QueryParser};
pub use query::{merge_values, ParsedQuery, QueryWarning};
pub use traits::*;
pub use validation::Limits;
