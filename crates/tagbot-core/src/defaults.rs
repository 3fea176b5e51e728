//! Centralized default constants for tagbot.
//!
//! **This module is the single source of truth** for shared default values.
//! Configuration layers override these, they never redefine them.

// =============================================================================
// SEARCH
// =============================================================================

/// Number of inline results returned per page.
pub const INLINE_PAGE_SIZE: u32 = 50;

/// Fuzziness handed to the backend for free-text matching.
///
/// Terms shorter than 4 characters must match exactly, 4-5 allow one edit,
/// longer terms allow two.
pub const FUZZINESS: &str = "AUTO:4,6";

/// Number of leading characters that must match exactly in fuzzy queries.
pub const FUZZY_PREFIX_LENGTH: u32 = 1;

/// Boost applied to the exact field in n-gram assisted matching.
pub const NGRAM_EXACT_BOOST: u32 = 3;

/// Boost applied to the prefix n-gram subfield.
pub const NGRAM_PREFIX_BOOST: u32 = 2;

/// Fields returned for inline results.
pub const INLINE_RESULT_FIELDS: &[&str] = &["id", "access_hash", "type", "tags", "title"];

/// Seconds an inline answer may be cached by the transport when the query
/// parsed cleanly.
pub const INLINE_CACHE_TIME: u32 = 5;

/// Maximum characters of tags used as a fallback inline result title.
pub const INLINE_TITLE_MAX_CHARS: usize = 128;

// =============================================================================
// LIMITS
// =============================================================================

/// Maximum characters in a single tag.
pub const MAX_TAG_LENGTH: usize = 64;

/// Maximum tags on one saved item.
pub const MAX_TAGS_PER_ITEM: usize = 100;

/// Maximum emoji on one saved item.
pub const MAX_EMOJI_PER_ITEM: usize = 50;

/// Maximum saved items per owner.
pub const MAX_ITEMS_PER_OWNER: u64 = 10_000;

// =============================================================================
// CORRECTION
// =============================================================================

/// Maximum normalized distance (0 = identical, 1 = unrelated) at which a
/// nearest tag is accepted as a correction.
pub const CORRECTION_MAX_DISTANCE: f64 = 0.7;

/// Minimum candidate length for the substring fallback acceptance rule.
pub const CORRECTION_MIN_SUBSTRING_LEN: usize = 4;

/// Entries kept in the correction cache.
pub const CORRECTION_CACHE_SIZE: usize = 4096;

// =============================================================================
// STICKERS
// =============================================================================

/// Link prefix for sticker packs.
pub const STICKER_PACK_LINK_PREFIX: &str = "https://t.me/addstickers/";

// =============================================================================
// EMOJI KEYWORDS
// =============================================================================

/// Shortest keyword suggested for an emoji.
pub const EMOJI_KEYWORD_MIN_CHARS: usize = 2;

/// Longest keyword suggested for an emoji.
pub const EMOJI_KEYWORD_MAX_CHARS: usize = 12;

// =============================================================================
// VOCABULARY DATABASE
// =============================================================================

/// Connections held by the tag vocabulary pool. Vocabulary queries are
/// short single-statement transactions, so a small pool suffices.
pub const VOCABULARY_POOL_MAX_CONNECTIONS: u32 = 4;

/// Seconds to wait for a free vocabulary connection.
pub const VOCABULARY_POOL_ACQUIRE_TIMEOUT_SECS: u64 = 5;

/// Seconds an unused vocabulary connection is kept open.
pub const VOCABULARY_POOL_IDLE_TIMEOUT_SECS: u64 = 300;
