//! Structured logging schema and field name constants for tagbot.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Degraded service, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied |
//! | INFO  | Lifecycle events (startup, shutdown), operation completions |
//! | DEBUG | Decision points, intermediate values, config choices |
//! | TRACE | Per-item iteration, high-volume data (search hits, tokens) |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "api", "search", "db", "query"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "parser", "compiler", "elastic", "corrector", "pool"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "search", "upsert", "correct", "invalidate"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Owner (chat user) id the request is made for.
pub const OWNER_ID: &str = "owner_id";

/// Media id of the document being operated on.
pub const MEDIA_ID: &str = "media_id";

/// Media type of the document or query.
pub const MEDIA_TYPE: &str = "media_type";

/// Raw query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a search.
pub const RESULT_COUNT: &str = "result_count";

/// Total hit count reported by the backend.
pub const TOTAL_COUNT: &str = "total_count";

/// Number of parse warnings produced for a query.
pub const WARNING_COUNT: &str = "warning_count";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

/// Index or table affected.
pub const DB_TABLE: &str = "db_table";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Whether a cached value was used.
pub const CACHE_HIT: &str = "cache_hit";

/// Every field name in the schema.
pub const ALL_FIELDS: &[&str] = &[
    SUBSYSTEM,
    COMPONENT,
    OPERATION,
    OWNER_ID,
    MEDIA_ID,
    MEDIA_TYPE,
    QUERY,
    DURATION_MS,
    RESULT_COUNT,
    TOTAL_COUNT,
    WARNING_COUNT,
    POOL_SIZE,
    POOL_IDLE,
    DB_TABLE,
    SUCCESS,
    ERROR_MSG,
    CACHE_HIT,
];
