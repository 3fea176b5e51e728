//! Error types for tagbot.

use thiserror::Error;

/// Result type alias using tagbot's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for tagbot operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation failed (wraps sqlx::Error)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// HTTP/network request to a backend failed
    #[error("Request error: {0}")]
    Request(String),

    /// Backend answered with something we could not interpret
    #[error("Backend error: {0}")]
    Backend(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A document was rejected at the point of persisting it
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reasons a single write is refused.
///
/// The display text is shown to the end user as-is.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Tag \"{tag}\" is longer than {max} characters")]
    TagTooLong { tag: String, max: usize },

    #[error("Too many tags ({count}), the maximum is {max}")]
    TooManyTags { count: usize, max: usize },

    #[error("Too many emoji ({count}), the maximum is {max}")]
    TooManyEmoji { count: usize, max: usize },

    #[error("You have reached the limit of {max} saved items")]
    LimitExceeded { max: u64 },
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Error::Request(e.to_string())
    }
}

impl Error {
    /// Whether the error should be reported to the user verbatim.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, Error::Validation(_) | Error::InvalidInput(_))
    }
}
