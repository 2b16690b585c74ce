//! Error types for forumbridge.

use thiserror::Error;

/// Common error type for forumbridge.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A content-type string or native type tag outside the three known
    /// mappings.
    ///
    /// This points at a caller or configuration bug (an orphan or wrongly
    /// typed record), never at something a user can trigger.
    #[error("unknown content type: {0}")]
    UnknownContentType(String),

    /// URL routing error.
    #[error("routing error: {0}")]
    Routing(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Option store read error.
    #[error("option error: {0}")]
    Option(String),

    /// Fixture file error.
    #[error("fixture error: {0}")]
    Fixture(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for forumbridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
