//! Error types for attache.

use thiserror::Error;

/// Result type alias using attache's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for attachment storage operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error (unknown id strategy, unknown disk, missing key)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Validation error (empty uuid, bad attribute)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Backend I/O failure that is not expressible as std::io::Error
    /// (remote object store errors, listing failures)
    #[error("Storage error: {0}")]
    Storage(String),

    /// Repository (persistence collaborator) failure
    #[error("Repository error: {0}")]
    Repository(String),

    /// Signed-URL token issuance/resolution failure
    #[error("Token error: {0}")]
    Token(String),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// File I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
