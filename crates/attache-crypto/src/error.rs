//! Error types for token cryptography.

use thiserror::Error;

/// Cryptographic and token-format errors.
#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key material is not 32 bytes or not decodable.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Encryption failed.
    #[error("Encryption failed: {0}")]
    Encryption(String),

    /// Decryption failed - wrong key, tampered, or corrupted token.
    #[error("Decryption failed: {0}")]
    Decryption(String),

    /// Token is not decodable (bad base64, too short).
    #[error("Token decode failed: {0}")]
    TokenDecode(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for token cryptography.
pub type CryptoResult<T> = Result<T, CryptoError>;
