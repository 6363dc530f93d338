//! # attache-crypto
//!
//! Encrypted, time-boxed access tokens for attachment signed URLs.
//!
//! A token embeds the attachment identifier, expiry, issuance time, and
//! delivery disposition, serialized as JSON and sealed with AES-256-GCM
//! under a process-wide symmetric key. Confidentiality and integrity
//! rely entirely on the AEAD: a tampered or truncated token fails to
//! decrypt rather than yielding a stale or default payload.

pub mod cipher;
pub mod error;
pub mod token;

pub use cipher::SigningKey;
pub use error::{CryptoError, CryptoResult};
pub use token::{Disposition, TokenPayload, UrlSigner};
