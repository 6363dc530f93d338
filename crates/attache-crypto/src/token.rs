//! Signed URL token issuance and resolution.
//!
//! `issue` serializes `{id, expire, iat, disposition}` to compact JSON,
//! seals it with AES-256-GCM, and emits URL-safe base64 (no padding) so
//! the token can be embedded in a path segment. `resolve` reverses the
//! steps. Expiry *enforcement* is the download proxy's job; `resolve`
//! only surfaces the payload.

use base64::Engine;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::cipher::SigningKey;
use crate::error::{CryptoError, CryptoResult};

/// Delivery mode for a file response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Disposition {
    /// Force download.
    Attachment,
    /// Render in the browser.
    Inline,
}

impl Disposition {
    /// Header token for `Content-Disposition`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Attachment => "attachment",
            Self::Inline => "inline",
        }
    }
}

impl std::fmt::Display for Disposition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decrypted contents of a signed URL token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPayload {
    /// Attachment identifier (UUID).
    pub id: String,
    /// Expiry as epoch seconds. Callers reject tokens whose expiry has
    /// passed.
    pub expire: i64,
    /// Issuance time as epoch seconds.
    #[serde(rename = "iat")]
    pub issued_at: i64,
    /// Delivery disposition baked into the token.
    pub disposition: Disposition,
}

/// Issues and resolves encrypted, expiring access tokens.
#[derive(Debug, Clone)]
pub struct UrlSigner {
    key: SigningKey,
}

impl UrlSigner {
    pub fn new(key: SigningKey) -> Self {
        Self { key }
    }

    /// Issue a token for `id` expiring at `expire` (epoch seconds).
    pub fn issue(&self, id: &str, expire: i64, disposition: Disposition) -> CryptoResult<String> {
        let payload = TokenPayload {
            id: id.to_string(),
            expire,
            issued_at: Utc::now().timestamp(),
            disposition,
        };

        let plaintext = serde_json::to_vec(&payload)?;
        let sealed = self.key.seal(&plaintext)?;
        Ok(base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(sealed))
    }

    /// Decrypt and deserialize a token.
    ///
    /// A malformed, tampered, or foreign-key token fails with a decode
    /// or decryption error; it never resolves to a default payload.
    pub fn resolve(&self, token: &str) -> CryptoResult<TokenPayload> {
        let sealed = base64::engine::general_purpose::URL_SAFE_NO_PAD
            .decode(token)
            .map_err(|e| CryptoError::TokenDecode(format!("invalid base64: {}", e)))?;

        let plaintext = self.key.open(&sealed)?;
        Ok(serde_json::from_slice(&plaintext)?)
    }
}
