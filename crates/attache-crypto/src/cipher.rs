//! AES-256-GCM key handling and seal/open operations.

use aes_gcm::{
    aead::{Aead, KeyInit},
    Aes256Gcm, Nonce,
};
use base64::Engine;
use rand::RngCore;

use crate::error::{CryptoError, CryptoResult};

/// Nonce length prepended to every sealed token.
pub const NONCE_LEN: usize = 12;

/// Process-wide symmetric key for token issuance and resolution.
#[derive(Clone)]
pub struct SigningKey([u8; 32]);

impl SigningKey {
    /// Wrap raw 32-byte key material.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Decode a key from standard base64 (44-character) form.
    pub fn from_base64(encoded: &str) -> CryptoResult<Self> {
        let bytes = base64::engine::general_purpose::STANDARD
            .decode(encoded)
            .map_err(|e| CryptoError::InvalidKey(format!("invalid base64: {}", e)))?;
        let bytes: [u8; 32] = bytes
            .try_into()
            .map_err(|_| CryptoError::InvalidKey("key must be 32 bytes".to_string()))?;
        Ok(Self(bytes))
    }

    /// Load the key from the `ATTACHE_TOKEN_KEY` environment variable
    /// (standard base64).
    pub fn from_env() -> CryptoResult<Self> {
        let encoded = std::env::var("ATTACHE_TOKEN_KEY")
            .map_err(|_| CryptoError::InvalidKey("ATTACHE_TOKEN_KEY is not set".to_string()))?;
        Self::from_base64(&encoded)
    }

    /// Generate a fresh random key. Tokens issued under a generated key
    /// do not survive a process restart.
    pub fn generate() -> Self {
        let mut bytes = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Seal plaintext: random 12-byte nonce followed by ciphertext with
    /// the 16-byte authentication tag appended.
    pub fn seal(&self, plaintext: &[u8]) -> CryptoResult<Vec<u8>> {
        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|e| CryptoError::Encryption(e.to_string()))?;

        let mut nonce = [0u8; NONCE_LEN];
        rand::thread_rng().fill_bytes(&mut nonce);

        let ciphertext = cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CryptoError::Encryption("AES-GCM encryption failed".into()))?;

        let mut sealed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        sealed.extend_from_slice(&nonce);
        sealed.extend_from_slice(&ciphertext);
        Ok(sealed)
    }

    /// Open a sealed buffer produced by [`SigningKey::seal`].
    pub fn open(&self, sealed: &[u8]) -> CryptoResult<Vec<u8>> {
        if sealed.len() < NONCE_LEN {
            return Err(CryptoError::TokenDecode("token too short".to_string()));
        }
        let (nonce, ciphertext) = sealed.split_at(NONCE_LEN);

        let cipher = Aes256Gcm::new_from_slice(&self.0)
            .map_err(|_| CryptoError::Decryption("invalid key".to_string()))?;

        cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CryptoError::Decryption("AES-GCM decryption failed".to_string()))
    }
}

impl std::fmt::Debug for SigningKey {
    // Key material never appears in logs.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningKey(..)")
    }
}
