//! Identifier generation strategies.
//!
//! Attachment UUIDs come from a fixed registry of named strategies
//! selected at configuration load. Unknown names are rejected when the
//! configuration is built, not at first use.

use uuid::Uuid;

use crate::error::{Error, Result};

/// Names accepted by [`IdStrategy::from_name`].
pub const STRATEGY_NAMES: &[&str] = &["uuid4", "uuid7"];

/// Identifier generation strategy for new attachment records.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdStrategy {
    /// Random UUIDv4.
    Uuid4,
    /// Time-ordered UUIDv7 (RFC 9562).
    Uuid7,
}

impl IdStrategy {
    /// Resolve a strategy by registry name.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for names outside the fixed registry.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "uuid4" => Ok(Self::Uuid4),
            "uuid7" => Ok(Self::Uuid7),
            other => Err(Error::Config(format!(
                "unknown id strategy '{}' (expected one of: {})",
                other,
                STRATEGY_NAMES.join(", ")
            ))),
        }
    }

    /// Registry name of this strategy.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Uuid4 => "uuid4",
            Self::Uuid7 => "uuid7",
        }
    }

    /// Generate a new identifier.
    pub fn generate(&self) -> String {
        match self {
            Self::Uuid4 => Uuid::new_v4().to_string(),
            Self::Uuid7 => Uuid::now_v7().to_string(),
        }
    }
}

impl Default for IdStrategy {
    fn default() -> Self {
        Self::Uuid4
    }
}
