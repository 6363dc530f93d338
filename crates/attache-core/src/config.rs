//! Storage configuration.

use crate::defaults;
use crate::error::Result;
use crate::idgen::IdStrategy;

/// Configuration for the attachment storage core.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Root prefix under which all attachment files live.
    pub storage_prefix: String,
    /// Identifier generation strategy, resolved at load time.
    pub id_strategy: IdStrategy,
    /// Attribute names an `attach` call is allowed to set.
    pub attach_whitelist: Vec<String>,
    /// Whether deleting a record also deletes its backing file and
    /// prunes empty partition directories.
    pub cascade_on_delete: bool,
    /// Default lookback window (minutes) for orphan cleanup.
    pub cleanup_lookback_minutes: i64,
    /// Public base URL for proxy and signed routes.
    pub base_url: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            storage_prefix: defaults::STORAGE_PREFIX.to_string(),
            id_strategy: IdStrategy::default(),
            attach_whitelist: default_whitelist(),
            cascade_on_delete: true,
            cleanup_lookback_minutes: defaults::CLEANUP_LOOKBACK_MINUTES,
            base_url: "http://localhost".to_string(),
        }
    }
}

fn default_whitelist() -> Vec<String> {
    ["key", "group", "title", "description", "metadata"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl StorageConfig {
    /// Create config from environment variables (with defaults).
    ///
    /// | Variable | Default | Description |
    /// |----------|---------|-------------|
    /// | `ATTACHE_STORAGE_PREFIX` | `attachments` | Root storage prefix |
    /// | `ATTACHE_ID_STRATEGY` | `uuid4` | Identifier strategy name |
    /// | `ATTACHE_ATTACH_WHITELIST` | `key,group,title,description,metadata` | Comma-separated attach attributes |
    /// | `ATTACHE_CASCADE_ON_DELETE` | `true` | Cascade file cleanup on record delete |
    /// | `ATTACHE_CLEANUP_LOOKBACK_MINUTES` | `1440` | Orphan cleanup window |
    /// | `ATTACHE_BASE_URL` | `http://localhost` | Public base URL |
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if `ATTACHE_ID_STRATEGY` names a strategy
    /// outside the fixed registry. Unknown names fail here, at load
    /// time, not at first record creation.
    pub fn from_env() -> Result<Self> {
        let storage_prefix = std::env::var("ATTACHE_STORAGE_PREFIX")
            .unwrap_or_else(|_| defaults::STORAGE_PREFIX.to_string());

        let strategy_name = std::env::var("ATTACHE_ID_STRATEGY")
            .unwrap_or_else(|_| defaults::ID_STRATEGY.to_string());
        let id_strategy = IdStrategy::from_name(&strategy_name)?;

        let attach_whitelist = std::env::var("ATTACHE_ATTACH_WHITELIST")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|_| default_whitelist());

        let cascade_on_delete = std::env::var("ATTACHE_CASCADE_ON_DELETE")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(true);

        let cleanup_lookback_minutes = std::env::var("ATTACHE_CLEANUP_LOOKBACK_MINUTES")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .unwrap_or(defaults::CLEANUP_LOOKBACK_MINUTES);

        let base_url =
            std::env::var("ATTACHE_BASE_URL").unwrap_or_else(|_| "http://localhost".to_string());

        Ok(Self {
            storage_prefix,
            id_strategy,
            attach_whitelist,
            cascade_on_delete,
            cleanup_lookback_minutes,
            base_url,
        })
    }

    /// Whether an attribute name may be set through `attach` options.
    pub fn is_attachable_attribute(&self, name: &str) -> bool {
        self.attach_whitelist.iter().any(|a| a == name)
    }
}
