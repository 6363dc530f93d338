//! Centralized default constants for attache.
//!
//! **This module is the single source of truth** for shared default
//! values. Crates reference these constants instead of defining their
//! own magic numbers.

// =============================================================================
// STORAGE LAYOUT
// =============================================================================

/// Root prefix under which all attachment files are stored.
pub const STORAGE_PREFIX: &str = "attachments";

/// Sentinel disk name that selects the local filesystem variant.
pub const LOCAL_DISK: &str = "local";

/// Number of leading identifier characters consumed by partitioning.
pub const PARTITION_WIDTH: usize = 9;

/// Characters per partition path segment.
pub const PARTITION_SEGMENT: usize = 3;

// =============================================================================
// DELETE CASCADE
// =============================================================================

/// Maximum number of ancestor directories pruned after a file delete.
/// Matches the three partition levels below the storage prefix.
pub const PRUNE_DEPTH: usize = 3;

// =============================================================================
// CLEANUP SWEEP
// =============================================================================

/// Records fetched and deleted per sweep batch.
pub const SWEEP_BATCH_SIZE: usize = 100;

/// Default lookback window (minutes) for orphan cleanup.
pub const CLEANUP_LOOKBACK_MINUTES: i64 = 1440;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Default identifier generation strategy name.
pub const ID_STRATEGY: &str = "uuid4";

// =============================================================================
// DELIVERY
// =============================================================================

/// Cache-Control header value for proxied attachment responses.
pub const OUTPUT_CACHE_CONTROL: &str = "private, max-age=86400";

/// Metadata key used for upload-session verification; stripped before
/// a record is bound to an owner.
pub const SESSION_VERIFY_KEY: &str = "upload_session";
