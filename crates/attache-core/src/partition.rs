//! Deterministic storage-path partitioning.
//!
//! Derives a low-fan-out directory path and disk filename from an
//! attachment identifier. The first nine separator-stripped characters
//! of the identifier become three path segments of three characters
//! each (`ABCDE1234…` → `ABC/DE1/234`), bounding any single directory
//! to a few thousand entries even at large scale.

use crate::defaults::{PARTITION_SEGMENT, PARTITION_WIDTH};

/// Strip identifier separator characters (UUID hyphens, underscores).
fn normalize(id: &str) -> String {
    id.chars().filter(|c| *c != '-' && *c != '_').collect()
}

/// Partition directory for an identifier, e.g. `ABC/DE1/234`.
///
/// Identifiers shorter than nine characters yield fewer (or shorter)
/// segments; an empty identifier yields an empty directory.
pub fn partition_dir(id: &str) -> String {
    let normalized = normalize(id);
    let head: Vec<char> = normalized.chars().take(PARTITION_WIDTH).collect();

    head.chunks(PARTITION_SEGMENT)
        .map(|seg| seg.iter().collect::<String>())
        .collect::<Vec<_>>()
        .join("/")
}

/// Disk filename for an identifier: the separator-stripped identifier,
/// suffixed with `.` + lowercased extension when one is present.
pub fn disk_filename(id: &str, extension: Option<&str>) -> String {
    let normalized = normalize(id);
    match extension {
        Some(ext) if !ext.is_empty() => format!("{}.{}", normalized, ext.to_lowercase()),
        _ => normalized,
    }
}

/// Full backend-relative storage path: `prefix/partition/filename`.
///
/// Computed exactly once per record at creation; the record caches the
/// result in its `filepath` field and never recomputes it.
pub fn storage_path(prefix: &str, id: &str, extension: Option<&str>) -> String {
    let dir = partition_dir(id);
    let name = disk_filename(id, extension);
    if dir.is_empty() {
        format!("{}/{}", prefix, name)
    } else {
        format!("{}/{}/{}", prefix, dir, name)
    }
}
