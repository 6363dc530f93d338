//! Delete cascade: backing-file removal plus bounded pruning of
//! now-empty partition directories.
//!
//! After the file delete, pruning walks up from `dirname(filepath)` at
//! most three levels (the partition depth), deleting each directory
//! that lists zero files recursively and stopping at the first
//! non-empty one. The storage prefix itself is never deleted. A
//! directory that does not exist lists as empty on both backend
//! variants and is pruned through; `delete_directory` is idempotent so
//! this is safe.
//!
//! Prune failures are absorbed with a WARN; only the file delete
//! itself propagates errors.

use tracing::{debug, warn};

use attache_core::defaults::PRUNE_DEPTH;
use attache_core::Result;

use crate::backend::StorageBackend;

/// Cascade behavior applied when an attachment record is destroyed.
#[derive(Debug, Clone)]
pub struct DeleteCascade {
    prefix: String,
    depth: usize,
}

impl DeleteCascade {
    /// Cascade bounded to the partition depth below `prefix`.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            depth: PRUNE_DEPTH,
        }
    }

    /// Delete the file at `filepath` and prune empty ancestors.
    ///
    /// Invoked exactly once per record deletion when cascading is
    /// enabled. File absence is success.
    pub async fn run(&self, backend: &dyn StorageBackend, filepath: &str) -> Result<()> {
        backend.delete(filepath).await?;
        debug!(storage_path = %filepath, "cascade: file deleted");

        let mut dir = parent_dir(filepath);
        for _ in 0..self.depth {
            let Some(current) = dir else { break };
            if current.is_empty() || current == self.prefix {
                break;
            }

            match backend.list_files(&current).await {
                Ok(files) if files.is_empty() => {
                    if let Err(e) = backend.delete_directory(&current).await {
                        warn!(dir = %current, error = %e, "cascade: prune failed; stopping");
                        break;
                    }
                    debug!(dir = %current, "cascade: pruned empty directory");
                }
                Ok(_) => break,
                Err(e) => {
                    warn!(dir = %current, error = %e, "cascade: listing failed; stopping");
                    break;
                }
            }

            dir = parent_dir(&current);
        }

        Ok(())
    }
}

fn parent_dir(path: &str) -> Option<String> {
    path.rsplit_once('/').map(|(dir, _)| dir.to_string())
}
