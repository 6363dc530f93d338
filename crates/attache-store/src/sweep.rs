//! Batched cleanup sweep for orphaned attachments.
//!
//! Selects records with no owner association whose `updated_at` is at
//! or past the cutoff, then deletes them through the full record
//! deletion path (cascade included) in fixed-size batches. The orphan
//! query is live: deleted records drop out of it, so the sweep fetches
//! the first page repeatedly until nothing matches. An interrupted
//! sweep is safe to re-run; deletion is idempotent and the predicate
//! naturally excludes already-deleted rows.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{info, trace};

use attache_core::defaults::SWEEP_BATCH_SIZE;
use attache_core::Result;

use crate::service::AttachmentService;

/// Outcome of a cleanup sweep. The empty case is reported distinctly
/// from "deleted zero of N".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// No record matched the cutoff predicate; nothing was deleted.
    Empty,
    /// The sweep ran and deleted this many records.
    Deleted(u64),
}

/// Drives batched deletion of orphaned attachments.
///
/// Destructive and irreversible; confirmation is the invoking
/// collaborator's job, the sweeper assumes it has been granted.
pub struct CleanupSweeper {
    service: Arc<AttachmentService>,
}

impl CleanupSweeper {
    pub fn new(service: Arc<AttachmentService>) -> Self {
        Self { service }
    }

    /// Sweep orphans older than `cutoff_minutes`.
    pub async fn sweep(&self, cutoff_minutes: i64) -> Result<SweepOutcome> {
        self.sweep_with_progress(cutoff_minutes, |_, _| {}).await
    }

    /// Sweep with a per-record progress callback `(deleted_so_far,
    /// total_matched)`.
    pub async fn sweep_with_progress(
        &self,
        cutoff_minutes: i64,
        progress: impl Fn(u64, u64),
    ) -> Result<SweepOutcome> {
        let cutoff = Utc::now() - Duration::minutes(cutoff_minutes);
        let repo = self.service.repository();

        let total = repo.count_orphans_before(cutoff).await?;
        if total == 0 {
            info!(cutoff_minutes, "cleanup sweep: no orphaned attachments");
            return Ok(SweepOutcome::Empty);
        }
        info!(
            cutoff_minutes,
            matched_count = total,
            "cleanup sweep: starting"
        );

        let mut deleted: u64 = 0;
        loop {
            let batch = repo.orphans_before(cutoff, SWEEP_BATCH_SIZE).await?;
            if batch.is_empty() {
                break;
            }

            for record in batch {
                self.service.delete(&record).await?;
                deleted += 1;
                progress(deleted, total);
                trace!(
                    attachment_uuid = %record.uuid,
                    deleted_count = deleted,
                    "cleanup sweep: record deleted"
                );
            }
        }

        info!(deleted_count = deleted, "cleanup sweep: complete");
        Ok(SweepOutcome::Deleted(deleted))
    }
}
