//! Repository trait abstracting the external persistence layer.
//!
//! Record persistence (create/read/update of attachment metadata) is an
//! external collaborator. This trait captures exactly the query surface
//! the storage core consumes: lookup by uuid, lookup by owner+key, row
//! insert/update/delete, and the counted, batched orphan selection the
//! cleanup sweep is built on.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::AttachmentRecord;

/// Persistence collaborator for attachment records.
///
/// Implementations must treat `orphans_before` as a live query: records
/// deleted between batches no longer match, so a sweep can fetch the
/// first page repeatedly until it comes back empty.
#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// Insert a new record, returning it with its assigned `id`.
    async fn insert(&self, record: AttachmentRecord) -> Result<AttachmentRecord>;

    /// Persist changes to an existing record.
    async fn update(&self, record: AttachmentRecord) -> Result<AttachmentRecord>;

    /// Fetch a record by its UUID.
    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<AttachmentRecord>>;

    /// Fetch the record bound to `owner_type`/`owner_id` under `key`,
    /// if any. Used to replace colliding keys on attach.
    async fn find_by_owner_key(
        &self,
        owner_type: &str,
        owner_id: i64,
        key: &str,
    ) -> Result<Option<AttachmentRecord>>;

    /// Delete the record row. Backing-file cleanup is the caller's job.
    async fn delete(&self, id: i64) -> Result<()>;

    /// Count records with no owner and `updated_at <= cutoff`.
    async fn count_orphans_before(&self, cutoff: DateTime<Utc>) -> Result<u64>;

    /// Fetch up to `limit` records with no owner and
    /// `updated_at <= cutoff`, oldest first.
    async fn orphans_before(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AttachmentRecord>>;
}
