//! In-memory attachment repository.
//!
//! The persistence engine is an external collaborator; this
//! implementation backs tests and examples with the same observable
//! query semantics (live orphan selection, owner+key lookup).

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use attache_core::models::AttachmentRecord;
use attache_core::repository::AttachmentRepository;
use attache_core::{Error, Result};

/// `AttachmentRepository` backed by a process-local map.
#[derive(Default)]
pub struct MemoryRepository {
    records: RwLock<HashMap<i64, AttachmentRecord>>,
    next_id: AtomicI64,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    /// Number of records currently stored.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl AttachmentRepository for MemoryRepository {
    async fn insert(&self, mut record: AttachmentRecord) -> Result<AttachmentRecord> {
        if record.id == 0 {
            record.id = self.next_id.fetch_add(1, Ordering::SeqCst);
        }
        self.records
            .write()
            .await
            .insert(record.id, record.clone());
        Ok(record)
    }

    async fn update(&self, record: AttachmentRecord) -> Result<AttachmentRecord> {
        let mut records = self.records.write().await;
        if !records.contains_key(&record.id) {
            return Err(Error::NotFound(format!("attachment {}", record.id)));
        }
        records.insert(record.id, record.clone());
        Ok(record)
    }

    async fn find_by_uuid(&self, uuid: &str) -> Result<Option<AttachmentRecord>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| r.uuid == uuid)
            .cloned())
    }

    async fn find_by_owner_key(
        &self,
        owner_type: &str,
        owner_id: i64,
        key: &str,
    ) -> Result<Option<AttachmentRecord>> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .find(|r| {
                r.owner_type.as_deref() == Some(owner_type)
                    && r.owner_id == Some(owner_id)
                    && r.key.as_deref() == Some(key)
            })
            .cloned())
    }

    async fn delete(&self, id: i64) -> Result<()> {
        self.records.write().await.remove(&id);
        Ok(())
    }

    async fn count_orphans_before(&self, cutoff: DateTime<Utc>) -> Result<u64> {
        Ok(self
            .records
            .read()
            .await
            .values()
            .filter(|r| r.is_orphaned() && r.updated_at <= cutoff)
            .count() as u64)
    }

    async fn orphans_before(
        &self,
        cutoff: DateTime<Utc>,
        limit: usize,
    ) -> Result<Vec<AttachmentRecord>> {
        let records = self.records.read().await;
        let mut matching: Vec<AttachmentRecord> = records
            .values()
            .filter(|r| r.is_orphaned() && r.updated_at <= cutoff)
            .cloned()
            .collect();
        matching.sort_by_key(|r| r.updated_at);
        matching.truncate(limit);
        Ok(matching)
    }
}
