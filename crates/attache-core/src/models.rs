//! Core data model for attachment records.
//!
//! An [`AttachmentRecord`] is the in-memory representation of one
//! stored file. Persistence belongs to an external collaborator behind
//! [`crate::repository::AttachmentRepository`]; this module only holds
//! the fields and the pure accessors derived from them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Owning entity reference for a bound attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    /// Entity type discriminator, e.g. `"Post"`.
    pub owner_type: String,
    /// Entity primary key.
    pub owner_id: i64,
}

impl Owner {
    pub fn new(owner_type: impl Into<String>, owner_id: i64) -> Self {
        Self {
            owner_type: owner_type.into(),
            owner_id,
        }
    }
}

/// One stored file attachment.
///
/// Invariants:
/// - `uuid` is non-empty and immutable after assignment.
/// - `filepath` is derived once from `uuid` + extension at creation and
///   never recomputed.
/// - `key` is unique among attachments of the same owner; attaching a
///   new record under a colliding key replaces the prior one.
/// - `disk` selects the storage backend for every file operation over
///   the record's whole life.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentRecord {
    /// Opaque stable primary key (0 until the repository assigns one).
    pub id: i64,
    /// Globally unique identifier, assigned once at creation.
    pub uuid: String,
    /// Owning entity type; `None` together with `owner_id == None`
    /// means the record is orphaned.
    pub owner_type: Option<String>,
    /// Owning entity id.
    pub owner_id: Option<i64>,
    /// Backend selector; `"local"` is the local filesystem sentinel.
    pub disk: String,
    /// Backend-relative storage path, stable for the record's life.
    pub filepath: String,
    /// Original (client-supplied) file name.
    pub filename: String,
    /// MIME type.
    pub filetype: String,
    /// Size in bytes.
    pub filesize: i64,
    /// Logical slot, unique per owner.
    pub key: Option<String>,
    /// Free-form classification group.
    pub group: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    /// Arbitrary key-value mapping, dot-addressable via
    /// [`AttachmentRecord::metadata_value`].
    pub metadata: JsonValue,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AttachmentRecord {
    /// Whether the record has no owner association and is therefore
    /// eligible for cleanup once past the age threshold.
    pub fn is_orphaned(&self) -> bool {
        self.owner_type.is_none() && self.owner_id.is_none()
    }

    /// Bind the record to an owner.
    pub fn set_owner(&mut self, owner: &Owner) {
        self.owner_type = Some(owner.owner_type.clone());
        self.owner_id = Some(owner.owner_id);
    }

    /// File extension of the original filename, if any.
    pub fn extension(&self) -> Option<&str> {
        let (stem, ext) = self.filename.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext)
    }

    /// Directory component of the storage path.
    pub fn directory(&self) -> &str {
        match self.filepath.rsplit_once('/') {
            Some((dir, _)) => dir,
            None => "",
        }
    }

    /// Dot-addressable metadata lookup: `metadata_value("exif.gps.lat")`
    /// walks nested objects.
    pub fn metadata_value(&self, path: &str) -> Option<&JsonValue> {
        let mut current = &self.metadata;
        for segment in path.split('.') {
            current = current.as_object()?.get(segment)?;
        }
        Some(current)
    }

    /// Set a top-level metadata key, promoting non-object metadata to an
    /// empty object first.
    pub fn set_metadata_key(&mut self, key: &str, value: JsonValue) {
        if !self.metadata.is_object() {
            self.metadata = JsonValue::Object(serde_json::Map::new());
        }
        if let Some(map) = self.metadata.as_object_mut() {
            map.insert(key.to_string(), value);
        }
    }

    /// Remove a top-level metadata key, returning the prior value.
    pub fn remove_metadata_key(&mut self, key: &str) -> Option<JsonValue> {
        self.metadata.as_object_mut()?.remove(key)
    }
}
