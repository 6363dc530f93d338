//! Attachment service: record creation, owner binding, delivery, and
//! deletion, orchestrating the repository, disk set, partitioner, and
//! URL signer.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map as JsonMap, Value as JsonValue};
use tokio::io::AsyncRead;
use tracing::{debug, info};

use attache_core::defaults::{LOCAL_DISK, SESSION_VERIFY_KEY};
use attache_core::mime::detect_mime;
use attache_core::models::{AttachmentRecord, Owner};
use attache_core::partition::storage_path;
use attache_core::repository::AttachmentRepository;
use attache_core::urls::UrlBuilder;
use attache_core::{Error, Result, StorageConfig};
use attache_crypto::{Disposition, UrlSigner};

use crate::backend::StorageBackend;
use crate::cascade::DeleteCascade;
use crate::disks::DiskSet;
use crate::output::{AttachmentOutput, OutputHook};

/// Descriptor for a file being stored.
#[derive(Debug, Clone)]
pub struct NewAttachment {
    /// Disk servicing the record; `"local"` by default.
    pub disk: String,
    /// Original file name (extension drives the stored path suffix).
    pub filename: String,
    pub key: Option<String>,
    pub group: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub metadata: JsonValue,
}

impl NewAttachment {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            disk: LOCAL_DISK.to_string(),
            filename: filename.into(),
            key: None,
            group: None,
            title: None,
            description: None,
            metadata: JsonValue::Object(JsonMap::new()),
        }
    }

    pub fn on_disk(mut self, disk: impl Into<String>) -> Self {
        self.disk = disk.into();
        self
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.group = Some(group.into());
        self
    }
}

/// Storage-core entry point for attachment lifecycle operations.
pub struct AttachmentService {
    repo: Arc<dyn AttachmentRepository>,
    disks: DiskSet,
    signer: UrlSigner,
    urls: UrlBuilder,
    cascade: DeleteCascade,
    config: StorageConfig,
    output_hook: Option<Box<dyn OutputHook>>,
}

impl AttachmentService {
    pub fn new(
        repo: Arc<dyn AttachmentRepository>,
        disks: DiskSet,
        signer: UrlSigner,
        config: StorageConfig,
    ) -> Self {
        let urls = UrlBuilder::new(config.base_url.clone());
        let cascade = DeleteCascade::new(config.storage_prefix.clone());
        Self {
            repo,
            disks,
            signer,
            urls,
            cascade,
            config,
            output_hook: None,
        }
    }

    /// Install a pre-output hook that may veto delivery.
    pub fn with_output_hook(mut self, hook: impl OutputHook + 'static) -> Self {
        self.output_hook = Some(Box::new(hook));
        self
    }

    /// The persistence collaborator (used by the cleanup sweeper).
    pub fn repository(&self) -> &Arc<dyn AttachmentRepository> {
        &self.repo
    }

    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    fn backend_for(&self, record: &AttachmentRecord) -> Result<Arc<dyn StorageBackend>> {
        self.disks.for_record(record)
    }

    /// Generate the record uuid and its derived storage path.
    ///
    /// The path is computed exactly once here; it is immutable on the
    /// record afterward.
    fn derive_identity(&self, filename: &str) -> Result<(String, String)> {
        let uuid = self.config.id_strategy.generate();
        if uuid.is_empty() {
            return Err(Error::Validation(
                "id strategy produced an empty identifier".to_string(),
            ));
        }
        let extension = file_extension(filename);
        let filepath = storage_path(&self.config.storage_prefix, &uuid, extension);
        Ok((uuid, filepath))
    }

    fn assemble(
        &self,
        new: NewAttachment,
        uuid: String,
        filepath: String,
        filetype: String,
        filesize: i64,
    ) -> AttachmentRecord {
        let now = Utc::now();
        AttachmentRecord {
            id: 0,
            uuid,
            owner_type: None,
            owner_id: None,
            disk: new.disk,
            filepath,
            filename: new.filename,
            filetype,
            filesize,
            key: new.key,
            group: new.group,
            title: new.title,
            description: new.description,
            metadata: new.metadata,
            created_at: now,
            updated_at: now,
        }
    }

    /// Store a byte buffer as a new (unattached) record.
    pub async fn create_from_bytes(
        &self,
        new: NewAttachment,
        data: &[u8],
    ) -> Result<AttachmentRecord> {
        let backend = self.disks.get(&new.disk)?;
        let (uuid, filepath) = self.derive_identity(&new.filename)?;
        let filetype = detect_mime(&new.filename, data);

        backend.put(&filepath, data).await?;

        let record = self.assemble(new, uuid, filepath, filetype, data.len() as i64);
        let record = self.repo.insert(record).await?;
        debug!(
            attachment_uuid = %record.uuid,
            disk = %record.disk,
            storage_path = %record.filepath,
            "attachment created"
        );
        Ok(record)
    }

    /// Store a local file (streamed, not buffered) as a new record.
    /// The filename defaults to the source path's file name.
    pub async fn create_from_path(
        &self,
        mut new: NewAttachment,
        source: &Path,
    ) -> Result<AttachmentRecord> {
        if new.filename.is_empty() {
            new.filename = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
        }
        let mut file = tokio::fs::File::open(source).await?;
        self.create_from_stream(new, &mut file).await
    }

    /// Store a byte stream as a new record. The MIME type is resolved
    /// from the stored file after the write completes.
    pub async fn create_from_stream(
        &self,
        new: NewAttachment,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<AttachmentRecord> {
        let backend = self.disks.get(&new.disk)?;
        let (uuid, filepath) = self.derive_identity(&new.filename)?;

        let written = backend.put_stream(&filepath, reader).await?;
        let filetype = backend.mime_type(&filepath).await?;

        let record = self.assemble(new, uuid, filepath, filetype, written as i64);
        let record = self.repo.insert(record).await?;
        debug!(
            attachment_uuid = %record.uuid,
            disk = %record.disk,
            storage_path = %record.filepath,
            "attachment created from stream"
        );
        Ok(record)
    }

    /// Bind the record identified by `uuid` to an owner.
    ///
    /// A sibling of the same owner holding the same key is fully
    /// deleted first, so the key stays unique per owner. Only
    /// whitelisted attributes from `options` are applied, and the
    /// internal session-verification metadata key is stripped before
    /// the record is persisted. Returns `Ok(None)` when no record
    /// carries `uuid`.
    pub async fn attach(
        &self,
        uuid: &str,
        owner: &Owner,
        options: JsonMap<String, JsonValue>,
    ) -> Result<Option<AttachmentRecord>> {
        let Some(mut record) = self.repo.find_by_uuid(uuid).await? else {
            return Ok(None);
        };

        for (name, value) in options {
            if !self.config.is_attachable_attribute(&name) {
                continue;
            }
            apply_attribute(&mut record, &name, value);
        }
        record.remove_metadata_key(SESSION_VERIFY_KEY);

        if let Some(key) = record.key.clone() {
            if let Some(prior) = self
                .repo
                .find_by_owner_key(&owner.owner_type, owner.owner_id, &key)
                .await?
            {
                if prior.id != record.id {
                    self.delete(&prior).await?;
                }
            }
        }

        record.set_owner(owner);
        record.updated_at = Utc::now();
        let record = self.repo.update(record).await?;
        info!(
            attachment_uuid = %record.uuid,
            owner_type = %owner.owner_type,
            owner_id = owner.owner_id,
            "attachment bound to owner"
        );
        Ok(Some(record))
    }

    /// Raw stored bytes for a record.
    pub async fn contents(&self, record: &AttachmentRecord) -> Result<Vec<u8>> {
        let backend = self.backend_for(record)?;
        backend.get(&record.filepath).await
    }

    /// Full response description for proxied delivery, or `None` when
    /// the pre-output hook vetoes it.
    pub async fn output(
        &self,
        record: &AttachmentRecord,
        disposition: Disposition,
    ) -> Result<Option<AttachmentOutput>> {
        if let Some(hook) = &self.output_hook {
            if !hook.before_output(record) {
                debug!(attachment_uuid = %record.uuid, "output vetoed by hook");
                return Ok(None);
            }
        }

        let body = self.contents(record).await?;
        Ok(Some(AttachmentOutput::build(record, disposition, body)))
    }

    /// Permanent proxy URL (forced download).
    pub fn proxy_url(&self, record: &AttachmentRecord) -> String {
        self.urls.proxy_url(record)
    }

    /// Permanent proxy URL (inline rendering).
    pub fn proxy_url_inline(&self, record: &AttachmentRecord) -> String {
        self.urls.proxy_url_inline(record)
    }

    /// Time-limited signed URL expiring at `expire` (epoch seconds).
    pub fn temporary_url(
        &self,
        record: &AttachmentRecord,
        expire: i64,
        inline: bool,
    ) -> Result<String> {
        let disposition = if inline {
            Disposition::Inline
        } else {
            Disposition::Attachment
        };
        let token = self
            .signer
            .issue(&record.uuid, expire, disposition)
            .map_err(|e| Error::Token(e.to_string()))?;
        Ok(self.urls.signed_url(&token))
    }

    /// Resolve a signed-URL token back to its payload.
    ///
    /// Expiry checking is the caller's responsibility; a tampered token
    /// fails here with a token error.
    pub fn resolve_token(&self, token: &str) -> Result<attache_crypto::TokenPayload> {
        self.signer
            .resolve(token)
            .map_err(|e| Error::Token(e.to_string()))
    }

    /// Delete the record and, when cascading is enabled, its backing
    /// file plus any now-empty partition directories.
    ///
    /// File cleanup runs before the row delete: a failed cascade leaves
    /// the row in place, so the record stays visible to a later sweep
    /// retry instead of leaking the file.
    pub async fn delete(&self, record: &AttachmentRecord) -> Result<()> {
        if self.config.cascade_on_delete {
            let backend = self.backend_for(record)?;
            self.cascade.run(backend.as_ref(), &record.filepath).await?;
        }

        self.repo.delete(record.id).await?;

        debug!(
            attachment_uuid = %record.uuid,
            storage_path = %record.filepath,
            "attachment deleted"
        );
        Ok(())
    }
}

fn apply_attribute(record: &mut AttachmentRecord, name: &str, value: JsonValue) {
    match name {
        "key" => record.key = value.as_str().map(String::from),
        "group" => record.group = value.as_str().map(String::from),
        "title" => record.title = value.as_str().map(String::from),
        "description" => record.description = value.as_str().map(String::from),
        "metadata" => {
            if value.is_object() {
                record.metadata = value;
            }
        }
        _ => {}
    }
}

fn file_extension(filename: &str) -> Option<&str> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("photo.JPG"), Some("JPG"));
        assert_eq!(file_extension("archive.tar.gz"), Some("gz"));
        assert_eq!(file_extension("README"), None);
        assert_eq!(file_extension(".hidden"), None);
    }

    #[test]
    fn test_apply_attribute_whitelisted_fields() {
        let mut record = AttachmentRecord {
            id: 1,
            uuid: "u".to_string(),
            owner_type: None,
            owner_id: None,
            disk: "local".to_string(),
            filepath: "p".to_string(),
            filename: "f".to_string(),
            filetype: "t".to_string(),
            filesize: 0,
            key: None,
            group: None,
            title: None,
            description: None,
            metadata: JsonValue::Object(JsonMap::new()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        apply_attribute(&mut record, "key", JsonValue::String("cover".into()));
        apply_attribute(&mut record, "title", JsonValue::String("Cover".into()));
        apply_attribute(&mut record, "metadata", serde_json::json!({"a": 1}));
        // Non-object metadata is ignored
        apply_attribute(&mut record, "metadata", JsonValue::String("junk".into()));

        assert_eq!(record.key.as_deref(), Some("cover"));
        assert_eq!(record.title.as_deref(), Some("Cover"));
        assert_eq!(record.metadata, serde_json::json!({"a": 1}));
    }
}
