//! Disk registry and dispatch.
//!
//! A record's `disk` field names the backend servicing all of its file
//! operations; the sentinel `"local"` selects the local filesystem
//! variant. Remote disks can be registered directly or built from a
//! DSN (`file://`, `memory://`, `s3://`).

use std::collections::HashMap;
use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::memory::InMemory;
use url::Url;

use attache_core::defaults::LOCAL_DISK;
use attache_core::models::AttachmentRecord;
use attache_core::{Error, Result};

use crate::backend::StorageBackend;
use crate::local::LocalDisk;
use crate::remote::ObjectDisk;

/// Named set of storage backends, selected per record via `disk`.
#[derive(Default)]
pub struct DiskSet {
    disks: HashMap<String, Arc<dyn StorageBackend>>,
}

impl DiskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the local filesystem variant under the `"local"`
    /// sentinel name, rooted at `root`.
    pub fn with_local(mut self, root: impl Into<std::path::PathBuf>) -> Self {
        self.disks
            .insert(LOCAL_DISK.to_string(), Arc::new(LocalDisk::new(root)));
        self
    }

    /// Register a backend under an arbitrary disk name.
    pub fn with_disk(mut self, name: impl Into<String>, backend: Arc<dyn StorageBackend>) -> Self {
        self.disks.insert(name.into(), backend);
        self
    }

    /// Register a disk built from a storage DSN.
    ///
    /// Supported schemes: `file:///path` (local variant rooted at the
    /// path), `memory://` (in-memory object store, for tests), and
    /// `s3://[key:secret@]host[:port]/bucket`.
    pub fn with_dsn(mut self, name: impl Into<String>, dsn: &str) -> Result<Self> {
        let backend = backend_from_dsn(dsn)?;
        self.disks.insert(name.into(), backend);
        Ok(self)
    }

    /// Look up a disk by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn StorageBackend>> {
        self.disks
            .get(name)
            .cloned()
            .ok_or_else(|| Error::Config(format!("unknown disk: {}", name)))
    }

    /// The backend servicing a record, per its `disk` field.
    pub fn for_record(&self, record: &AttachmentRecord) -> Result<Arc<dyn StorageBackend>> {
        self.get(&record.disk)
    }
}

fn backend_from_dsn(dsn: &str) -> Result<Arc<dyn StorageBackend>> {
    let url =
        Url::parse(dsn).map_err(|e| Error::Config(format!("invalid storage DSN '{}': {}", dsn, e)))?;

    match url.scheme() {
        "file" => {
            let path = url.path();
            if path.is_empty() || path == "/" {
                return Err(Error::Config(
                    "file DSN must specify a path: file:///path/to/storage".to_string(),
                ));
            }
            Ok(Arc::new(LocalDisk::new(path)))
        }
        "memory" => Ok(Arc::new(ObjectDisk::new(Arc::new(InMemory::new())))),
        "s3" => {
            let builder = s3_builder_from_dsn(&url)?;
            let store = builder
                .build()
                .map_err(|e| Error::Config(format!("S3 client build failed: {}", e)))?;
            Ok(Arc::new(ObjectDisk::new(Arc::new(store))))
        }
        scheme => Err(Error::Config(format!(
            "unsupported storage scheme: {}. Supported: file, memory, s3",
            scheme
        ))),
    }
}

/// Build an S3 client from `s3://[access_key:secret_key@]host[:port]/bucket`.
///
/// Non-AWS hosts are treated as S3-compatible endpoints (MinIO and
/// friends) with path-style requests.
fn s3_builder_from_dsn(dsn: &Url) -> Result<AmazonS3Builder> {
    let host = dsn
        .host_str()
        .ok_or_else(|| Error::Config("missing S3 host in DSN".to_string()))?;
    let port = dsn.port();
    let bucket = dsn.path().trim_start_matches('/');

    if bucket.is_empty() {
        return Err(Error::Config(
            "S3 DSN must specify a bucket: s3://host/bucket".to_string(),
        ));
    }

    let mut builder = AmazonS3Builder::from_env()
        .with_bucket_name(bucket)
        .with_region("us-east-1");

    let access_key = dsn.username();
    if !access_key.is_empty() {
        builder = builder
            .with_access_key_id(access_key)
            .with_secret_access_key(dsn.password().unwrap_or(""));
    }

    if !host.contains("amazonaws.com") {
        let scheme = if port == Some(443) { "https" } else { "http" };
        let endpoint = match port {
            Some(p) => format!("{scheme}://{host}:{p}"),
            None => format!("{scheme}://{host}"),
        };
        builder = builder
            .with_endpoint(endpoint)
            .with_allow_http(true)
            .with_virtual_hosted_style_request(false);
    }

    Ok(builder)
}
