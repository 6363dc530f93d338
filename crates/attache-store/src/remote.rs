//! Remote object-store storage variant.
//!
//! Wraps any [`object_store::ObjectStore`] implementation (S3,
//! in-memory, ...). Paths are passed through after normalization to
//! object_store's canonical key form; the source system's
//! leading-separator rule collapses into that normalization because
//! object keys are already bucket-absolute.

use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectStore, PutPayload};
use tracing::debug;

use attache_core::mime::mime_from_path;
use attache_core::{Error, Result};

use crate::backend::StorageBackend;

/// Remote disk backed by an `object_store` client.
#[derive(Debug)]
pub struct ObjectDisk {
    store: Arc<dyn ObjectStore>,
}

impl ObjectDisk {
    pub fn new(store: Arc<dyn ObjectStore>) -> Self {
        Self { store }
    }

    fn location(&self, path: &str) -> ObjectPath {
        ObjectPath::from(path.trim_start_matches('/'))
    }
}

fn storage_err(e: object_store::Error) -> Error {
    Error::Storage(e.to_string())
}

#[async_trait]
impl StorageBackend for ObjectDisk {
    async fn put(&self, path: &str, data: &[u8]) -> Result<()> {
        let location = self.location(path);
        debug!(storage_path = %location, size = data.len(), "object disk: put");
        self.store
            .put(&location, PutPayload::from(data.to_vec()))
            .await
            .map_err(storage_err)?;
        Ok(())
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let result = self
            .store
            .get(&self.location(path))
            .await
            .map_err(storage_err)?;
        let bytes = result.bytes().await.map_err(storage_err)?;
        Ok(bytes.to_vec())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        match self.store.delete(&self.location(path)).await {
            Ok(()) => Ok(()),
            // Idempotent: deleting an absent key is success
            Err(object_store::Error::NotFound { .. }) => Ok(()),
            Err(e) => Err(storage_err(e)),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        match self.store.head(&self.location(path)).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(storage_err(e)),
        }
    }

    async fn list_files(&self, path: &str) -> Result<Vec<String>> {
        let prefix = self.location(path);
        let mut files: Vec<String> = self
            .store
            .list(Some(&prefix))
            .map_ok(|meta| meta.location.to_string())
            .try_collect()
            .await
            .map_err(storage_err)?;
        files.sort();
        Ok(files)
    }

    async fn size(&self, path: &str) -> Result<u64> {
        let meta = self
            .store
            .head(&self.location(path))
            .await
            .map_err(storage_err)?;
        Ok(meta.size as u64)
    }

    async fn mime_type(&self, path: &str) -> Result<String> {
        // Object stores expose no content for sniffing without a full
        // read; the key's extension is authoritative here.
        match self.exists(path).await? {
            true => Ok(mime_from_path(path)),
            false => Err(Error::NotFound(format!("no object at {}", path))),
        }
    }

    async fn delete_directory(&self, path: &str) -> Result<()> {
        // Object stores have no directories; deleting a "directory"
        // means deleting every key under the prefix.
        for file in self.list_files(path).await? {
            self.delete(&file).await?;
        }
        Ok(())
    }
}
