//! Storage backend capability set.
//!
//! Both variants (local filesystem, remote object store) must behave
//! identically in observable effect: deleting an absent path succeeds,
//! `exists` on an absent path returns `false`, and a directory with no
//! files under it lists as empty whether or not the directory node
//! itself exists.

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};

use attache_core::Result;

/// Uniform file operations dispatched by an attachment's `disk` field.
#[async_trait]
pub trait StorageBackend: Send + Sync + std::fmt::Debug {
    /// Write `data` to `path`, creating missing parent structure.
    async fn put(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Write a stream to `path`, returning the number of bytes written.
    ///
    /// The default implementation buffers the stream and delegates to
    /// [`StorageBackend::put`]; variants with a native streaming write
    /// override it.
    async fn put_stream(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<u64> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;
        let len = data.len() as u64;
        self.put(path, &data).await?;
        Ok(len)
    }

    /// Read the full contents at `path`.
    async fn get(&self, path: &str) -> Result<Vec<u8>>;

    /// Delete the file at `path`. Absence is success, not an error.
    async fn delete(&self, path: &str) -> Result<()>;

    /// Whether a file exists at `path`. Absence is `false`, never an
    /// error.
    async fn exists(&self, path: &str) -> Result<bool>;

    /// List every file under `path`, recursively. An absent directory
    /// lists as empty.
    async fn list_files(&self, path: &str) -> Result<Vec<String>>;

    /// Size in bytes of the file at `path`.
    async fn size(&self, path: &str) -> Result<u64>;

    /// MIME type of the file at `path`.
    async fn mime_type(&self, path: &str) -> Result<String>;

    /// Delete the directory at `path` and everything under it.
    /// Absence is success.
    async fn delete_directory(&self, path: &str) -> Result<()>;
}
