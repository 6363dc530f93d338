//! Local filesystem storage variant.
//!
//! Every path argument is resolved relative to a fixed root before
//! touching filesystem primitives. Directory creation is implicit and
//! idempotent; a creation failure where the directory exists afterward
//! (a benign race with a concurrent creator) is logged at WARN and
//! absorbed.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::{debug, warn};

use attache_core::mime::{detect_mime, mime_from_path};
use attache_core::Result;

use crate::backend::StorageBackend;

/// Bytes sniffed from a file head for magic-byte MIME detection.
const SNIFF_LEN: usize = 8192;

/// Local filesystem disk rooted at a fixed base directory.
#[derive(Debug)]
pub struct LocalDisk {
    root: PathBuf,
}

impl LocalDisk {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path.trim_start_matches('/'))
    }

    /// Create `dir` and its ancestors. A failure is absorbed with a
    /// WARN when the directory exists afterward (lost a creation race).
    async fn ensure_dir(&self, dir: &Path) -> Result<()> {
        match fs::create_dir_all(dir).await {
            Ok(()) => Ok(()),
            Err(e) => {
                if fs::try_exists(dir).await.unwrap_or(false) {
                    warn!(
                        dir = %dir.display(),
                        error = %e,
                        "directory creation failed but directory exists; continuing"
                    );
                    Ok(())
                } else {
                    Err(e.into())
                }
            }
        }
    }

    async fn prepare_write(&self, path: &str) -> Result<(PathBuf, PathBuf)> {
        let full = self.resolve(path);
        if let Some(parent) = full.parent() {
            self.ensure_dir(parent).await?;
        }

        let file_name = full
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let temp = full.with_file_name(format!(".{}.tmp", file_name));
        Ok((full, temp))
    }
}

#[async_trait]
impl StorageBackend for LocalDisk {
    async fn put(&self, path: &str, data: &[u8]) -> Result<()> {
        let (full, temp) = self.prepare_write(path).await?;
        debug!(storage_path = %path, size = data.len(), "local disk: put");

        // Atomic write: temp file + rename
        let mut file = fs::File::create(&temp).await?;
        file.write_all(data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp, &full).await?;
        Ok(())
    }

    async fn put_stream(
        &self,
        path: &str,
        reader: &mut (dyn AsyncRead + Send + Unpin),
    ) -> Result<u64> {
        let (full, temp) = self.prepare_write(path).await?;
        debug!(storage_path = %path, "local disk: put_stream");

        let mut file = fs::File::create(&temp).await?;
        let written = tokio::io::copy(reader, &mut file).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&temp, &full).await?;
        Ok(written)
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        Ok(fs::read(self.resolve(path)).await?)
    }

    async fn delete(&self, path: &str) -> Result<()> {
        match fs::remove_file(self.resolve(path)).await {
            Ok(()) => Ok(()),
            // Idempotent: deleting an absent file is success
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, path: &str) -> Result<bool> {
        Ok(fs::try_exists(self.resolve(path)).await?)
    }

    async fn list_files(&self, path: &str) -> Result<Vec<String>> {
        let base = self.resolve(path);
        if !fs::try_exists(&base).await? {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let mut pending = vec![base];
        while let Some(dir) = pending.pop() {
            let mut entries = fs::read_dir(&dir).await?;
            while let Some(entry) = entries.next_entry().await? {
                let entry_path = entry.path();
                if entry.file_type().await?.is_dir() {
                    pending.push(entry_path);
                } else {
                    let relative = entry_path
                        .strip_prefix(&self.root)
                        .unwrap_or(&entry_path)
                        .to_string_lossy()
                        .into_owned();
                    files.push(relative);
                }
            }
        }
        files.sort();
        Ok(files)
    }

    async fn size(&self, path: &str) -> Result<u64> {
        Ok(fs::metadata(self.resolve(path)).await?.len())
    }

    async fn mime_type(&self, path: &str) -> Result<String> {
        use tokio::io::AsyncReadExt;

        let full = self.resolve(path);
        let mut file = fs::File::open(&full).await?;
        let mut head = vec![0u8; SNIFF_LEN];
        let n = file.read(&mut head).await?;
        head.truncate(n);

        Ok(detect_mime_or_path(path, &head))
    }

    async fn delete_directory(&self, path: &str) -> Result<()> {
        let full = self.resolve(path);
        if fs::try_exists(&full).await? {
            fs::remove_dir_all(&full).await?;
        }
        Ok(())
    }
}

fn detect_mime_or_path(path: &str, head: &[u8]) -> String {
    if let Some(kind) = infer_kind(head) {
        return kind;
    }
    mime_from_path(path)
}

fn infer_kind(head: &[u8]) -> Option<String> {
    // detect_mime falls back by extension internally; pass an
    // extensionless name so only magic bytes are consulted here.
    let detected = detect_mime("", head);
    (detected != attache_core::mime::OCTET_STREAM).then_some(detected)
}
