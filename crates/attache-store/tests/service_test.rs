//! Attachment service integration tests: creation, owner binding,
//! delivery, and cascade deletion over a real local disk.

use std::sync::Arc;

use attache_core::models::Owner;
use attache_core::{AttachmentRepository, StorageConfig};
use attache_crypto::{Disposition, SigningKey, UrlSigner};
use attache_store::{
    AttachmentService, DiskSet, MemoryRepository, NewAttachment, StorageBackend,
};
use serde_json::{json, Map};
use tempfile::TempDir;

fn service(root: &std::path::Path) -> (Arc<MemoryRepository>, AttachmentService) {
    let repo = Arc::new(MemoryRepository::new());
    let disks = DiskSet::new().with_local(root);
    let signer = UrlSigner::new(SigningKey::from_bytes([42u8; 32]));
    let config = StorageConfig {
        base_url: "https://files.example.test".to_string(),
        ..StorageConfig::default()
    };
    let service = AttachmentService::new(repo.clone(), disks, signer, config);
    (repo, service)
}

fn attach_options(key: &str) -> Map<String, serde_json::Value> {
    let mut options = Map::new();
    options.insert("key".to_string(), json!(key));
    options
}

#[tokio::test]
async fn test_create_from_bytes_populates_record() {
    let dir = TempDir::new().unwrap();
    let (_repo, service) = service(dir.path());

    let record = service
        .create_from_bytes(NewAttachment::new("report.PDF"), b"%PDF-1.4 pretend")
        .await
        .unwrap();

    assert!(!record.uuid.is_empty());
    assert_ne!(record.id, 0);
    assert_eq!(record.disk, "local");
    assert_eq!(record.filesize, 16);
    assert_eq!(record.filetype, "application/pdf");
    assert!(record.is_orphaned());

    // Path is prefix/three-level partition/uuid.ext with a lowercased
    // extension
    assert!(record.filepath.starts_with("attachments/"));
    assert!(record.filepath.ends_with(".pdf"));
    let segments: Vec<&str> = record.filepath.split('/').collect();
    assert_eq!(segments.len(), 5);
    assert_eq!(segments[1].len(), 3);
    assert_eq!(segments[2].len(), 3);
    assert_eq!(segments[3].len(), 3);

    // Bytes landed under the local root
    assert!(dir.path().join(&record.filepath).is_file());
}

#[tokio::test]
async fn test_contents_roundtrip() {
    let dir = TempDir::new().unwrap();
    let (_repo, service) = service(dir.path());

    let record = service
        .create_from_bytes(NewAttachment::new("notes.txt"), b"remember the milk")
        .await
        .unwrap();

    assert_eq!(
        service.contents(&record).await.unwrap(),
        b"remember the milk"
    );
}

#[tokio::test]
async fn test_create_from_path_streams_file() {
    let dir = TempDir::new().unwrap();
    let (_repo, service) = service(dir.path());

    let source = dir.path().join("upload.csv");
    tokio::fs::write(&source, b"a,b\n1,2\n").await.unwrap();

    let record = service
        .create_from_path(NewAttachment::new(""), &source)
        .await
        .unwrap();

    assert_eq!(record.filename, "upload.csv");
    assert_eq!(record.filesize, 8);
    assert_eq!(record.filetype, "text/csv");
}

#[tokio::test]
async fn test_delete_cascades_and_preserves_prefix() {
    let dir = TempDir::new().unwrap();
    let (repo, service) = service(dir.path());

    let record = service
        .create_from_bytes(NewAttachment::new("gone.bin"), b"x")
        .await
        .unwrap();
    let filepath = record.filepath.clone();

    service.delete(&record).await.unwrap();

    assert!(repo.is_empty().await);
    assert!(!dir.path().join(&filepath).exists());
    // All three partition levels are pruned; the prefix root survives
    assert!(dir.path().join("attachments").is_dir());
    let first_level = filepath.split('/').take(2).collect::<Vec<_>>().join("/");
    assert!(!dir.path().join(first_level).exists());
}

#[tokio::test]
async fn test_failed_file_delete_keeps_row_for_retry() {
    use attache_core::repository::AttachmentRepository;

    let dir = TempDir::new().unwrap();
    let (repo, service) = service(dir.path());

    let mut record = service
        .create_from_bytes(NewAttachment::new("stuck.bin"), b"x")
        .await
        .unwrap();
    // Point the record at a disk the service does not know
    record.disk = "detached".to_string();
    let record = repo.update(record).await.unwrap();

    assert!(service.delete(&record).await.is_err());

    // The row survives the failed cascade, so the record still matches
    // the orphan predicate and a later sweep can retry the deletion
    assert!(repo.find_by_uuid(&record.uuid).await.unwrap().is_some());
    assert_eq!(
        repo.count_orphans_before(chrono::Utc::now()).await.unwrap(),
        1
    );
    assert!(dir.path().join(&record.filepath).is_file());
}

#[tokio::test]
async fn test_delete_leaves_shared_partition_levels() {
    let dir = TempDir::new().unwrap();
    let (_repo, service) = service(dir.path());

    let a = service
        .create_from_bytes(NewAttachment::new("a.bin"), b"a")
        .await
        .unwrap();
    let b = service
        .create_from_bytes(NewAttachment::new("b.bin"), b"b")
        .await
        .unwrap();

    service.delete(&a).await.unwrap();
    // The other record's file is untouched
    assert!(dir.path().join(&b.filepath).is_file());
}

#[tokio::test]
async fn test_attach_binds_owner() {
    let dir = TempDir::new().unwrap();
    let (_repo, service) = service(dir.path());

    let record = service
        .create_from_bytes(NewAttachment::new("cover.png"), b"fake")
        .await
        .unwrap();

    let owner = Owner::new("Post", 1);
    let bound = service
        .attach(&record.uuid, &owner, attach_options("cover"))
        .await
        .unwrap()
        .expect("record should exist");

    assert!(!bound.is_orphaned());
    assert_eq!(bound.owner_type.as_deref(), Some("Post"));
    assert_eq!(bound.owner_id, Some(1));
    assert_eq!(bound.key.as_deref(), Some("cover"));
}

#[tokio::test]
async fn test_attach_unknown_uuid_is_none() {
    let dir = TempDir::new().unwrap();
    let (_repo, service) = service(dir.path());

    let result = service
        .attach("no-such-uuid", &Owner::new("Post", 1), Map::new())
        .await
        .unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn test_attach_replaces_colliding_key() {
    let dir = TempDir::new().unwrap();
    let (repo, service) = service(dir.path());
    let owner = Owner::new("Post", 1);

    let first = service
        .create_from_bytes(NewAttachment::new("old-cover.png"), b"old")
        .await
        .unwrap();
    service
        .attach(&first.uuid, &owner, attach_options("cover"))
        .await
        .unwrap()
        .unwrap();

    let second = service
        .create_from_bytes(NewAttachment::new("new-cover.png"), b"new")
        .await
        .unwrap();
    service
        .attach(&second.uuid, &owner, attach_options("cover"))
        .await
        .unwrap()
        .unwrap();

    // Exactly one record holds the key for that owner, and it is the
    // new one; the prior record and its file are gone
    assert_eq!(repo.len().await, 1);
    let survivor = repo
        .find_by_owner_key("Post", 1, "cover")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(survivor.uuid, second.uuid);
    assert!(!dir.path().join(&first.filepath).exists());
    assert!(dir.path().join(&second.filepath).is_file());
}

#[tokio::test]
async fn test_attach_same_key_different_owner_is_kept() {
    let dir = TempDir::new().unwrap();
    let (repo, service) = service(dir.path());

    let a = service
        .create_from_bytes(NewAttachment::new("a.png"), b"a")
        .await
        .unwrap();
    service
        .attach(&a.uuid, &Owner::new("Post", 1), attach_options("cover"))
        .await
        .unwrap()
        .unwrap();

    let b = service
        .create_from_bytes(NewAttachment::new("b.png"), b"b")
        .await
        .unwrap();
    service
        .attach(&b.uuid, &Owner::new("Post", 2), attach_options("cover"))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(repo.len().await, 2);
}

#[tokio::test]
async fn test_attach_strips_session_verification_metadata() {
    let dir = TempDir::new().unwrap();
    let (_repo, service) = service(dir.path());

    let mut new = NewAttachment::new("upload.bin");
    new.metadata = json!({"upload_session": "sess-1", "source": "import"});
    let record = service.create_from_bytes(new, b"x").await.unwrap();
    assert!(record.metadata_value("upload_session").is_some());

    let bound = service
        .attach(&record.uuid, &Owner::new("Post", 9), Map::new())
        .await
        .unwrap()
        .unwrap();

    assert!(bound.metadata_value("upload_session").is_none());
    assert_eq!(bound.metadata_value("source"), Some(&json!("import")));
}

#[tokio::test]
async fn test_attach_ignores_non_whitelisted_options() {
    let dir = TempDir::new().unwrap();
    let (_repo, service) = service(dir.path());

    let record = service
        .create_from_bytes(NewAttachment::new("f.bin"), b"x")
        .await
        .unwrap();
    let filepath = record.filepath.clone();

    let mut options = Map::new();
    options.insert("title".to_string(), json!("A Title"));
    options.insert("filepath".to_string(), json!("../../escape"));
    options.insert("uuid".to_string(), json!("hijack"));

    let bound = service
        .attach(&record.uuid, &Owner::new("Post", 1), options)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(bound.title.as_deref(), Some("A Title"));
    assert_eq!(bound.filepath, filepath);
    assert_eq!(bound.uuid, record.uuid);
}

#[tokio::test]
async fn test_output_headers() {
    let dir = TempDir::new().unwrap();
    let (_repo, service) = service(dir.path());

    let record = service
        .create_from_bytes(NewAttachment::new("notes.txt"), b"hello")
        .await
        .unwrap();

    let out = service
        .output(&record, Disposition::Attachment)
        .await
        .unwrap()
        .expect("no hook installed, delivery proceeds");

    assert_eq!(out.status, 200);
    assert_eq!(out.body, b"hello");
    assert_eq!(out.header("Content-Type"), Some("text/plain"));
    assert_eq!(
        out.header("Content-Disposition"),
        Some("attachment; filename=\"notes.txt\"")
    );
    assert_eq!(out.header("Content-Length"), Some("5"));
    assert_eq!(out.header("Accept-Ranges"), Some("bytes"));
}

#[tokio::test]
async fn test_output_hook_veto_is_none_not_error() {
    let dir = TempDir::new().unwrap();
    let (_repo, base) = service(dir.path());
    let service = base.with_output_hook(|_: &attache_core::AttachmentRecord| false);

    let record = service
        .create_from_bytes(NewAttachment::new("secret.txt"), b"x")
        .await
        .unwrap();

    let out = service.output(&record, Disposition::Inline).await.unwrap();
    assert!(out.is_none());
}

#[tokio::test]
async fn test_url_accessors() {
    let dir = TempDir::new().unwrap();
    let (_repo, service) = service(dir.path());

    let record = service
        .create_from_bytes(NewAttachment::new("My Photo.JPG"), b"x")
        .await
        .unwrap();

    let proxy = service.proxy_url(&record);
    assert_eq!(
        proxy,
        format!(
            "https://files.example.test/attachments/{}/my-photo.jpg",
            record.uuid
        )
    );
    assert!(service
        .proxy_url_inline(&record)
        .contains("/inline/my-photo.jpg"));

    let expire = chrono::Utc::now().timestamp() + 600;
    let url = service.temporary_url(&record, expire, true).unwrap();
    let token = url.rsplit('/').next().unwrap();
    let payload = service.resolve_token(token).unwrap();
    assert_eq!(payload.id, record.uuid);
    assert_eq!(payload.expire, expire);
    assert_eq!(payload.disposition, Disposition::Inline);
}

#[tokio::test]
async fn test_remote_disk_record_lifecycle() {
    use object_store::memory::InMemory;

    let dir = TempDir::new().unwrap();
    let repo = Arc::new(MemoryRepository::new());
    let disks = DiskSet::new()
        .with_local(dir.path())
        .with_disk(
            "cloud",
            Arc::new(attache_store::ObjectDisk::new(Arc::new(InMemory::new())))
                as Arc<dyn StorageBackend>,
        );
    let signer = UrlSigner::new(SigningKey::from_bytes([42u8; 32]));
    let service = AttachmentService::new(repo, disks, signer, StorageConfig::default());

    let record = service
        .create_from_bytes(NewAttachment::new("remote.txt").on_disk("cloud"), b"bytes")
        .await
        .unwrap();
    assert_eq!(record.disk, "cloud");
    assert_eq!(service.contents(&record).await.unwrap(), b"bytes");

    service.delete(&record).await.unwrap();
    assert!(service.contents(&record).await.is_err());
    // Nothing was ever written to the local root
    assert!(!dir.path().join("attachments").exists());
}
