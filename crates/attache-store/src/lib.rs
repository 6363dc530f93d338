//! # attache-store
//!
//! Storage layer for attache: the [`StorageBackend`] capability set
//! with local-filesystem and remote object-store variants, disk
//! dispatch, the attachment service (create / attach / deliver /
//! delete), the delete cascade that prunes empty partition directories,
//! and the batched orphan cleanup sweep.

pub mod backend;
pub mod cascade;
pub mod disks;
pub mod local;
pub mod memory;
pub mod output;
pub mod remote;
pub mod service;
pub mod sweep;

pub use backend::StorageBackend;
pub use cascade::DeleteCascade;
pub use disks::DiskSet;
pub use local::LocalDisk;
pub use memory::MemoryRepository;
pub use output::{AttachmentOutput, OutputHook};
pub use remote::ObjectDisk;
pub use service::{AttachmentService, NewAttachment};
pub use sweep::{CleanupSweeper, SweepOutcome};
