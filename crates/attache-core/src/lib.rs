//! # attache-core
//!
//! Core types, traits, and abstractions for the attache attachment
//! storage library.
//!
//! This crate provides the foundational data structures and trait
//! definitions that the other attache crates depend on: the attachment
//! record model, deterministic storage-path partitioning, identifier
//! generation strategies, configuration, and the repository trait that
//! abstracts the (external) persistence layer.

pub mod config;
pub mod defaults;
pub mod error;
pub mod idgen;
pub mod mime;
pub mod models;
pub mod partition;
pub mod repository;
pub mod urls;

// Re-export commonly used types at crate root
pub use config::StorageConfig;
pub use error::{Error, Result};
pub use idgen::IdStrategy;
pub use models::{AttachmentRecord, Owner};
pub use partition::{disk_filename, partition_dir, storage_path};
pub use repository::AttachmentRepository;
pub use urls::{slugify, UrlBuilder};
