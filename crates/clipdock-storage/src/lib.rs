//! Clipdock Storage Library
//!
//! This crate provides the storage abstraction for uploaded media assets and
//! its four backends: local filesystem, inline data URL, in-process memory
//! map, and S3-compatible object storage.
//!
//! # Storage keys
//!
//! Asset keys are random URL-safe tokens with an extension derived from the
//! accepted media type (e.g. `dGhpcy1pcy1ub3QtcmVhbA.jpeg`). Key generation is
//! centralized in the `keys` module so all backends stay consistent. Keys are
//! unique with overwhelming probability but never checked for collisions.

pub mod data_url;
pub mod factory;
pub mod keys;
pub mod local;
pub mod memory;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod spool;
pub mod traits;

// Re-export commonly used types
pub use clipdock_core::StorageBackendKind;
pub use data_url::DataUrlStorage;
pub use factory::create_storage;
pub use local::LocalStorage;
pub use memory::MemoryStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use spool::Spool;
pub use traits::{MediaStorage, PayloadReader, StorageDescriptor, StorageError, StorageResult};
