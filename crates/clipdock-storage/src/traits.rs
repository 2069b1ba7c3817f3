//! Storage abstraction trait
//!
//! This module defines the `MediaStorage` trait that all storage backends
//! implement, and the `StorageDescriptor` each successful write produces.

use async_trait::async_trait;
use clipdock_core::{MediaType, StorageBackendKind};
use std::pin::Pin;
use thiserror::Error;
use tokio::io::AsyncRead;
use uuid::Uuid;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Descriptor does not belong to this backend: {0}")]
    WrongBackend(String),

    #[error("Operation not supported by this backend: {0}")]
    Unsupported(String),

    #[error("Spool limit exceeded: {written} bytes written, {max} allowed")]
    SpoolLimit { written: u64, max: u64 },

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Where an uploaded object now lives. Exactly one descriptor is produced per
/// successful write; `url()` is what gets committed to the video record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageDescriptor {
    /// File under the configured root directory, served from the public base URL.
    Local { key: String, url: String },
    /// The payload itself, base64-embedded in a `data:` URL.
    DataUrl { url: String },
    /// Entry in the process-wide volatile map, keyed by the owning video id.
    Memory { video_id: Uuid, url: String },
    /// Object in a remote bucket.
    S3 {
        bucket: String,
        region: String,
        key: String,
        url: String,
    },
}

impl StorageDescriptor {
    /// The retrieval URL written into the video record.
    pub fn url(&self) -> &str {
        match self {
            StorageDescriptor::Local { url, .. } => url,
            StorageDescriptor::DataUrl { url } => url,
            StorageDescriptor::Memory { url, .. } => url,
            StorageDescriptor::S3 { url, .. } => url,
        }
    }

    /// Which backend kind produced this descriptor.
    pub fn backend_kind(&self) -> StorageBackendKind {
        match self {
            StorageDescriptor::Local { .. } => StorageBackendKind::Local,
            StorageDescriptor::DataUrl { .. } => StorageBackendKind::DataUrl,
            StorageDescriptor::Memory { .. } => StorageBackendKind::Memory,
            StorageDescriptor::S3 { .. } => StorageBackendKind::S3,
        }
    }
}

/// A rewindable byte source handed to `put_stream`.
pub type PayloadReader = Pin<Box<dyn AsyncRead + Send + Unpin>>;

/// Storage abstraction trait
///
/// All backends persist already-validated payload bytes for the given video
/// and return a descriptor, or fail without leaving the caller guessing:
/// a returned descriptor means the write was observed to succeed, and only
/// then may the caller commit the URL to the metadata store.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Write a buffered payload and return its descriptor.
    async fn put(
        &self,
        video_id: Uuid,
        media_type: &MediaType,
        data: Vec<u8>,
    ) -> StorageResult<StorageDescriptor>;

    /// Write a payload from a rewound stream (for large files).
    ///
    /// The reader is consumed until EOF. `content_length` is a hint; backends
    /// may ignore it. Backends that cannot accept streamed payloads return
    /// `StorageError::Unsupported`.
    async fn put_stream(
        &self,
        video_id: Uuid,
        media_type: &MediaType,
        content_length: Option<u64>,
        reader: PayloadReader,
    ) -> StorageResult<StorageDescriptor>;

    /// Read back the bytes a descriptor refers to.
    ///
    /// Fails with `WrongBackend` when handed a descriptor produced by a
    /// different backend variant.
    async fn fetch(&self, descriptor: &StorageDescriptor) -> StorageResult<Vec<u8>>;

    /// Best-effort removal of a stored object (orphan cleanup after a failed
    /// metadata commit). Deleting an absent object is not an error.
    async fn delete(&self, descriptor: &StorageDescriptor) -> StorageResult<()>;

    /// The storage backend kind
    fn backend_kind(&self) -> StorageBackendKind;
}
