//! Clipdock Core Library
//!
//! This crate provides the domain models, error types, configuration, and
//! content validation shared across all Clipdock components.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod storage_types;
pub mod validation;

// Re-export commonly used types
pub use config::{Config, MetadataBackend};
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use storage_types::StorageBackendKind;
pub use validation::{validate_media_type, MediaType, THUMBNAIL_MEDIA_TYPES, VIDEO_MEDIA_TYPES};
