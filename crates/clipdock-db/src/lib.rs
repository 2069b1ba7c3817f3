//! Clipdock metadata store
//!
//! The upload pipeline treats video metadata persistence as an external
//! collaborator: it fetches a record to check ownership and writes the
//! resulting URL back. This crate provides that collaborator as the
//! `MetadataStore` trait with a Postgres implementation for production and
//! an in-memory implementation for development and tests.

pub mod memory_store;
pub mod video_repository;

pub use memory_store::InMemoryVideoStore;
pub use video_repository::VideoRepository;

use async_trait::async_trait;
use clipdock_core::models::Video;
use clipdock_core::AppError;
use uuid::Uuid;

/// External metadata collaborator consumed by the upload pipeline.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Fetch a video record by id. `Ok(None)` when no such record exists.
    async fn get_video(&self, video_id: Uuid) -> Result<Option<Video>, AppError>;

    /// Persist an updated video record.
    async fn update_video(&self, video: &Video) -> Result<(), AppError>;
}
