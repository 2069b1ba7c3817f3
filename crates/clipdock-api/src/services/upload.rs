//! The upload pipeline shared by both upload endpoints.
//!
//! Stage order is load-bearing:
//!
//! 1. authorize - the caller must own the video before the body is read
//! 2. validate  - the declared media type must be acceptable before any
//!    payload byte reaches a storage backend
//! 3. ingest    - thumbnails buffer in memory, videos spool to disk
//! 4. store     - the backend returns exactly one descriptor per request
//! 5. commit    - the descriptor URL is written to the video record; if the
//!    commit fails, the stored object is deleted in the background so the
//!    client sees an error and no orphan survives

use axum::extract::Multipart;
use chrono::Utc;
use clipdock_core::models::Video;
use clipdock_core::{validate_media_type, AppError, THUMBNAIL_MEDIA_TYPES, VIDEO_MEDIA_TYPES};
use clipdock_db::MetadataStore;
use clipdock_storage::{MediaStorage, StorageDescriptor};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

use crate::error::storage_error_to_app;
use crate::state::AppState;
use crate::utils::upload::{
    next_file_field, read_capped, reject_additional_file_fields, spool_field,
};

/// Which slot of the video record an upload fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    Thumbnail,
    Video,
}

impl AssetKind {
    pub fn allowed_media_types(self) -> &'static [&'static str] {
        match self {
            AssetKind::Thumbnail => THUMBNAIL_MEDIA_TYPES,
            AssetKind::Video => VIDEO_MEDIA_TYPES,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Thumbnail => "thumbnail",
            AssetKind::Video => "video",
        }
    }
}

/// Per-request orchestrator for the upload pipeline.
pub struct UploadService {
    metadata: Arc<dyn MetadataStore>,
    storage: Arc<dyn MediaStorage>,
    max_thumbnail_bytes: u64,
    max_video_bytes: u64,
    spool_dir: Option<PathBuf>,
}

impl UploadService {
    pub fn from_state(state: &AppState) -> Self {
        UploadService {
            metadata: state.metadata.clone(),
            storage: state.storage.clone(),
            max_thumbnail_bytes: state.config.max_thumbnail_bytes(),
            max_video_bytes: state.config.max_video_bytes(),
            spool_dir: state.config.spool_dir().map(PathBuf::from),
        }
    }

    pub fn new(
        metadata: Arc<dyn MetadataStore>,
        storage: Arc<dyn MediaStorage>,
        max_thumbnail_bytes: u64,
        max_video_bytes: u64,
        spool_dir: Option<PathBuf>,
    ) -> Self {
        UploadService {
            metadata,
            storage,
            max_thumbnail_bytes,
            max_video_bytes,
            spool_dir,
        }
    }

    /// Run the full pipeline for one request and return the updated record.
    pub async fn upload(
        &self,
        caller: Uuid,
        video_id: Uuid,
        kind: AssetKind,
        mut multipart: Multipart,
    ) -> Result<Video, AppError> {
        let start = Instant::now();

        let video = self.authorize(caller, video_id).await?;

        let field = next_file_field(&mut multipart).await?;
        let content_type = field
            .content_type()
            .map(str::to_string)
            .ok_or_else(|| AppError::InvalidMediaType("file field has no Content-Type".into()))?;
        let media_type = validate_media_type(&content_type, kind.allowed_media_types())?;

        let descriptor = match kind {
            AssetKind::Thumbnail => {
                let data = read_capped(field, self.max_thumbnail_bytes).await?;
                reject_additional_file_fields(&mut multipart).await?;
                let size_bytes = data.len() as u64;
                let descriptor = self
                    .storage
                    .put(video_id, &media_type, data)
                    .await
                    .map_err(storage_error_to_app)?;
                tracing::debug!(video_id = %video_id, size_bytes, "Thumbnail stored");
                descriptor
            }
            AssetKind::Video => {
                let spool =
                    spool_field(field, self.spool_dir.as_deref(), self.max_video_bytes).await?;
                reject_additional_file_fields(&mut multipart).await?;
                let size_bytes = spool.len();
                let descriptor = self
                    .storage
                    .put_stream(video_id, &media_type, Some(size_bytes), Box::pin(spool))
                    .await
                    .map_err(storage_error_to_app)?;
                tracing::debug!(video_id = %video_id, size_bytes, "Video stored");
                descriptor
            }
        };

        let video = self.commit(video, kind, descriptor).await?;

        tracing::info!(
            video_id = %video_id,
            kind = kind.as_str(),
            media_type = %content_type,
            duration_ms = start.elapsed().as_millis() as u64,
            "Media upload committed"
        );

        Ok(video)
    }

    async fn authorize(&self, caller: Uuid, video_id: Uuid) -> Result<Video, AppError> {
        let video = self
            .metadata
            .get_video(video_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Video {} not found", video_id)))?;

        if !video.is_owned_by(caller) {
            return Err(AppError::Forbidden(
                "Only the owner of the video may upload media for it".to_string(),
            ));
        }

        Ok(video)
    }

    async fn commit(
        &self,
        mut video: Video,
        kind: AssetKind,
        descriptor: StorageDescriptor,
    ) -> Result<Video, AppError> {
        let url = descriptor.url().to_string();
        match kind {
            AssetKind::Thumbnail => video.thumbnail_url = Some(url),
            AssetKind::Video => video.video_url = Some(url),
        }
        video.updated_at = Utc::now();

        if let Err(err) = self.metadata.update_video(&video).await {
            tracing::error!(
                video_id = %video.id,
                error = %err,
                "Metadata commit failed after storage write, scheduling orphan cleanup"
            );
            let storage = self.storage.clone();
            tokio::spawn(async move {
                if let Err(cleanup_err) = storage.delete(&descriptor).await {
                    tracing::warn!(error = %cleanup_err, "Orphan cleanup failed; object left behind");
                }
            });
            return Err(match err {
                AppError::MetadataUpdate(_) => err,
                other => AppError::MetadataUpdate(other.to_string()),
            });
        }

        Ok(video)
    }
}
