use crate::MetadataStore;
use async_trait::async_trait;
use chrono::Utc;
use clipdock_core::models::Video;
use clipdock_core::AppError;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// In-memory video metadata store for development and tests.
///
/// Same lifecycle caveats as the in-memory storage backend: contents are lost
/// on restart and the store is single-process only.
#[derive(Clone, Default)]
pub struct InMemoryVideoStore {
    videos: Arc<RwLock<HashMap<Uuid, Video>>>,
}

impl InMemoryVideoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a record (dev/test setup; the pipeline itself never creates videos).
    pub fn insert_video(&self, video: Video) {
        self.videos
            .write()
            .expect("video store lock poisoned")
            .insert(video.id, video);
    }

    /// Convenience constructor for a fresh record owned by `user_id`.
    pub fn seed(&self, user_id: Uuid, title: &str) -> Video {
        let now = Utc::now();
        let video = Video {
            id: Uuid::new_v4(),
            user_id,
            title: title.to_string(),
            thumbnail_url: None,
            video_url: None,
            created_at: now,
            updated_at: now,
        };
        self.insert_video(video.clone());
        video
    }
}

#[async_trait]
impl MetadataStore for InMemoryVideoStore {
    async fn get_video(&self, video_id: Uuid) -> Result<Option<Video>, AppError> {
        Ok(self
            .videos
            .read()
            .expect("video store lock poisoned")
            .get(&video_id)
            .cloned())
    }

    async fn update_video(&self, video: &Video) -> Result<(), AppError> {
        let mut videos = self.videos.write().expect("video store lock poisoned");
        if !videos.contains_key(&video.id) {
            return Err(AppError::MetadataUpdate(format!(
                "Video {} no longer exists",
                video.id
            )));
        }
        let mut updated = video.clone();
        updated.updated_at = Utc::now();
        videos.insert(video.id, updated);
        Ok(())
    }
}
