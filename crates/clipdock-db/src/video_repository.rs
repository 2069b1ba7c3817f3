use crate::MetadataStore;
use async_trait::async_trait;
use chrono::Utc;
use clipdock_core::models::Video;
use clipdock_core::AppError;
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

/// Postgres-backed video metadata repository
#[derive(Clone)]
pub struct VideoRepository {
    pool: PgPool,
}

impl VideoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MetadataStore for VideoRepository {
    async fn get_video(&self, video_id: Uuid) -> Result<Option<Video>, AppError> {
        let video: Option<Video> = sqlx::query_as::<Postgres, Video>(
            r#"
            SELECT id, user_id, title, thumbnail_url, video_url, created_at, updated_at
            FROM videos
            WHERE id = $1
            "#,
        )
        .bind(video_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(video)
    }

    async fn update_video(&self, video: &Video) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE videos
            SET thumbnail_url = $2, video_url = $3, updated_at = $4
            WHERE id = $1
            "#,
        )
        .bind(video.id)
        .bind(&video.thumbnail_url)
        .bind(&video.video_url)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::MetadataUpdate(format!(
                "Video {} no longer exists",
                video.id
            )));
        }

        tracing::debug!(video_id = %video.id, "Video record updated");
        Ok(())
    }
}
