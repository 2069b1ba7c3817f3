use axum::extract::{Multipart, Path, State};
use axum::Json;
use clipdock_core::models::VideoResponse;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::HttpAppError;
use crate::services::{AssetKind, UploadService};
use crate::state::AppState;

/// POST /api/v0/videos/{video_id}/thumbnail
///
/// Accepts a single multipart field named "file" (image/jpeg or image/png)
/// and commits its storage URL to the video record's thumbnail slot.
pub async fn upload_thumbnail(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(video_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video = UploadService::from_state(&state)
        .upload(auth.user_id, video_id, AssetKind::Thumbnail, multipart)
        .await?;

    Ok(Json(VideoResponse::from(video)))
}
