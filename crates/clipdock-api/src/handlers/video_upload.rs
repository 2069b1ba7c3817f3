use axum::extract::{Multipart, Path, State};
use axum::Json;
use clipdock_core::models::VideoResponse;
use std::sync::Arc;
use uuid::Uuid;

use crate::auth::AuthContext;
use crate::error::HttpAppError;
use crate::services::{AssetKind, UploadService};
use crate::state::AppState;

/// POST /api/v0/videos/{video_id}/media
///
/// Accepts a single multipart field named "file" (video/mp4). The payload is
/// spooled to disk while the size cap is enforced, then handed to the storage
/// backend as a stream; the resulting URL lands in the record's video slot.
pub async fn upload_video(
    State(state): State<Arc<AppState>>,
    auth: AuthContext,
    Path(video_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<VideoResponse>, HttpAppError> {
    let video = UploadService::from_state(&state)
        .upload(auth.user_id, video_id, AssetKind::Video, multipart)
        .await?;

    Ok(Json(VideoResponse::from(video)))
}
