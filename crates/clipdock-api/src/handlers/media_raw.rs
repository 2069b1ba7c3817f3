use axum::extract::{Path, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};
use clipdock_core::AppError;
use std::sync::Arc;
use uuid::Uuid;

use crate::error::HttpAppError;
use crate::state::AppState;

/// GET /api/v0/videos/{video_id}/raw
///
/// Serves the payload held by the volatile memory backend. URLs generated by
/// that backend point here; with any other backend the route reports 404.
pub async fn get_raw_media(
    State(state): State<Arc<AppState>>,
    Path(video_id): Path<Uuid>,
) -> Result<Response, HttpAppError> {
    let memory = state.memory_storage.as_ref().ok_or_else(|| {
        AppError::NotFound(
            "Raw media retrieval is only available with the memory storage backend".to_string(),
        )
    })?;

    let object = memory
        .get(video_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("No media stored for video {}", video_id)))?;

    Ok(([(header::CONTENT_TYPE, object.media_type)], object.data).into_response())
}
