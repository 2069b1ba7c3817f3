//! Common utilities for the multipart upload handlers
//!
//! The upload endpoints accept exactly one multipart field named "file".
//! Helpers here open that field and consume it either into memory (small
//! payloads) or onto a disk spool (large payloads), enforcing the size cap
//! while reading so an oversized body is dropped as soon as the cap is hit.

use axum::extract::multipart::{Field, Multipart};
use clipdock_core::AppError;
use clipdock_storage::Spool;
use std::path::Path;

use crate::error::storage_error_to_app;

/// Open the single expected "file" field. The field must come first; requests
/// with extra leading fields are rejected rather than silently drained.
pub async fn next_file_field(multipart: &mut Multipart) -> Result<Field<'_>, AppError> {
    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
        .ok_or_else(|| AppError::InvalidInput("No file provided".to_string()))?;

    if field.name() != Some("file") {
        return Err(AppError::InvalidInput(
            "Expected a single multipart field named 'file'".to_string(),
        ));
    }

    Ok(field)
}

/// Drain any remaining fields, rejecting a second "file" field so a request
/// can never produce more than one stored object.
pub async fn reject_additional_file_fields(multipart: &mut Multipart) -> Result<(), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read multipart: {}", e)))?
    {
        if field.name() == Some("file") {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            ));
        }
    }
    Ok(())
}

/// Buffer a field into memory, failing with 413 as soon as the cap is crossed.
pub async fn read_capped(mut field: Field<'_>, max_bytes: u64) -> Result<Vec<u8>, AppError> {
    let mut data = Vec::new();

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?
    {
        if data.len() as u64 + chunk.len() as u64 > max_bytes {
            return Err(AppError::PayloadTooLarge(format!(
                "File exceeds maximum allowed size of {} bytes",
                max_bytes
            )));
        }
        data.extend_from_slice(&chunk);
    }

    if data.is_empty() {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }

    Ok(data)
}

/// Stream a field onto a disk spool, then rewind it for the storage backend.
/// The spool enforces the cap; its backing file is removed on drop, so an
/// error on any path leaves nothing behind.
pub async fn spool_field(
    mut field: Field<'_>,
    spool_dir: Option<&Path>,
    max_bytes: u64,
) -> Result<Spool, AppError> {
    let mut spool = Spool::new(spool_dir, max_bytes)
        .await
        .map_err(storage_error_to_app)?;

    while let Some(chunk) = field
        .chunk()
        .await
        .map_err(|e| AppError::InvalidInput(format!("Failed to read file data: {}", e)))?
    {
        spool
            .write_chunk(&chunk)
            .await
            .map_err(storage_error_to_app)?;
    }

    if spool.is_empty() {
        return Err(AppError::InvalidInput("File is empty".to_string()));
    }

    spool.finish().await.map_err(storage_error_to_app)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::extract::{FromRequest, Request};

    const BOUNDARY: &str = "clipdock-test-boundary";

    fn file_part(content_type: &str, data: &[u8]) -> Vec<u8> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
                 filename=\"upload.bin\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
        body
    }

    fn close_body(mut body: Vec<u8>) -> Vec<u8> {
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn multipart_from(body: Vec<u8>) -> Multipart {
        let request = Request::builder()
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        Multipart::from_request(request, &()).await.unwrap()
    }

    #[tokio::test]
    async fn test_single_file_field_accepted() {
        let body = close_body(file_part("image/png", b"payload"));
        let mut multipart = multipart_from(body).await;

        let field = next_file_field(&mut multipart).await.unwrap();
        let data = read_capped(field, 1024).await.unwrap();
        assert_eq!(data, b"payload");

        reject_additional_file_fields(&mut multipart).await.unwrap();
    }

    #[tokio::test]
    async fn test_second_file_field_rejected() {
        let mut body = file_part("image/png", b"one");
        body.extend(file_part("image/png", b"two"));
        let mut multipart = multipart_from(close_body(body)).await;

        let field = next_file_field(&mut multipart).await.unwrap();
        read_capped(field, 1024).await.unwrap();

        assert!(matches!(
            reject_additional_file_fields(&mut multipart).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_oversized_buffered_read_rejected() {
        let body = close_body(file_part("image/png", &[0u8; 2048]));
        let mut multipart = multipart_from(body).await;

        let field = next_file_field(&mut multipart).await.unwrap();
        assert!(matches!(
            read_capped(field, 1024).await,
            Err(AppError::PayloadTooLarge(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_file_rejected() {
        let body = close_body(file_part("image/png", b""));
        let mut multipart = multipart_from(body).await;

        let field = next_file_field(&mut multipart).await.unwrap();
        assert!(matches!(
            read_capped(field, 1024).await,
            Err(AppError::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_spooled_field_round_trip() {
        use tokio::io::AsyncReadExt;

        let payload = vec![7u8; 64 * 1024];
        let body = close_body(file_part("video/mp4", &payload));
        let mut multipart = multipart_from(body).await;

        let field = next_file_field(&mut multipart).await.unwrap();
        let mut spool = spool_field(field, None, 1 << 20).await.unwrap();
        assert_eq!(spool.len(), payload.len() as u64);

        let mut read_back = Vec::new();
        spool.read_to_end(&mut read_back).await.unwrap();
        assert_eq!(read_back, payload);
    }

    #[tokio::test]
    async fn test_missing_file_field_rejected() {
        let body = format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\nhello\r\n--{BOUNDARY}--\r\n"
        );
        let mut multipart = multipart_from(body.into_bytes()).await;

        assert!(matches!(
            next_file_field(&mut multipart).await,
            Err(AppError::InvalidInput(_))
        ));
    }
}
