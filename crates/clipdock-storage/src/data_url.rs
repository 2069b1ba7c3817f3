use crate::traits::{
    MediaStorage, PayloadReader, StorageDescriptor, StorageError, StorageResult,
};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use clipdock_core::{MediaType, StorageBackendKind};
use uuid::Uuid;

/// Inline data-URL storage backend
///
/// The payload is base64-embedded directly into the URL, so the descriptor
/// *is* the stored object and ends up duplicated into the metadata store.
/// Viable only while the request size cap is small (thumbnails); streamed
/// video-scale payloads are refused.
#[derive(Clone, Default)]
pub struct DataUrlStorage;

impl DataUrlStorage {
    pub fn new() -> Self {
        DataUrlStorage
    }
}

#[async_trait]
impl MediaStorage for DataUrlStorage {
    async fn put(
        &self,
        video_id: Uuid,
        media_type: &MediaType,
        data: Vec<u8>,
    ) -> StorageResult<StorageDescriptor> {
        let size = data.len();
        let url = format!(
            "data:{};base64,{}",
            media_type.essence(),
            STANDARD.encode(&data)
        );

        tracing::info!(
            video_id = %video_id,
            size_bytes = size,
            media_type = %media_type,
            "Inline data URL produced"
        );

        Ok(StorageDescriptor::DataUrl { url })
    }

    async fn put_stream(
        &self,
        _video_id: Uuid,
        _media_type: &MediaType,
        _content_length: Option<u64>,
        _reader: PayloadReader,
    ) -> StorageResult<StorageDescriptor> {
        Err(StorageError::Unsupported(
            "data URL backend does not accept streamed payloads".to_string(),
        ))
    }

    async fn fetch(&self, descriptor: &StorageDescriptor) -> StorageResult<Vec<u8>> {
        let url = match descriptor {
            StorageDescriptor::DataUrl { url } => url,
            other => {
                return Err(StorageError::WrongBackend(format!(
                    "data URL backend cannot resolve a {} descriptor",
                    other.backend_kind()
                )))
            }
        };

        let encoded = url
            .strip_prefix("data:")
            .and_then(|rest| rest.split_once(";base64,"))
            .map(|(_, payload)| payload)
            .ok_or_else(|| {
                StorageError::DownloadFailed("Malformed data URL descriptor".to_string())
            })?;

        STANDARD
            .decode(encoded)
            .map_err(|e| StorageError::DownloadFailed(format!("Invalid base64 payload: {}", e)))
    }

    async fn delete(&self, _descriptor: &StorageDescriptor) -> StorageResult<()> {
        // Nothing lives outside the descriptor itself.
        Ok(())
    }

    fn backend_kind(&self) -> StorageBackendKind {
        StorageBackendKind::DataUrl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_fetch_round_trip() {
        let storage = DataUrlStorage::new();
        let media_type = MediaType::parse("image/png").unwrap();
        let data = vec![0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a];

        let descriptor = storage
            .put(Uuid::new_v4(), &media_type, data.clone())
            .await
            .unwrap();

        assert!(descriptor.url().starts_with("data:image/png;base64,"));
        assert_eq!(storage.fetch(&descriptor).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_stream_refused() {
        let storage = DataUrlStorage::new();
        let media_type = MediaType::parse("video/mp4").unwrap();
        let reader = Box::pin(std::io::Cursor::new(vec![0u8; 16])) as PayloadReader;

        let result = storage
            .put_stream(Uuid::new_v4(), &media_type, Some(16), reader)
            .await;
        assert!(matches!(result, Err(StorageError::Unsupported(_))));
    }

    #[tokio::test]
    async fn test_malformed_descriptor_rejected() {
        let storage = DataUrlStorage::new();
        let descriptor = StorageDescriptor::DataUrl {
            url: "data:image/png,not-base64-marked".to_string(),
        };
        assert!(matches!(
            storage.fetch(&descriptor).await,
            Err(StorageError::DownloadFailed(_))
        ));
    }
}
