use crate::keys::generate_asset_key;
use crate::traits::{
    MediaStorage, PayloadReader, StorageDescriptor, StorageError, StorageResult,
};
use async_trait::async_trait;
use bytes::Bytes;
use clipdock_core::{MediaType, StorageBackendKind};
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStore, ObjectStoreExt, PutPayload, Result as ObjectResult};
use tokio::io::AsyncReadExt;
use uuid::Uuid;

/// Remote object-store backend (S3 and S3-compatible providers)
///
/// Chosen for video-scale payloads: the inbound stream is spooled to disk
/// upstream, so at most one in-memory copy of the payload exists here.
///
/// Generic over the underlying [`ObjectStore`] so the object lifecycle can be
/// exercised against `object_store`'s in-memory implementation; production
/// code always goes through [`S3Storage::new`] and gets `AmazonS3`.
#[derive(Clone)]
pub struct S3Storage<S: ObjectStore = AmazonS3> {
    store: S,
    bucket: String,
    region: String,
    endpoint_url: Option<String>,
}

impl S3Storage<AmazonS3> {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }
}

impl<S: ObjectStore> S3Storage<S> {
    #[cfg(test)]
    fn with_store(store: S, bucket: String, region: String, endpoint_url: Option<String>) -> Self {
        S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        }
    }

    fn generate_url(&self, key: &str) -> String {
        format_object_url(self.endpoint_url.as_deref(), &self.bucket, &self.region, key)
    }

    fn descriptor_key<'a>(&self, descriptor: &'a StorageDescriptor) -> StorageResult<&'a str> {
        match descriptor {
            StorageDescriptor::S3 { key, .. } => Ok(key),
            other => Err(StorageError::WrongBackend(format!(
                "S3 backend cannot resolve a {} descriptor",
                other.backend_kind()
            ))),
        }
    }

    async fn put_object(&self, key: &str, bytes: Bytes) -> StorageResult<StorageDescriptor> {
        let size = bytes.len() as u64;
        let location = Path::from(key.to_string());
        let start = std::time::Instant::now();

        let result: ObjectResult<_> = self.store.put(&location, PutPayload::from(bytes)).await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(StorageDescriptor::S3 {
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            key: key.to_string(),
            url: self.generate_url(key),
        })
    }
}

/// Public URL for an object key.
///
/// AWS S3 uses the virtual-hosted format; S3-compatible providers get a
/// path-style URL built from the configured endpoint.
fn format_object_url(endpoint_url: Option<&str>, bucket: &str, region: &str, key: &str) -> String {
    if let Some(endpoint) = endpoint_url {
        format!("{}/{}/{}", endpoint.trim_end_matches('/'), bucket, key)
    } else {
        format!("https://{}.s3.{}.amazonaws.com/{}", bucket, region, key)
    }
}

#[async_trait]
impl<S: ObjectStore> MediaStorage for S3Storage<S> {
    async fn put(
        &self,
        _video_id: Uuid,
        media_type: &MediaType,
        data: Vec<u8>,
    ) -> StorageResult<StorageDescriptor> {
        let key = generate_asset_key(media_type);
        self.put_object(&key, Bytes::from(data)).await
    }

    async fn put_stream(
        &self,
        _video_id: Uuid,
        media_type: &MediaType,
        content_length: Option<u64>,
        mut reader: PayloadReader,
    ) -> StorageResult<StorageDescriptor> {
        let key = generate_asset_key(media_type);

        // The reader is a disk-backed spool, so draining it here holds at most
        // one in-memory copy of the payload before the single put.
        let mut buffer = Vec::with_capacity(content_length.unwrap_or(0) as usize);
        reader
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to read stream: {}", e)))?;

        self.put_object(&key, Bytes::from(buffer)).await
    }

    async fn fetch(&self, descriptor: &StorageDescriptor) -> StorageResult<Vec<u8>> {
        let key = self.descriptor_key(descriptor)?;
        let start = std::time::Instant::now();
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.get(&location).await;

        let result = result.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(key.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    key = %key,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 download failed"
                );
                StorageError::DownloadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::DownloadFailed(e.to_string()))?;

        tracing::info!(
            bucket = %self.bucket,
            key = %key,
            size_bytes = bytes.len() as u64,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 download successful"
        );

        Ok(bytes.to_vec())
    }

    async fn delete(&self, descriptor: &StorageDescriptor) -> StorageResult<()> {
        let key = self.descriptor_key(descriptor)?;
        let location = Path::from(key.to_string());

        let result: ObjectResult<_> = self.store.delete(&location).await;

        match result {
            Ok(()) => Ok(()),
            Err(ObjectStoreError::NotFound { .. }) => Ok(()),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    key = %key,
                    "S3 delete failed"
                );
                Err(StorageError::DeleteFailed(e.to_string()))
            }
        }
    }

    fn backend_kind(&self) -> StorageBackendKind {
        StorageBackendKind::S3
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use object_store::memory::InMemory;
    use std::io::Cursor;

    fn storage() -> S3Storage<InMemory> {
        S3Storage::with_store(
            InMemory::new(),
            "clips".to_string(),
            "eu-west-1".to_string(),
            None,
        )
    }

    fn mp4() -> MediaType {
        MediaType::parse("video/mp4").unwrap()
    }

    #[test]
    fn test_aws_url_format() {
        assert_eq!(
            format_object_url(None, "clips", "eu-west-1", "abc.mp4"),
            "https://clips.s3.eu-west-1.amazonaws.com/abc.mp4"
        );
    }

    #[test]
    fn test_endpoint_url_is_path_style() {
        assert_eq!(
            format_object_url(
                Some("http://localhost:9000/"),
                "clips",
                "us-east-1",
                "abc.mp4"
            ),
            "http://localhost:9000/clips/abc.mp4"
        );
    }

    #[tokio::test]
    async fn test_put_fetch_round_trip() {
        let storage = storage();
        let data: Vec<u8> = (0..4096u32).map(|i| (i % 251) as u8).collect();

        let descriptor = storage
            .put(Uuid::new_v4(), &mp4(), data.clone())
            .await
            .unwrap();
        match &descriptor {
            StorageDescriptor::S3 { bucket, key, url, .. } => {
                assert_eq!(bucket, "clips");
                assert!(key.ends_with(".mp4"));
                assert_eq!(url, &format!("https://clips.s3.eu-west-1.amazonaws.com/{}", key));
            }
            other => panic!("unexpected descriptor: {:?}", other),
        }

        assert_eq!(storage.fetch(&descriptor).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_put_stream_round_trip() {
        let storage = storage();
        let data: Vec<u8> = std::iter::repeat(0xC3).take(64 * 1024).collect();

        let reader: PayloadReader = Box::pin(Cursor::new(data.clone()));
        let descriptor = storage
            .put_stream(Uuid::new_v4(), &mp4(), Some(data.len() as u64), reader)
            .await
            .unwrap();

        assert_eq!(storage.fetch(&descriptor).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_fetch_after_delete_is_not_found() {
        let storage = storage();
        let descriptor = storage
            .put(Uuid::new_v4(), &mp4(), vec![1, 2, 3])
            .await
            .unwrap();

        storage.delete(&descriptor).await.unwrap();
        assert!(matches!(
            storage.fetch(&descriptor).await,
            Err(StorageError::NotFound(_))
        ));

        // A repeated delete of an absent object stays best-effort.
        assert!(storage.delete(&descriptor).await.is_ok());
    }

    #[tokio::test]
    async fn test_foreign_descriptor_is_rejected() {
        let storage = storage();
        let descriptor = StorageDescriptor::Local {
            key: "abc.jpeg".to_string(),
            url: "http://localhost:8091/assets/abc.jpeg".to_string(),
        };

        assert!(matches!(
            storage.fetch(&descriptor).await,
            Err(StorageError::WrongBackend(_))
        ));
    }
}
