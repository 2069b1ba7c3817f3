use crate::{DataUrlStorage, LocalStorage, MediaStorage, MemoryStorage, StorageError, StorageResult};
#[cfg(feature = "storage-s3")]
use crate::S3Storage;
use clipdock_core::{Config, StorageBackendKind};
use std::sync::Arc;

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn MediaStorage>> {
    match config.storage_backend() {
        StorageBackendKind::Local => {
            let root_dir = config.storage_root_dir().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("STORAGE_ROOT_DIR not configured".to_string())
            })?;

            let storage =
                LocalStorage::new(root_dir, config.public_base_url().to_string()).await?;
            Ok(Arc::new(storage))
        }

        StorageBackendKind::DataUrl => Ok(Arc::new(DataUrlStorage::new())),

        StorageBackendKind::Memory => Ok(Arc::new(MemoryStorage::new(
            config.public_base_url().to_string(),
        ))),

        #[cfg(feature = "storage-s3")]
        StorageBackendKind::S3 => {
            let bucket = config
                .s3_bucket()
                .map(String::from)
                .ok_or_else(|| StorageError::ConfigError("S3_BUCKET not configured".to_string()))?;
            let region = config.s3_region().map(String::from).ok_or_else(|| {
                StorageError::ConfigError("S3_REGION or AWS_REGION not configured".to_string())
            })?;
            let endpoint = config.s3_endpoint().map(String::from);

            let storage = S3Storage::new(bucket, region, endpoint).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackendKind::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_memory_backend_from_config() {
        let config = Config::for_tests(
            "secret",
            StorageBackendKind::Memory,
            "http://localhost:8091",
            10 << 20,
            1 << 30,
        );
        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_kind(), StorageBackendKind::Memory);
    }

    #[tokio::test]
    async fn test_local_backend_requires_root_dir() {
        let config = Config::for_tests(
            "secret",
            StorageBackendKind::Local,
            "http://localhost:8091",
            10 << 20,
            1 << 30,
        );
        assert!(matches!(
            create_storage(&config).await,
            Err(StorageError::ConfigError(_))
        ));
    }
}
