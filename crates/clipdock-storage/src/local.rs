use crate::keys::generate_asset_key;
use crate::traits::{
    MediaStorage, PayloadReader, StorageDescriptor, StorageError, StorageResult,
};
use async_trait::async_trait;
use clipdock_core::{MediaType, StorageBackendKind};
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

/// Local filesystem storage backend
///
/// Payloads land as files named by the generated key under a configured root
/// directory; the descriptor URL is built from the configured public base URL.
/// Durability is bounded by the local disk, with no at-rest encryption.
#[derive(Clone)]
pub struct LocalStorage {
    root_dir: PathBuf,
    public_base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `root_dir` - Root directory for asset files (e.g., "/var/lib/clipdock/assets")
    /// * `public_base_url` - Base URL files are served from (e.g., "http://localhost:8091")
    pub async fn new(root_dir: impl Into<PathBuf>, public_base_url: String) -> StorageResult<Self> {
        let root_dir = root_dir.into();

        fs::create_dir_all(&root_dir).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                root_dir.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            root_dir,
            public_base_url,
        })
    }

    /// Convert an asset key to a filesystem path with traversal validation.
    ///
    /// Generated keys are URL-safe by construction, but descriptors can come
    /// back from the metadata store, so the key is still checked before use.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        if key.is_empty() || key.contains("..") || key.contains('/') || key.starts_with('.') {
            return Err(StorageError::InvalidKey(
                "Asset key contains invalid characters".to_string(),
            ));
        }
        Ok(self.root_dir.join(key))
    }

    fn generate_url(&self, key: &str) -> String {
        format!(
            "{}/assets/{}",
            self.public_base_url.trim_end_matches('/'),
            key
        )
    }

    async fn write_file(&self, path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = fs::File::create(path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    fn descriptor_key<'a>(&self, descriptor: &'a StorageDescriptor) -> StorageResult<&'a str> {
        match descriptor {
            StorageDescriptor::Local { key, .. } => Ok(key),
            other => Err(StorageError::WrongBackend(format!(
                "local backend cannot resolve a {} descriptor",
                other.backend_kind()
            ))),
        }
    }
}

#[async_trait]
impl MediaStorage for LocalStorage {
    async fn put(
        &self,
        video_id: Uuid,
        media_type: &MediaType,
        data: Vec<u8>,
    ) -> StorageResult<StorageDescriptor> {
        let key = generate_asset_key(media_type);
        let path = self.key_to_path(&key)?;
        let size = data.len();
        let start = std::time::Instant::now();

        self.write_file(&path, &data).await?;

        let url = self.generate_url(&key);

        tracing::info!(
            video_id = %video_id,
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(StorageDescriptor::Local { key, url })
    }

    async fn put_stream(
        &self,
        video_id: Uuid,
        media_type: &MediaType,
        _content_length: Option<u64>,
        mut reader: PayloadReader,
    ) -> StorageResult<StorageDescriptor> {
        let key = generate_asset_key(media_type);
        let path = self.key_to_path(&key)?;
        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        let bytes_copied = tokio::io::copy(&mut reader, &mut file).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to write stream to file {}: {}",
                path.display(),
                e
            ))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            video_id = %video_id,
            key = %key,
            size_bytes = bytes_copied,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage stream upload successful"
        );

        Ok(StorageDescriptor::Local { key, url })
    }

    async fn fetch(&self, descriptor: &StorageDescriptor) -> StorageResult<Vec<u8>> {
        let key = self.descriptor_key(descriptor)?;
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Err(StorageError::NotFound(key.to_string()));
        }

        fs::read(&path).await.map_err(|e| {
            StorageError::DownloadFailed(format!("Failed to read file {}: {}", path.display(), e))
        })
    }

    async fn delete(&self, descriptor: &StorageDescriptor) -> StorageResult<()> {
        let key = self.descriptor_key(descriptor)?;
        let path = self.key_to_path(key)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(key = %key, "Local storage delete successful");

        Ok(())
    }

    fn backend_kind(&self) -> StorageBackendKind {
        StorageBackendKind::Local
    }
}
