use crate::traits::{
    MediaStorage, PayloadReader, StorageDescriptor, StorageError, StorageResult,
};
use async_trait::async_trait;
use bytes::Bytes;
use clipdock_core::constants::API_PREFIX;
use clipdock_core::{MediaType, StorageBackendKind};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::io::AsyncReadExt;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A payload held in the volatile map.
#[derive(Clone)]
pub struct StoredObject {
    pub data: Bytes,
    pub media_type: String,
}

/// In-process volatile storage backend
///
/// Development mode only: payloads live in a process-wide map keyed by the
/// owning video id. Content is lost on restart, and a later upload for the
/// same video id replaces the previous entry wholesale (last writer wins).
/// Whole-value insert under the lock means concurrent writers can never
/// interleave bytes, but there is deliberately no per-key ordering beyond
/// that; this is not a concurrency-safe store.
#[derive(Clone)]
pub struct MemoryStorage {
    objects: Arc<RwLock<HashMap<Uuid, StoredObject>>>,
    public_base_url: String,
}

impl MemoryStorage {
    pub fn new(public_base_url: String) -> Self {
        MemoryStorage {
            objects: Arc::new(RwLock::new(HashMap::new())),
            public_base_url,
        }
    }

    fn generate_url(&self, video_id: Uuid) -> String {
        format!(
            "{}{}/videos/{}/raw",
            self.public_base_url.trim_end_matches('/'),
            API_PREFIX,
            video_id
        )
    }

    /// Direct lookup for the volatile retrieval route.
    pub async fn get(&self, video_id: Uuid) -> Option<StoredObject> {
        self.objects.read().await.get(&video_id).cloned()
    }

    fn descriptor_video_id(&self, descriptor: &StorageDescriptor) -> StorageResult<Uuid> {
        match descriptor {
            StorageDescriptor::Memory { video_id, .. } => Ok(*video_id),
            other => Err(StorageError::WrongBackend(format!(
                "memory backend cannot resolve a {} descriptor",
                other.backend_kind()
            ))),
        }
    }
}

#[async_trait]
impl MediaStorage for MemoryStorage {
    async fn put(
        &self,
        video_id: Uuid,
        media_type: &MediaType,
        data: Vec<u8>,
    ) -> StorageResult<StorageDescriptor> {
        let size = data.len();
        let object = StoredObject {
            data: Bytes::from(data),
            media_type: media_type.essence().to_string(),
        };

        self.objects.write().await.insert(video_id, object);

        tracing::info!(
            video_id = %video_id,
            size_bytes = size,
            "Volatile in-memory store updated"
        );

        Ok(StorageDescriptor::Memory {
            video_id,
            url: self.generate_url(video_id),
        })
    }

    async fn put_stream(
        &self,
        video_id: Uuid,
        media_type: &MediaType,
        content_length: Option<u64>,
        mut reader: PayloadReader,
    ) -> StorageResult<StorageDescriptor> {
        let mut buffer = Vec::with_capacity(content_length.unwrap_or(0) as usize);
        reader
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| StorageError::UploadFailed(format!("Failed to read stream: {}", e)))?;

        self.put(video_id, media_type, buffer).await
    }

    async fn fetch(&self, descriptor: &StorageDescriptor) -> StorageResult<Vec<u8>> {
        let video_id = self.descriptor_video_id(descriptor)?;
        self.get(video_id)
            .await
            .map(|object| object.data.to_vec())
            .ok_or_else(|| StorageError::NotFound(video_id.to_string()))
    }

    async fn delete(&self, descriptor: &StorageDescriptor) -> StorageResult<()> {
        let video_id = self.descriptor_video_id(descriptor)?;
        self.objects.write().await.remove(&video_id);
        Ok(())
    }

    fn backend_kind(&self) -> StorageBackendKind {
        StorageBackendKind::Memory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jpeg() -> MediaType {
        MediaType::parse("image/jpeg").unwrap()
    }

    #[tokio::test]
    async fn test_put_fetch_round_trip() {
        let storage = MemoryStorage::new("http://localhost:8091".to_string());
        let video_id = Uuid::new_v4();
        let data = b"jpeg bytes".to_vec();

        let descriptor = storage.put(video_id, &jpeg(), data.clone()).await.unwrap();
        assert_eq!(
            descriptor.url(),
            format!("http://localhost:8091{}/videos/{}/raw", API_PREFIX, video_id)
        );
        assert_eq!(storage.fetch(&descriptor).await.unwrap(), data);
    }

    #[tokio::test]
    async fn test_lost_after_delete() {
        let storage = MemoryStorage::new("http://localhost:8091".to_string());
        let video_id = Uuid::new_v4();

        let descriptor = storage.put(video_id, &jpeg(), vec![1, 2, 3]).await.unwrap();
        storage.delete(&descriptor).await.unwrap();
        assert!(matches!(
            storage.fetch(&descriptor).await,
            Err(StorageError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_same_video_id_last_writer_wins() {
        let storage = MemoryStorage::new("http://localhost:8091".to_string());
        let video_id = Uuid::new_v4();

        let first: Vec<u8> = std::iter::repeat(0xAA).take(4096).collect();
        let second: Vec<u8> = std::iter::repeat(0xBB).take(4096).collect();

        let a = storage.clone();
        let b = storage.clone();
        let (first_clone, second_clone) = (first.clone(), second.clone());
        let t1 = tokio::spawn(async move { a.put(video_id, &jpeg(), first_clone).await });
        let t2 = tokio::spawn(async move { b.put(video_id, &jpeg(), second_clone).await });
        let d1 = t1.await.unwrap().unwrap();
        t2.await.unwrap().unwrap();

        // Exactly one of the two payloads survives, with no interleaving.
        let survivor = storage.fetch(&d1).await.unwrap();
        assert!(survivor == first || survivor == second);
    }

    #[tokio::test]
    async fn test_different_video_ids_are_independent() {
        let storage = MemoryStorage::new("http://localhost:8091".to_string());
        let d1 = storage.put(Uuid::new_v4(), &jpeg(), vec![1]).await.unwrap();
        let d2 = storage.put(Uuid::new_v4(), &jpeg(), vec![2]).await.unwrap();

        assert_eq!(storage.fetch(&d1).await.unwrap(), vec![1]);
        assert_eq!(storage.fetch(&d2).await.unwrap(), vec![2]);
    }
}
