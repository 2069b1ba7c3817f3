//! Streaming spool for large payloads
//!
//! Large inbound payloads (video) are copied chunk-by-chunk to a transient
//! local file so they can be rewound and handed to a remote backend without
//! a second in-memory copy. The temp path is removed when the spool is
//! dropped, which covers every exit path: successful commit, validation
//! failure, and storage failure alike.

use crate::traits::{StorageError, StorageResult};
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tempfile::{NamedTempFile, TempPath};
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncSeekExt, AsyncWriteExt, ReadBuf};

/// A transient disk buffer with a byte cap.
///
/// Write the inbound stream with [`write_chunk`](Spool::write_chunk), then
/// call [`finish`](Spool::finish) to flush and rewind; after that the spool
/// itself is an `AsyncRead` positioned at the start of the payload.
pub struct Spool {
    file: File,
    path: TempPath,
    len: u64,
    max_len: u64,
}

impl Spool {
    /// Create a spool in `spool_dir` (or the system temp dir) capped at `max_len` bytes.
    pub async fn new(spool_dir: Option<&Path>, max_len: u64) -> StorageResult<Self> {
        let tmp = match spool_dir {
            Some(dir) => NamedTempFile::new_in(dir),
            None => NamedTempFile::new(),
        }
        .map_err(StorageError::IoError)?;

        // Independent handle with its own cursor; the TempPath keeps the file
        // alive and deletes it on drop.
        let std_file = tmp.reopen().map_err(StorageError::IoError)?;
        let path = tmp.into_temp_path();

        Ok(Spool {
            file: File::from_std(std_file),
            path,
            len: 0,
            max_len,
        })
    }

    /// Append a chunk, enforcing the byte cap.
    pub async fn write_chunk(&mut self, chunk: &[u8]) -> StorageResult<()> {
        let next = self.len + chunk.len() as u64;
        if next > self.max_len {
            return Err(StorageError::SpoolLimit {
                written: next,
                max: self.max_len,
            });
        }
        self.file.write_all(chunk).await?;
        self.len = next;
        Ok(())
    }

    /// Flush and rewind to the start, ready for handoff to a backend.
    pub async fn finish(mut self) -> StorageResult<Self> {
        self.file.flush().await?;
        self.file.rewind().await?;
        Ok(self)
    }

    /// Bytes written so far.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Filesystem location of the spool file (test hook).
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AsyncRead for Spool {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        Pin::new(&mut self.get_mut().file).poll_read(cx, buf)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncReadExt;

    #[tokio::test]
    async fn test_write_rewind_read_round_trip() {
        let mut spool = Spool::new(None, 1024).await.unwrap();
        spool.write_chunk(b"hello ").await.unwrap();
        spool.write_chunk(b"world").await.unwrap();
        assert_eq!(spool.len(), 11);

        let mut spool = spool.finish().await.unwrap();
        let mut contents = Vec::new();
        spool.read_to_end(&mut contents).await.unwrap();
        assert_eq!(contents, b"hello world");
    }

    #[tokio::test]
    async fn test_byte_cap_enforced() {
        let mut spool = Spool::new(None, 8).await.unwrap();
        spool.write_chunk(&[0u8; 8]).await.unwrap();
        let err = spool.write_chunk(&[0u8; 1]).await.unwrap_err();
        assert!(matches!(
            err,
            StorageError::SpoolLimit { written: 9, max: 8 }
        ));
    }

    #[tokio::test]
    async fn test_file_removed_on_drop() {
        let spool = Spool::new(None, 64).await.unwrap();
        let path = spool.path().to_path_buf();
        assert!(path.exists());
        drop(spool);
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn test_custom_spool_dir() {
        let dir = tempfile::tempdir().unwrap();
        let mut spool = Spool::new(Some(dir.path()), 64).await.unwrap();
        assert!(spool.path().starts_with(dir.path()));
        spool.write_chunk(b"x").await.unwrap();
    }
}
