//! Directory-backed blob store
//!
//! Each object lives in a single file named by the SHA-256 of its key. The
//! file starts with a one-line JSON header carrying the key and content type,
//! followed by the raw bytes. Writes go to a temporary file that is renamed
//! into place, so concurrent writers of the same key settle on whichever
//! rename lands last and readers never observe a torn object.

use crate::error::{BlobStoreError, Result};
use crate::types::{StoreId, StoredObject};
use crate::BlobStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::fs;
use tracing::{debug, info, warn};

/// Metadata written ahead of the object bytes
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ObjectHeader {
    key: String,
    content_type: String,
    size: u64,
    stored_at: DateTime<Utc>,
}

/// A blob store rooted at a directory on the local filesystem
pub struct FsBlobStore {
    id: StoreId,
    /// Directory where objects are stored
    root: PathBuf,
    /// Distinguishes temporary files of concurrent writers
    write_seq: AtomicU64,
}

impl FsBlobStore {
    /// Create a new store; call [`FsBlobStore::init`] before use
    pub fn new(id: StoreId, root: PathBuf) -> Self {
        Self {
            id,
            root,
            write_seq: AtomicU64::new(0),
        }
    }

    /// Ensure the store directory exists
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.root)
            .await
            .map_err(|e| BlobStoreError::unavailable(self.id, e))?;
        info!(store = %self.id, root = ?self.root, "Blob store initialized");
        Ok(())
    }

    /// File name for a key
    pub fn file_name(key: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(key.as_bytes());
        hex::encode(hasher.finalize())
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(Self::file_name(key))
    }

    fn temp_path_for(&self, key: &str) -> PathBuf {
        let seq = self.write_seq.fetch_add(1, Ordering::Relaxed);
        self.root.join(format!(
            "{}.{}-{}.tmp",
            Self::file_name(key),
            std::process::id(),
            seq
        ))
    }

    fn decode(&self, key: &str, raw: Vec<u8>) -> Result<StoredObject> {
        let split = raw
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| BlobStoreError::unavailable(self.id, "object file has no header"))?;

        let header: ObjectHeader = serde_json::from_slice(&raw[..split])
            .map_err(|e| BlobStoreError::unavailable(self.id, e))?;

        if header.key != key {
            warn!(store = %self.id, key, stored_key = %header.key, "Object file belongs to another key");
            return Err(BlobStoreError::not_found(self.id, key));
        }

        let data = raw[split + 1..].to_vec();
        if data.len() as u64 != header.size {
            return Err(BlobStoreError::unavailable(
                self.id,
                format!(
                    "object truncated: expected {} bytes, found {}",
                    header.size,
                    data.len()
                ),
            ));
        }

        Ok(StoredObject {
            key: header.key,
            data,
            content_type: header.content_type,
            store: self.id,
        })
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn id(&self) -> StoreId {
        self.id
    }

    async fn get(&self, key: &str) -> Result<StoredObject> {
        let raw = match fs::read(self.path_for(key)).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(store = %self.id, key, "Object not found");
                return Err(BlobStoreError::not_found(self.id, key));
            }
            Err(e) => return Err(BlobStoreError::unavailable(self.id, e)),
        };

        self.decode(key, raw)
    }

    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let header = ObjectHeader {
            key: key.to_string(),
            content_type: content_type.to_string(),
            size: data.len() as u64,
            stored_at: Utc::now(),
        };

        let mut contents = serde_json::to_vec(&header)
            .map_err(|e| BlobStoreError::unavailable(self.id, e))?;
        contents.push(b'\n');
        contents.extend_from_slice(data);

        let temp = self.temp_path_for(key);
        if let Err(e) = fs::write(&temp, &contents).await {
            let _ = fs::remove_file(&temp).await;
            return Err(BlobStoreError::unavailable(self.id, e));
        }

        if let Err(e) = fs::rename(&temp, self.path_for(key)).await {
            let _ = fs::remove_file(&temp).await;
            return Err(BlobStoreError::unavailable(self.id, e));
        }

        debug!(store = %self.id, key, size = data.len(), content_type, "Stored object");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.path_for(key)).await {
            Ok(()) => {
                debug!(store = %self.id, key, "Deleted object");
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(BlobStoreError::unavailable(self.id, e)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_file_name_generation() {
        let name1 = FsBlobStore::file_name("photos/cat.png");
        let name2 = FsBlobStore::file_name("photos/cat.png");
        let name3 = FsBlobStore::file_name("photos/dog.png");

        assert_eq!(name1, name2);
        assert_ne!(name1, name3);

        // Hex-encoded SHA-256
        assert_eq!(name1.len(), 64);
        assert!(name1.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn test_put_and_get() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(StoreId::Origin, dir.path().to_path_buf());
        store.init().await.unwrap();

        store
            .put("notes/a b.txt", b"Hello, world!", "text/plain")
            .await
            .unwrap();

        let object = store.get("notes/a b.txt").await.unwrap();
        assert_eq!(object.key, "notes/a b.txt");
        assert_eq!(object.data, b"Hello, world!");
        assert_eq!(object.content_type, "text/plain");
        assert_eq!(object.store, StoreId::Origin);
    }

    #[tokio::test]
    async fn test_binary_payload_with_newlines() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(StoreId::Derived, dir.path().to_path_buf());
        store.init().await.unwrap();

        let data = vec![0xff, b'\n', 0x00, b'\n', b'\n', 0x42];
        store.put("bin", &data, "image/jpeg").await.unwrap();

        let object = store.get("bin").await.unwrap();
        assert_eq!(object.data, data);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(StoreId::Origin, dir.path().to_path_buf());
        store.init().await.unwrap();

        let err = store.get("missing").await.unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(err.store(), StoreId::Origin);
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(StoreId::Origin, dir.path().to_path_buf());
        store.init().await.unwrap();

        store.put("k", b"first", "text/plain").await.unwrap();
        store.put("k", b"second", "image/png").await.unwrap();

        let object = store.get("k").await.unwrap();
        assert_eq!(object.data, b"second");
        assert_eq!(object.content_type, "image/png");

        // No temporary files left behind
        let mut entries = std::fs::read_dir(dir.path()).unwrap();
        assert!(entries.next().is_some());
        assert!(entries.next().is_none());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(StoreId::Derived, dir.path().to_path_buf());
        store.init().await.unwrap();

        store.put("k", b"data", "image/jpeg").await.unwrap();
        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap_err().is_not_found());

        // Deleting again is still a success
        store.delete("k").await.unwrap();
        store.delete("never-stored").await.unwrap();
    }

    #[tokio::test]
    async fn test_corrupt_file_is_unavailable() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(StoreId::Origin, dir.path().to_path_buf());
        store.init().await.unwrap();

        std::fs::write(dir.path().join(FsBlobStore::file_name("k")), b"no header").unwrap();

        let err = store.get("k").await.unwrap_err();
        assert!(!err.is_not_found());
    }

    #[tokio::test]
    async fn test_missing_root_is_unavailable() {
        let dir = tempdir().unwrap();
        let store = FsBlobStore::new(StoreId::Derived, dir.path().join("not-created"));

        let err = store.put("k", b"data", "image/jpeg").await.unwrap_err();
        assert!(matches!(err, BlobStoreError::Unavailable { .. }));
    }
}
