//! In-memory blob store

use crate::error::{BlobStoreError, Result};
use crate::types::{StoreId, StoredObject};
use crate::BlobStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// A blob store that keeps objects in process memory
#[derive(Clone)]
pub struct MemoryBlobStore {
    id: StoreId,
    objects: Arc<RwLock<HashMap<String, (Vec<u8>, String)>>>,
}

impl MemoryBlobStore {
    pub fn new(id: StoreId) -> Self {
        Self {
            id,
            objects: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of stored objects
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    fn id(&self) -> StoreId {
        self.id
    }

    async fn get(&self, key: &str) -> Result<StoredObject> {
        let objects = self.objects.read().await;
        let (data, content_type) = objects
            .get(key)
            .ok_or_else(|| BlobStoreError::not_found(self.id, key))?;

        Ok(StoredObject {
            key: key.to_string(),
            data: data.clone(),
            content_type: content_type.clone(),
            store: self.id,
        })
    }

    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<()> {
        let mut objects = self.objects.write().await;
        objects.insert(key.to_string(), (data.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut objects = self.objects.write().await;
        objects.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_get_delete() {
        let store = MemoryBlobStore::new(StoreId::Origin);
        assert!(store.is_empty().await);

        store.put("k", b"data", "text/plain").await.unwrap();
        assert_eq!(store.len().await, 1);

        let object = store.get("k").await.unwrap();
        assert_eq!(object.data, b"data");
        assert_eq!(object.content_type, "text/plain");
        assert_eq!(object.store, StoreId::Origin);

        store.delete("k").await.unwrap();
        assert!(store.get("k").await.unwrap_err().is_not_found());
        store.delete("k").await.unwrap();
    }

    #[tokio::test]
    async fn test_clones_share_contents() {
        let store = MemoryBlobStore::new(StoreId::Derived);
        let handle = store.clone();

        store.put("k", b"data", "image/jpeg").await.unwrap();
        assert_eq!(handle.get("k").await.unwrap().data, b"data");
    }
}
