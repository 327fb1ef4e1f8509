//! Key-addressed blob stores
//!
//! Provides the [`BlobStore`] trait shared by the origin and derived stores,
//! plus a directory-backed implementation and an in-memory one.

mod error;
mod fs;
mod memory;
mod types;

pub use error::{BlobStoreError, Result};
pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use types::{StoreId, StoredObject};

use async_trait::async_trait;

/// A key-addressed store of blobs with content-type metadata.
///
/// Implementations must treat `put` as an overwrite (last write wins) and
/// `delete` of an absent key as success.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Which of the two stores this instance plays
    fn id(&self) -> StoreId;

    /// Read the object stored under `key`
    async fn get(&self, key: &str) -> Result<StoredObject>;

    /// Write `data` under `key`, replacing any existing object
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<()>;

    /// Delete the object stored under `key`, if any
    async fn delete(&self, key: &str) -> Result<()>;
}
