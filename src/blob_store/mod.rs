/// Blob Storage System
///
/// Binary storage for gallery photos, addressed by slash-separated object
/// keys (`gallery-photos/{galleryId}/{name}`).
pub mod disk;
pub mod keys;

pub use disk::DiskBlobBackend;
pub use keys::{LegacyKeyLayout, StorageKeyResolver};

use crate::error::GalleryResult;
use async_trait::async_trait;

/// Blob storage backend trait
#[async_trait]
pub trait BlobBackend: Send + Sync {
    /// Store an object under a key, replacing any previous object
    async fn put(&self, key: &str, data: Vec<u8>, content_type: &str) -> GalleryResult<()>;

    /// Retrieve an object by key
    async fn get(&self, key: &str) -> GalleryResult<Option<Vec<u8>>>;

    /// Delete an object by key
    ///
    /// Returns `GalleryError::NotFound` when no object exists under the key.
    async fn delete(&self, key: &str) -> GalleryResult<()>;

    /// Check if an object exists
    async fn exists(&self, key: &str) -> GalleryResult<bool>;
}
