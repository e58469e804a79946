/// Disk-based blob storage backend
use crate::{
    blob_store::BlobBackend,
    error::{GalleryError, GalleryResult},
};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

/// Disk storage backend
///
/// Object keys map directly to relative paths under the base directory,
/// so `gallery-photos/g1/a.jpg` lives at `{base}/gallery-photos/g1/a.jpg`.
#[derive(Clone)]
pub struct DiskBlobBackend {
    base_path: PathBuf,
}

impl DiskBlobBackend {
    /// Create a new disk storage backend
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    /// Resolve a key to a file path, rejecting keys that escape the base
    fn get_blob_path(&self, key: &str) -> GalleryResult<PathBuf> {
        if key.is_empty() || key.starts_with('/') {
            return Err(GalleryError::Validation(format!("Invalid object key: {}", key)));
        }

        let mut path = self.base_path.clone();
        for segment in key.split('/') {
            if segment.is_empty() || segment == "." || segment == ".." || segment.contains('\\') {
                return Err(GalleryError::Validation(format!("Invalid object key: {}", key)));
            }
            path.push(segment);
        }

        Ok(path)
    }

    /// Ensure the directory for an object exists
    async fn ensure_blob_dir(&self, key: &str) -> GalleryResult<PathBuf> {
        let blob_path = self.get_blob_path(key)?;
        if let Some(parent) = blob_path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                GalleryError::BlobStorage(format!("Failed to create blob directory: {}", e))
            })?;
        }
        Ok(blob_path)
    }
}

#[async_trait]
impl BlobBackend for DiskBlobBackend {
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: &str) -> GalleryResult<()> {
        let blob_path = self.ensure_blob_dir(key).await?;

        fs::write(&blob_path, data)
            .await
            .map_err(|e| GalleryError::BlobStorage(format!("Failed to write blob {}: {}", key, e)))?;

        Ok(())
    }

    async fn get(&self, key: &str) -> GalleryResult<Option<Vec<u8>>> {
        let blob_path = self.get_blob_path(key)?;

        match fs::read(&blob_path).await {
            Ok(data) => Ok(Some(data)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(GalleryError::BlobStorage(format!(
                "Failed to read blob {}: {}",
                key, e
            ))),
        }
    }

    async fn delete(&self, key: &str) -> GalleryResult<()> {
        let blob_path = self.get_blob_path(key)?;

        match fs::remove_file(&blob_path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(GalleryError::NotFound(format!("Blob not found: {}", key)))
            }
            Err(e) => Err(GalleryError::BlobStorage(format!(
                "Failed to delete blob {}: {}",
                key, e
            ))),
        }
    }

    async fn exists(&self, key: &str) -> GalleryResult<bool> {
        let blob_path = self.get_blob_path(key)?;
        Ok(fs::try_exists(&blob_path).await.unwrap_or(false))
    }
}
