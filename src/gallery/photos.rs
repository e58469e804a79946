/// Photo storage: blob, canonical record and denormalized record
use crate::{
    base_path::BasePath,
    blob_store::{BlobBackend, StorageKeyResolver},
    doc_store::{self, DocPath, DocumentStore, FieldFilter},
    error::{GalleryError, GalleryResult},
    gallery::{
        models::{
            chapter_path, indexed_photo_path, photo_path, photos_collection, Chapter,
            IndexedPhoto, Photo,
        },
        GalleryManager,
    },
    metrics,
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

const MAX_PHOTO_NAME_LEN: usize = 255;

/// Incoming photo upload
#[derive(Debug, Clone)]
pub struct NewPhoto {
    pub name: String,
    pub data: Vec<u8>,
    pub content_type: Option<String>,
}

/// Photo manager
#[derive(Clone)]
pub struct PhotoManager {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobBackend>,
    keys: Arc<dyn StorageKeyResolver>,
    galleries: GalleryManager,
    base_path: BasePath,
}

impl PhotoManager {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobBackend>,
        keys: Arc<dyn StorageKeyResolver>,
        galleries: GalleryManager,
        base_path: BasePath,
    ) -> Self {
        Self {
            documents,
            blobs,
            keys,
            galleries,
            base_path,
        }
    }

    /// Photo names double as storage key segments
    pub fn validate_name(name: &str) -> GalleryResult<()> {
        if name.is_empty()
            || name.len() > MAX_PHOTO_NAME_LEN
            || name == "."
            || name == ".."
            || name.contains('/')
            || name.contains('\\')
        {
            return Err(GalleryError::Validation(format!("Invalid photo name: {}", name)));
        }
        Ok(())
    }

    /// Guess a content type from the file header
    pub fn detect_content_type(data: &[u8]) -> String {
        image::guess_format(data)
            .map(|format| format.to_mime_type().to_string())
            .unwrap_or_else(|_| "application/octet-stream".to_string())
    }

    /// Public URL under which a stored object is served
    pub fn media_url(&self, key: &str) -> String {
        let encoded = key
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect::<Vec<_>>()
            .join("/");
        self.base_path.build_url(&format!("/media/{}", encoded))
    }

    /// Store a new photo
    ///
    /// Writes the blob under the primary key, then the canonical record,
    /// then the denormalized record linked back by `photoId`. A failed write
    /// removes whatever the upload already stored.
    pub async fn add_photo(&self, gallery_id: &str, upload: NewPhoto) -> GalleryResult<Photo> {
        Self::validate_name(&upload.name)?;
        self.galleries.get(gallery_id).await?;

        let existing = self
            .documents
            .query(
                &photos_collection(gallery_id),
                &[FieldFilter::eq("name", upload.name.as_str())],
            )
            .await?;
        if !existing.is_empty() {
            return Err(GalleryError::Conflict(format!(
                "A photo named {} already exists in this gallery",
                upload.name
            )));
        }

        let content_type = upload
            .content_type
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or_else(|| Self::detect_content_type(&upload.data));
        let size = upload.data.len() as i64;

        let key = self.keys.primary_key(gallery_id, &upload.name);
        self.blobs.put(&key, upload.data, &content_type).await?;

        let photo = Photo {
            id: Uuid::new_v4().to_string(),
            gallery_id: gallery_id.to_string(),
            name: upload.name,
            url: self.media_url(&key),
            size,
            content_type,
            created_at: Utc::now(),
            chapter_id: None,
            chapter_position: None,
        };

        let canonical = photo_path(gallery_id, &photo.id);
        if let Err(e) = doc_store::put(self.documents.as_ref(), &canonical, &photo).await {
            self.discard_blob(&key).await;
            return Err(e);
        }

        let indexed = IndexedPhoto::from(&photo);
        if let Err(e) = doc_store::put(
            self.documents.as_ref(),
            &indexed_photo_path(&Uuid::new_v4().to_string()),
            &indexed,
        )
        .await
        {
            // The canonical record must not outlive a failed index write
            self.discard_canonical(&canonical).await;
            self.discard_blob(&key).await;
            return Err(e);
        }

        if let Err(e) = self.galleries.refresh_photo_count(gallery_id).await {
            tracing::warn!(gallery_id = %gallery_id, error = %e, "Failed to refresh gallery photo count");
        }
        metrics::record_photo_upload(&photo.content_type);

        tracing::info!(
            gallery_id = %gallery_id,
            photo_id = %photo.id,
            key = %key,
            size,
            "Stored photo"
        );

        Ok(photo)
    }

    async fn discard_canonical(&self, path: &DocPath) {
        if let Err(e) = self.documents.delete_document(path).await {
            tracing::warn!(path = %path, error = %e, "Failed to roll back canonical photo record");
        }
    }

    async fn discard_blob(&self, key: &str) {
        if let Err(e) = self.blobs.delete(key).await {
            tracing::warn!(key = %key, error = %e, "Failed to roll back stored photo object");
        }
    }

    /// Get a canonical photo record
    pub async fn get_photo(&self, gallery_id: &str, photo_id: &str) -> GalleryResult<Photo> {
        doc_store::fetch(self.documents.as_ref(), &photo_path(gallery_id, photo_id))
            .await?
            .ok_or_else(|| GalleryError::NotFound(format!("Photo not found: {}", photo_id)))
    }

    /// List a gallery's photos
    ///
    /// Ordered by chapter position (unassigned last), then upload time.
    pub async fn list_photos(&self, gallery_id: &str) -> GalleryResult<Vec<Photo>> {
        let docs = self
            .documents
            .query(&photos_collection(gallery_id), &[])
            .await?;

        let mut photos = docs
            .iter()
            .map(|doc| doc.decode::<Photo>())
            .collect::<GalleryResult<Vec<_>>>()?;

        photos.sort_by(|a, b| {
            let a_pos = a.chapter_position.unwrap_or(i64::MAX);
            let b_pos = b.chapter_position.unwrap_or(i64::MAX);
            a_pos
                .cmp(&b_pos)
                .then_with(|| a.created_at.cmp(&b.created_at))
        });

        Ok(photos)
    }

    /// Assign a photo to a chapter, or clear its chapter with `None`
    pub async fn assign_chapter(
        &self,
        gallery_id: &str,
        photo_id: &str,
        chapter_id: Option<String>,
        position: Option<i64>,
    ) -> GalleryResult<Photo> {
        let mut photo = self.get_photo(gallery_id, photo_id).await?;

        if let Some(chapter_id) = &chapter_id {
            let chapter: Option<Chapter> = doc_store::fetch(
                self.documents.as_ref(),
                &chapter_path(gallery_id, chapter_id),
            )
            .await?;
            if chapter.is_none() {
                return Err(GalleryError::NotFound(format!(
                    "Chapter not found: {}",
                    chapter_id
                )));
            }
        }

        photo.chapter_position = chapter_id.as_ref().and(position);
        photo.chapter_id = chapter_id;

        doc_store::put(
            self.documents.as_ref(),
            &photo_path(gallery_id, photo_id),
            &photo,
        )
        .await?;

        Ok(photo)
    }
}
