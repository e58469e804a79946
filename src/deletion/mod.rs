/// Photo deletion workflow
///
/// Removes every persisted trace of a photo in a fixed order:
///
/// 1. the canonical record `galleries/{galleryId}/photos/{photoId}`;
///    failure here (including "no such record") aborts the workflow
/// 2. denormalized `gallery-photos` records matching `(galleryId, name)`
/// 3. the stored object, trying each candidate key until one deletes
/// 4. the caller's completion callback, then a success notice
///
/// Steps 2 and 3 are best-effort: their failures are logged and absorbed,
/// since list membership is decided by the canonical record alone.
pub mod notify;
pub mod state;

pub use notify::{Confirmer, Notifier, Preconfirmed, SkipConfirmation, TracingNotifier};
pub use state::{DeletionGuard, DeletionState, DeletionTracker};

use crate::{
    blob_store::{BlobBackend, StorageKeyResolver},
    doc_store::{DocumentStore, FieldFilter},
    error::{GalleryError, GalleryResult},
    gallery::models::{photo_path, GALLERY_PHOTOS},
    metrics,
};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Identifies the photo to delete
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePhotoRequest {
    pub gallery_id: String,
    pub photo_id: String,
    /// Display name; used for the denormalized lookup and storage keys
    pub photo_name: String,
}

impl DeletePhotoRequest {
    pub fn new(
        gallery_id: impl Into<String>,
        photo_id: impl Into<String>,
        photo_name: impl Into<String>,
    ) -> Self {
        Self {
            gallery_id: gallery_id.into(),
            photo_id: photo_id.into(),
            photo_name: photo_name.into(),
        }
    }

    fn validate(&self) -> GalleryResult<()> {
        for (field, value) in [
            ("galleryId", &self.gallery_id),
            ("photoId", &self.photo_id),
            ("photoName", &self.photo_name),
        ] {
            if value.is_empty() || value.contains('/') {
                return Err(GalleryError::Validation(format!(
                    "Invalid {}: {:?}",
                    field, value
                )));
            }
        }
        Ok(())
    }

    /// Text shown to the user before anything is deleted
    pub fn confirmation_prompt(&self) -> String {
        format!(
            "Delete photo \"{}\"? This permanently removes it from the gallery and cannot be undone.",
            self.photo_name
        )
    }
}

/// What a completed deletion removed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReport {
    pub photo_id: String,
    pub index_records_removed: usize,
    /// Candidate key the stored object was found under, if any
    pub blob_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeletionOutcome {
    Deleted(DeletionReport),
    /// The user declined the confirmation; nothing was touched
    Cancelled,
}

/// The deletion workflow
#[derive(Clone)]
pub struct PhotoDeletion {
    documents: Arc<dyn DocumentStore>,
    blobs: Arc<dyn BlobBackend>,
    keys: Arc<dyn StorageKeyResolver>,
    notifier: Arc<dyn Notifier>,
    tracker: DeletionTracker,
}

impl PhotoDeletion {
    pub fn new(
        documents: Arc<dyn DocumentStore>,
        blobs: Arc<dyn BlobBackend>,
        keys: Arc<dyn StorageKeyResolver>,
        notifier: Arc<dyn Notifier>,
        tracker: DeletionTracker,
    ) -> Self {
        Self {
            documents,
            blobs,
            keys,
            notifier,
            tracker,
        }
    }

    pub fn tracker(&self) -> &DeletionTracker {
        &self.tracker
    }

    /// Delete a photo's canonical record, denormalized records and object
    ///
    /// `on_deleted` receives the photo id once the data is gone. Returns an
    /// error only when the request is invalid, the photo is already being
    /// deleted, or the canonical record could not be deleted.
    pub async fn delete_photo<F, Fut>(
        &self,
        request: &DeletePhotoRequest,
        confirmer: &dyn Confirmer,
        on_deleted: F,
    ) -> GalleryResult<DeletionOutcome>
    where
        F: FnOnce(String) -> Fut + Send,
        Fut: Future<Output = ()> + Send,
    {
        request.validate()?;

        let guard = match self.tracker.begin(&request.gallery_id, &request.photo_id) {
            Ok(guard) => guard,
            Err(e) => {
                metrics::record_photo_deletion("busy");
                return Err(e);
            }
        };

        if !confirmer.confirm(&request.confirmation_prompt()).await {
            guard.cancel();
            metrics::record_photo_deletion("cancelled");
            info!(photo_id = %request.photo_id, "Photo deletion cancelled");
            return Ok(DeletionOutcome::Cancelled);
        }

        guard.advance(DeletionState::Deleting);

        if let Err(e) = self.delete_canonical(request).await {
            guard.finish(DeletionState::Failed);
            metrics::record_photo_deletion("failure");
            self.notifier.error(&format!(
                "Could not delete photo \"{}\": {}",
                request.photo_name, e
            ));
            return Err(e);
        }

        let index_records_removed = self.delete_index_records(request).await;
        let blob_key = self.delete_object(request).await;

        on_deleted(request.photo_id.clone()).await;

        guard.finish(DeletionState::Done);
        metrics::record_photo_deletion("success");
        self.notifier
            .success(&format!("Photo \"{}\" deleted", request.photo_name));

        info!(
            gallery_id = %request.gallery_id,
            photo_id = %request.photo_id,
            index_records_removed,
            blob_key = ?blob_key,
            "Photo deleted"
        );

        Ok(DeletionOutcome::Deleted(DeletionReport {
            photo_id: request.photo_id.clone(),
            index_records_removed,
            blob_key,
        }))
    }

    /// Step 1: the canonical record must exist and be removed
    async fn delete_canonical(&self, request: &DeletePhotoRequest) -> GalleryResult<()> {
        let path = photo_path(&request.gallery_id, &request.photo_id);
        if self.documents.delete_document(&path).await? {
            debug!(path = %path, "Deleted canonical photo record");
            Ok(())
        } else {
            Err(GalleryError::NotFound(format!(
                "Photo {} not found in gallery {}",
                request.photo_id, request.gallery_id
            )))
        }
    }

    /// Step 2: remove denormalized records for `(galleryId, name)`
    ///
    /// Records linked to a different `photoId` are left alone; records
    /// without a `photoId` predate the link and are removed on name alone.
    async fn delete_index_records(&self, request: &DeletePhotoRequest) -> usize {
        let filters = [
            FieldFilter::eq("galleryId", request.gallery_id.as_str()),
            FieldFilter::eq("name", request.photo_name.as_str()),
        ];

        let docs = match self.documents.query(GALLERY_PHOTOS, &filters).await {
            Ok(docs) => docs,
            Err(e) => {
                warn!(
                    photo_id = %request.photo_id,
                    error = %e,
                    "Failed to query denormalized photo records"
                );
                return 0;
            }
        };

        let mut removed = 0;
        for doc in &docs {
            let linked = doc.data.get("photoId").and_then(|v| v.as_str());
            if let Some(linked) = linked {
                if linked != request.photo_id {
                    debug!(
                        path = %doc.path,
                        linked_photo = linked,
                        "Skipping denormalized record of another photo with the same name"
                    );
                    continue;
                }
            }

            match self.documents.delete_document(&doc.path).await {
                Ok(true) => removed += 1,
                Ok(false) => debug!(path = %doc.path, "Denormalized record already gone"),
                Err(e) => warn!(
                    path = %doc.path,
                    error = %e,
                    "Failed to delete denormalized photo record"
                ),
            }
        }

        if removed == 0 {
            warn!(
                gallery_id = %request.gallery_id,
                name = %request.photo_name,
                "No denormalized photo record found"
            );
        }

        removed
    }

    /// Step 3: try each candidate key in order, stopping at the first delete
    async fn delete_object(&self, request: &DeletePhotoRequest) -> Option<String> {
        for key in self
            .keys
            .candidates(&request.gallery_id, &request.photo_name)
        {
            match self.blobs.delete(&key).await {
                Ok(()) => {
                    metrics::record_blob_key_attempt("deleted");
                    debug!(key = %key, "Deleted stored photo object");
                    return Some(key);
                }
                Err(e) if e.is_not_found() => {
                    metrics::record_blob_key_attempt("missing");
                    debug!(key = %key, "No stored object under candidate key");
                }
                Err(e) => {
                    metrics::record_blob_key_attempt("error");
                    warn!(key = %key, error = %e, "Failed to delete candidate object");
                }
            }
        }

        warn!(
            gallery_id = %request.gallery_id,
            name = %request.photo_name,
            "Could not locate a stored object for the photo"
        );
        None
    }
}
