/// Gallery management
use crate::{
    doc_store::{self, DocumentStore, FieldFilter},
    error::{GalleryError, GalleryResult},
    gallery::{
        models::{
            gallery_path, photos_collection, Gallery, GalleryUpdate, NewGallery, GALLERIES,
        },
        password,
    },
};
use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

/// Gallery manager
#[derive(Clone)]
pub struct GalleryManager {
    documents: Arc<dyn DocumentStore>,
}

impl GalleryManager {
    pub fn new(documents: Arc<dyn DocumentStore>) -> Self {
        Self { documents }
    }

    /// Create a gallery with a unique code
    pub async fn create(&self, new: NewGallery) -> GalleryResult<Gallery> {
        new.validate()?;

        if self.find_by_code(&new.code).await?.is_some() {
            return Err(GalleryError::Conflict(format!(
                "Gallery code already in use: {}",
                new.code
            )));
        }

        let gallery = Gallery {
            id: Uuid::new_v4().to_string(),
            code: new.code,
            name: new.name,
            password_hash: password::hash_password(&new.password)?,
            date: new.date,
            location: new.location,
            photo_count: 0,
            active: true,
            created_at: Utc::now(),
        };

        doc_store::put(self.documents.as_ref(), &gallery_path(&gallery.id), &gallery).await?;

        tracing::info!(gallery_id = %gallery.id, code = %gallery.code, "Created gallery");

        Ok(gallery)
    }

    /// Get a gallery by id
    pub async fn get(&self, gallery_id: &str) -> GalleryResult<Gallery> {
        doc_store::fetch(self.documents.as_ref(), &gallery_path(gallery_id))
            .await?
            .ok_or_else(|| GalleryError::NotFound(format!("Gallery not found: {}", gallery_id)))
    }

    /// Look up a gallery by its code
    pub async fn find_by_code(&self, code: &str) -> GalleryResult<Option<Gallery>> {
        let docs = self
            .documents
            .query(GALLERIES, &[FieldFilter::eq("code", code)])
            .await?;

        match docs.first() {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// List galleries, newest first
    ///
    /// `search` matches case-insensitively against name, code and location.
    pub async fn list(&self, search: Option<&str>) -> GalleryResult<Vec<Gallery>> {
        let docs = self.documents.query(GALLERIES, &[]).await?;

        let mut galleries = docs
            .iter()
            .map(|doc| doc.decode::<Gallery>())
            .collect::<GalleryResult<Vec<_>>>()?;

        if let Some(term) = search.map(str::trim).filter(|t| !t.is_empty()) {
            let term = term.to_lowercase();
            galleries.retain(|g| {
                g.name.to_lowercase().contains(&term)
                    || g.code.contains(&term)
                    || g
                        .location
                        .as_deref()
                        .map(|l| l.to_lowercase().contains(&term))
                        .unwrap_or(false)
            });
        }

        galleries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(galleries)
    }

    /// Apply a partial update
    pub async fn update(&self, gallery_id: &str, update: GalleryUpdate) -> GalleryResult<Gallery> {
        update.validate()?;

        let mut gallery = self.get(gallery_id).await?;

        if let Some(name) = update.name {
            gallery.name = name;
        }
        if let Some(date) = update.date {
            gallery.date = Some(date);
        }
        if let Some(location) = update.location {
            gallery.location = Some(location);
        }
        if let Some(active) = update.active {
            gallery.active = active;
        }
        if let Some(password) = update.password {
            gallery.password_hash = password::hash_password(&password)?;
        }

        doc_store::put(self.documents.as_ref(), &gallery_path(gallery_id), &gallery).await?;

        Ok(gallery)
    }

    /// Soft-disable or re-enable a gallery
    pub async fn set_active(&self, gallery_id: &str, active: bool) -> GalleryResult<Gallery> {
        self.update(
            gallery_id,
            GalleryUpdate {
                active: Some(active),
                ..Default::default()
            },
        )
        .await
    }

    /// Recount canonical photo records and store the result
    pub async fn refresh_photo_count(&self, gallery_id: &str) -> GalleryResult<i64> {
        let mut gallery = self.get(gallery_id).await?;
        let count = self
            .documents
            .query(&photos_collection(gallery_id), &[])
            .await?
            .len() as i64;

        if gallery.photo_count != count {
            gallery.photo_count = count;
            doc_store::put(self.documents.as_ref(), &gallery_path(gallery_id), &gallery).await?;
        }

        Ok(count)
    }

    /// Check a guest's code and password
    ///
    /// Inactive galleries and wrong passwords are refused with the same error.
    pub async fn verify_access(&self, code: &str, password: &str) -> GalleryResult<Gallery> {
        let gallery = self
            .find_by_code(code)
            .await?
            .ok_or_else(|| GalleryError::NotFound(format!("Gallery not found: {}", code)))?;

        if !gallery.active || !password::verify_password(password, &gallery.password_hash)? {
            tracing::debug!(code = %code, "Refused gallery access");
            return Err(GalleryError::Authentication(
                "Invalid gallery code or password".to_string(),
            ));
        }

        Ok(gallery)
    }
}
