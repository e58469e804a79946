/// Chapter management
use crate::{
    doc_store::{self, DocumentStore, FieldFilter},
    error::{GalleryError, GalleryResult},
    gallery::{
        models::{
            chapter_path, chapters_collection, photo_path, photos_collection, Chapter,
            ChapterUpdate, NewChapter, Photo,
        },
        GalleryManager,
    },
};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

#[derive(Clone)]
pub struct ChapterManager {
    documents: Arc<dyn DocumentStore>,
    galleries: GalleryManager,
}

impl ChapterManager {
    pub fn new(documents: Arc<dyn DocumentStore>, galleries: GalleryManager) -> Self {
        Self {
            documents,
            galleries,
        }
    }

    /// Create a chapter; without a position it is appended at the end
    pub async fn create(&self, gallery_id: &str, new: NewChapter) -> GalleryResult<Chapter> {
        new.validate()?;
        self.galleries.get(gallery_id).await?;

        let position = match new.position {
            Some(position) => position,
            None => self.list(gallery_id).await?.len() as i64,
        };

        let chapter = Chapter {
            id: Uuid::new_v4().to_string(),
            gallery_id: gallery_id.to_string(),
            title: new.title,
            description: new.description,
            position,
        };

        doc_store::put(
            self.documents.as_ref(),
            &chapter_path(gallery_id, &chapter.id),
            &chapter,
        )
        .await?;

        Ok(chapter)
    }

    pub async fn get(&self, gallery_id: &str, chapter_id: &str) -> GalleryResult<Chapter> {
        doc_store::fetch(self.documents.as_ref(), &chapter_path(gallery_id, chapter_id))
            .await?
            .ok_or_else(|| GalleryError::NotFound(format!("Chapter not found: {}", chapter_id)))
    }

    /// Chapters of a gallery ordered by position
    pub async fn list(&self, gallery_id: &str) -> GalleryResult<Vec<Chapter>> {
        let docs = self
            .documents
            .query(&chapters_collection(gallery_id), &[])
            .await?;

        let mut chapters = docs
            .iter()
            .map(|doc| doc.decode::<Chapter>())
            .collect::<GalleryResult<Vec<_>>>()?;
        chapters.sort_by(|a, b| a.position.cmp(&b.position).then_with(|| a.title.cmp(&b.title)));

        Ok(chapters)
    }

    pub async fn update(
        &self,
        gallery_id: &str,
        chapter_id: &str,
        update: ChapterUpdate,
    ) -> GalleryResult<Chapter> {
        update.validate()?;
        let mut chapter = self.get(gallery_id, chapter_id).await?;

        if let Some(title) = update.title {
            chapter.title = title;
        }
        if let Some(description) = update.description {
            chapter.description = Some(description);
        }
        if let Some(position) = update.position {
            chapter.position = position;
        }

        doc_store::put(
            self.documents.as_ref(),
            &chapter_path(gallery_id, chapter_id),
            &chapter,
        )
        .await?;

        Ok(chapter)
    }

    /// Delete a chapter and unassign its photos
    ///
    /// Returns the number of photos that were unassigned.
    pub async fn delete(&self, gallery_id: &str, chapter_id: &str) -> GalleryResult<usize> {
        if !self
            .documents
            .delete_document(&chapter_path(gallery_id, chapter_id))
            .await?
        {
            return Err(GalleryError::NotFound(format!("Chapter not found: {}", chapter_id)));
        }

        let docs = self
            .documents
            .query(
                &photos_collection(gallery_id),
                &[FieldFilter::eq("chapterId", chapter_id)],
            )
            .await?;

        for doc in &docs {
            let mut photo: Photo = doc.decode()?;
            photo.chapter_id = None;
            photo.chapter_position = None;
            doc_store::put(
                self.documents.as_ref(),
                &photo_path(gallery_id, &photo.id),
                &photo,
            )
            .await?;
        }

        tracing::info!(
            gallery_id = %gallery_id,
            chapter_id = %chapter_id,
            unassigned = docs.len(),
            "Deleted chapter"
        );

        Ok(docs.len())
    }
}
