/// Document Store
///
/// Collection/document storage for gallery metadata. Documents are JSON
/// objects addressed by slash paths such as `galleries/{id}/photos/{photo}`,
/// where the last segment is the document id and the rest names the
/// collection.
pub mod sqlite;

pub use sqlite::SqliteDocumentStore;

use crate::error::{GalleryError, GalleryResult};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::fmt;

/// Address of a single document
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DocPath {
    pub collection: String,
    pub id: String,
}

impl DocPath {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }

    /// Parse `collection/.../id` with an even number of non-empty segments
    pub fn parse(path: &str) -> GalleryResult<Self> {
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        if segments.len() % 2 != 0 || segments.iter().any(|s| s.is_empty()) {
            return Err(GalleryError::Validation(format!(
                "Invalid document path: {}",
                path
            )));
        }

        let (id, collection) = segments
            .split_last()
            .ok_or_else(|| GalleryError::Validation("Empty document path".to_string()))?;

        Ok(Self {
            collection: collection.join("/"),
            id: id.to_string(),
        })
    }
}

impl fmt::Display for DocPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// Equality predicate over a top-level document field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub value: Value,
}

impl FieldFilter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            value: value.into(),
        }
    }

    /// Whether a document satisfies this predicate
    pub fn matches(&self, data: &Value) -> bool {
        data.get(&self.field) == Some(&self.value)
    }
}

/// A stored document
#[derive(Debug, Clone)]
pub struct Document {
    pub path: DocPath,
    pub data: Value,
}

impl Document {
    /// Deserialize the document body
    pub fn decode<T: DeserializeOwned>(&self) -> GalleryResult<T> {
        Ok(serde_json::from_value(self.data.clone())?)
    }
}

/// Document storage backend trait
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document, `None` if absent
    async fn get_document(&self, path: &DocPath) -> GalleryResult<Option<Document>>;

    /// Create or replace a document
    async fn set_document(&self, path: &DocPath, data: &Value) -> GalleryResult<()>;

    /// Delete a document
    ///
    /// Deleting an absent document is not an error; returns whether a
    /// document was removed.
    async fn delete_document(&self, path: &DocPath) -> GalleryResult<bool>;

    /// All documents of a collection matching every filter
    async fn query(&self, collection: &str, filters: &[FieldFilter])
        -> GalleryResult<Vec<Document>>;
}

/// Serialize a model and store it
pub async fn put<T: Serialize + Sync>(
    store: &dyn DocumentStore,
    path: &DocPath,
    value: &T,
) -> GalleryResult<()> {
    let data = serde_json::to_value(value)?;
    store.set_document(path, &data).await
}

/// Fetch and deserialize a model
pub async fn fetch<T: DeserializeOwned>(
    store: &dyn DocumentStore,
    path: &DocPath,
) -> GalleryResult<Option<T>> {
    match store.get_document(path).await? {
        Some(doc) => Ok(Some(doc.decode()?)),
        None => Ok(None),
    }
}
