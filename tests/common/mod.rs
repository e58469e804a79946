//! Recording in-memory stores for driving the deletion workflow
#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use wedgallery::{
    blob_store::BlobBackend,
    deletion::Notifier,
    doc_store::{DocPath, Document, DocumentStore, FieldFilter},
    GalleryError, GalleryResult,
};

/// Document store that records every call
#[derive(Default)]
pub struct MemoryDocumentStore {
    docs: Mutex<BTreeMap<(String, String), Value>>,
    calls: Mutex<Vec<String>>,
    /// Returned by queries but not stored, as if removed concurrently
    stale: Mutex<BTreeMap<(String, String), Value>>,
    failing_collection: Mutex<Option<String>>,
    pub fail_deletes: bool,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    pub fn insert(&self, path: &str, data: Value) {
        let path = DocPath::parse(path).unwrap();
        self.docs
            .lock()
            .unwrap()
            .insert((path.collection, path.id), data);
    }

    pub fn insert_stale(&self, path: &str, data: Value) {
        let path = DocPath::parse(path).unwrap();
        self.stale
            .lock()
            .unwrap()
            .insert((path.collection, path.id), data);
    }

    /// Make writes to `collection` fail; `None` restores them
    pub fn fail_writes_to(&self, collection: Option<&str>) {
        *self.failing_collection.lock().unwrap() = collection.map(String::from);
    }

    pub fn count(&self, collection: &str) -> usize {
        self.docs
            .lock()
            .unwrap()
            .keys()
            .filter(|(c, _)| c == collection)
            .count()
    }

    pub fn contains(&self, path: &str) -> bool {
        let path = DocPath::parse(path).unwrap();
        self.docs
            .lock()
            .unwrap()
            .contains_key(&(path.collection, path.id))
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get_document(&self, path: &DocPath) -> GalleryResult<Option<Document>> {
        self.record(format!("get {}", path));
        Ok(self
            .docs
            .lock()
            .unwrap()
            .get(&(path.collection.clone(), path.id.clone()))
            .map(|data| Document {
                path: path.clone(),
                data: data.clone(),
            }))
    }

    async fn set_document(&self, path: &DocPath, data: &Value) -> GalleryResult<()> {
        self.record(format!("set {}", path));
        if self.failing_collection.lock().unwrap().as_deref() == Some(path.collection.as_str()) {
            return Err(GalleryError::Internal("write rejected".to_string()));
        }
        self.docs
            .lock()
            .unwrap()
            .insert((path.collection.clone(), path.id.clone()), data.clone());
        Ok(())
    }

    async fn delete_document(&self, path: &DocPath) -> GalleryResult<bool> {
        self.record(format!("delete {}", path));
        if self.fail_deletes {
            return Err(GalleryError::Internal("store unavailable".to_string()));
        }
        Ok(self
            .docs
            .lock()
            .unwrap()
            .remove(&(path.collection.clone(), path.id.clone()))
            .is_some())
    }

    async fn query(
        &self,
        collection: &str,
        filters: &[FieldFilter],
    ) -> GalleryResult<Vec<Document>> {
        self.record(format!("query {}", collection));
        let docs = self.docs.lock().unwrap();
        let stale = self.stale.lock().unwrap();
        Ok(docs
            .iter()
            .chain(stale.iter())
            .filter(|((c, _), data)| c == collection && filters.iter().all(|f| f.matches(data)))
            .map(|((c, id), data)| Document {
                path: DocPath::new(c.clone(), id.clone()),
                data: data.clone(),
            })
            .collect())
    }
}

/// Blob backend holding a set of keys and recording delete attempts
#[derive(Default)]
pub struct RecordingBlobBackend {
    keys: Mutex<HashSet<String>>,
    deletes: Mutex<Vec<String>>,
}

impl RecordingBlobBackend {
    pub fn with_keys(keys: &[&str]) -> Self {
        Self {
            keys: Mutex::new(keys.iter().map(|k| k.to_string()).collect()),
            deletes: Mutex::new(Vec::new()),
        }
    }

    pub fn delete_attempts(&self) -> Vec<String> {
        self.deletes.lock().unwrap().clone()
    }

    pub fn holds(&self, key: &str) -> bool {
        self.keys.lock().unwrap().contains(key)
    }
}

#[async_trait]
impl BlobBackend for RecordingBlobBackend {
    async fn put(&self, key: &str, _data: Vec<u8>, _content_type: &str) -> GalleryResult<()> {
        self.keys.lock().unwrap().insert(key.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> GalleryResult<Option<Vec<u8>>> {
        Ok(self.holds(key).then(Vec::new))
    }

    async fn delete(&self, key: &str) -> GalleryResult<()> {
        self.deletes.lock().unwrap().push(key.to_string());
        if self.keys.lock().unwrap().remove(key) {
            Ok(())
        } else {
            Err(GalleryError::NotFound(format!("Blob not found: {}", key)))
        }
    }

    async fn exists(&self, key: &str) -> GalleryResult<bool> {
        Ok(self.holds(key))
    }
}

/// Notifier that keeps every notice
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(String, String)> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push(("success".to_string(), message.to_string()));
    }

    fn error(&self, message: &str) {
        self.notices
            .lock()
            .unwrap()
            .push(("error".to_string(), message.to_string()));
    }
}

/// Collects ids passed to the completion callback
#[derive(Clone, Default)]
pub struct DeletedIds(pub Arc<Mutex<Vec<String>>>);

impl DeletedIds {
    pub fn callback(&self) -> impl FnOnce(String) -> std::future::Ready<()> + Send {
        let ids = self.0.clone();
        move |id| {
            ids.lock().unwrap().push(id);
            std::future::ready(())
        }
    }

    pub fn get(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}
