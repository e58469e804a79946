/// Per-photo deletion state and busy guard
use crate::error::{GalleryError, GalleryResult};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Settled entries are pruned once the map grows past this size
const MAX_TRACKED: usize = 1024;

/// Lifecycle of one deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DeletionState {
    Idle,
    Confirming,
    Deleting,
    Done,
    Failed,
}

impl DeletionState {
    /// A deletion is in flight
    pub fn is_busy(&self) -> bool {
        matches!(self, DeletionState::Confirming | DeletionState::Deleting)
    }
}

type PhotoKey = (String, String);

/// Tracks deletion state per `(galleryId, photoId)`
///
/// Only one deletion of a given photo may be in flight at a time.
#[derive(Clone, Default)]
pub struct DeletionTracker {
    states: Arc<Mutex<HashMap<PhotoKey, DeletionState>>>,
}

impl DeletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<PhotoKey, DeletionState>> {
        self.states.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self, gallery_id: &str, photo_id: &str) -> DeletionState {
        self.lock()
            .get(&(gallery_id.to_string(), photo_id.to_string()))
            .copied()
            .unwrap_or(DeletionState::Idle)
    }

    pub fn is_busy(&self, gallery_id: &str, photo_id: &str) -> bool {
        self.state(gallery_id, photo_id).is_busy()
    }

    /// Claim a photo for deletion, entering `Confirming`
    pub fn begin(&self, gallery_id: &str, photo_id: &str) -> GalleryResult<DeletionGuard> {
        let key = (gallery_id.to_string(), photo_id.to_string());
        let mut states = self.lock();

        if states.get(&key).map(DeletionState::is_busy).unwrap_or(false) {
            return Err(GalleryError::Conflict(format!(
                "Deletion of photo {} is already in progress",
                photo_id
            )));
        }

        if states.len() >= MAX_TRACKED {
            states.retain(|_, state| state.is_busy());
        }
        states.insert(key.clone(), DeletionState::Confirming);

        Ok(DeletionGuard {
            tracker: self.clone(),
            key,
            settled: false,
        })
    }

    fn set(&self, key: &PhotoKey, state: DeletionState) {
        self.lock().insert(key.clone(), state);
    }

    fn clear(&self, key: &PhotoKey) {
        self.lock().remove(key);
    }
}

/// Holds a photo's busy flag until the deletion settles
///
/// Dropping an unsettled guard (caller gave up awaiting) returns the photo
/// to `Idle`.
pub struct DeletionGuard {
    tracker: DeletionTracker,
    key: PhotoKey,
    settled: bool,
}

impl DeletionGuard {
    pub fn advance(&self, state: DeletionState) {
        self.tracker.set(&self.key, state);
    }

    /// Settle in `Done` or `Failed`
    pub fn finish(mut self, state: DeletionState) {
        self.tracker.set(&self.key, state);
        self.settled = true;
    }

    /// Settle back to `Idle` (confirmation declined)
    pub fn cancel(mut self) {
        self.tracker.clear(&self.key);
        self.settled = true;
    }
}

impl Drop for DeletionGuard {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.clear(&self.key);
        }
    }
}
