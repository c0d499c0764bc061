//! In-memory resource registry.
//!
//! One registry per resource kind maps a [`ResourceId`] to the last-known
//! typed object. Every accessor returns owned clones, so no guard ever
//! outlives the call.

use parking_lot::{Mutex, RwLock};
use spdk_bridge_core::ResourceId;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

/// A registry of resources of one kind.
#[derive(Debug)]
pub struct Registry<T> {
    entries: RwLock<HashMap<ResourceId, T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<T: Clone> Registry<T> {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a copy of the entry for `id`.
    #[must_use]
    pub fn get(&self, id: &ResourceId) -> Option<T> {
        self.entries.read().get(id).cloned()
    }

    /// Store `value` under `id` unless an entry already exists.
    ///
    /// Returns a copy of whichever entry is stored afterwards, so concurrent
    /// inserts of the same id all observe the first one.
    pub fn insert_if_absent(&self, id: ResourceId, value: T) -> T {
        match self.entries.write().entry(id) {
            Entry::Occupied(existing) => existing.get().clone(),
            Entry::Vacant(slot) => slot.insert(value).clone(),
        }
    }

    /// Store `value` under `id`, replacing any previous entry.
    pub fn insert(&self, id: ResourceId, value: T) {
        self.entries.write().insert(id, value);
    }

    /// Remove the entry for `id`.
    pub fn remove(&self, id: &ResourceId) -> Option<T> {
        self.entries.write().remove(id)
    }

    /// Drop every entry not satisfying `keep` and return how many went.
    pub fn retain(&self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|_, v| keep(v));
        before - entries.len()
    }

    /// First entry satisfying `pred`.
    #[must_use]
    pub fn find(&self, mut pred: impl FnMut(&T) -> bool) -> Option<T> {
        self.entries.read().values().find(|v| pred(v)).cloned()
    }

    /// Get the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

type GuardKey = (&'static str, ResourceId);
type GuardMap = Mutex<HashMap<GuardKey, Arc<tokio::sync::Mutex<()>>>>;

/// Per-identifier create serialization.
///
/// Holding the guard for `(kind, id)` keeps any other create of the same
/// identifier waiting, so only one of them reaches the engine. Idle entries
/// are dropped when their last holder releases.
#[derive(Debug, Default)]
pub struct CreateGuards {
    locks: Arc<GuardMap>,
}

impl CreateGuards {
    /// Create an empty guard table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive create access to `id` of `kind`.
    pub async fn acquire(&self, kind: &'static str, id: &ResourceId) -> CreateGuard {
        let key = (kind, id.clone());
        let lock = Arc::clone(self.locks.lock().entry(key.clone()).or_default());
        let guard = lock.lock_owned().await;
        CreateGuard {
            locks: Arc::clone(&self.locks),
            key,
            _guard: guard,
        }
    }

    /// Number of identifiers with a create in flight or waiting.
    #[must_use]
    pub fn len(&self) -> usize {
        self.locks.lock().len()
    }

    /// Returns true if no create is in flight.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.locks.lock().is_empty()
    }
}

/// Exclusive create access to one identifier, released on drop.
#[derive(Debug)]
pub struct CreateGuard {
    locks: Arc<GuardMap>,
    key: GuardKey,
    _guard: OwnedMutexGuard<()>,
}

impl Drop for CreateGuard {
    fn drop(&mut self) {
        let mut locks = self.locks.lock();
        // The table and this guard hold the only references when nobody waits
        if locks.get(&self.key).is_some_and(|l| Arc::strong_count(l) == 2) {
            locks.remove(&self.key);
        }
    }
}
