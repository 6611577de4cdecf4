//! Persisted client-side stores
//!
//! A [`PersistedStore`] owns some in-memory state and writes a whitelisted
//! snapshot of it to a key-value backend after every update. The on-disk
//! layout is a JSON envelope `{"state": {...}, "version": N}` under a fixed
//! key per store.
//!
//! The backend is abstracted behind [`KeyValueStorage`] so the browser uses
//! `localStorage` while tests and the server use [`MemoryStorage`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Storage backend failure
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StorageError {
    #[error("storage is not available")]
    Unavailable,

    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },

    #[error("failed to serialize state: {0}")]
    Serialize(String),
}

/// Minimal string key-value store
pub trait KeyValueStorage {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str);
}

/// In-memory storage; clones share the same map
#[derive(Clone, Default, Debug)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) {
        self.entries.borrow_mut().remove(key);
    }
}

/// State that can be persisted through a [`PersistedStore`]
pub trait Persist: Default {
    /// Storage key
    const KEY: &'static str;
    /// Envelope version; stored blobs with another version are discarded
    const VERSION: u32 = 0;

    /// Whitelisted, serializable subset of the state
    type Snapshot: Serialize + DeserializeOwned;

    fn snapshot(&self) -> Self::Snapshot;
    fn restore(&mut self, snapshot: Self::Snapshot);
}

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    state: T,
    version: u32,
}

/// State plus the storage it is persisted to
pub struct PersistedStore<T: Persist, S: KeyValueStorage> {
    state: T,
    storage: S,
}

impl<T: Persist, S: KeyValueStorage> PersistedStore<T, S> {
    /// Load state from storage, falling back to defaults for missing,
    /// corrupt or outdated entries
    pub fn load(storage: S) -> Self {
        let mut state = T::default();
        if let Some(raw) = storage.get(T::KEY) {
            match serde_json::from_str::<Envelope<T::Snapshot>>(&raw) {
                Ok(envelope) if envelope.version == T::VERSION => state.restore(envelope.state),
                Ok(envelope) => {
                    leptos::logging::warn!(
                        "Discarding `{}`: stored version {} != {}",
                        T::KEY,
                        envelope.version,
                        T::VERSION
                    );
                }
                Err(e) => {
                    leptos::logging::warn!("Discarding corrupt `{}`: {}", T::KEY, e);
                }
            }
        }
        Self { state, storage }
    }

    pub fn get(&self) -> &T {
        &self.state
    }

    /// Mutate the state and persist the new snapshot
    pub fn update(&mut self, f: impl FnOnce(&mut T)) -> Result<(), StorageError> {
        f(&mut self.state);
        self.save()
    }

    /// Replace the state and persist it
    pub fn set(&mut self, state: T) -> Result<(), StorageError> {
        self.state = state;
        self.save()
    }

    /// Drop the persisted entry and reset to defaults
    pub fn reset(&mut self) {
        self.storage.remove(T::KEY);
        self.state = T::default();
    }

    fn save(&self) -> Result<(), StorageError> {
        let envelope = Envelope {
            state: self.state.snapshot(),
            version: T::VERSION,
        };
        let json =
            serde_json::to_string(&envelope).map_err(|e| StorageError::Serialize(e.to_string()))?;
        self.storage.set(T::KEY, &json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default, Debug, PartialEq)]
    struct Counter {
        count: u32,
        hovered: bool,
    }

    impl Persist for Counter {
        const KEY: &'static str = "counter";
        const VERSION: u32 = 1;
        type Snapshot = u32;

        fn snapshot(&self) -> u32 {
            self.count
        }

        fn restore(&mut self, snapshot: u32) {
            self.count = snapshot;
        }
    }

    #[test]
    fn test_update_persists_envelope() {
        let storage = MemoryStorage::new();
        let mut store = PersistedStore::<Counter, _>::load(storage.clone());
        store
            .update(|c| {
                c.count = 3;
                c.hovered = true;
            })
            .unwrap();

        let raw = storage.get("counter").unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value, serde_json::json!({"state": 3, "version": 1}));
    }

    #[test]
    fn test_load_restores_whitelisted_state_only() {
        let storage = MemoryStorage::new();
        {
            let mut store = PersistedStore::<Counter, _>::load(storage.clone());
            store
                .set(Counter {
                    count: 7,
                    hovered: true,
                })
                .unwrap();
        }
        let store = PersistedStore::<Counter, _>::load(storage);
        assert_eq!(
            store.get(),
            &Counter {
                count: 7,
                hovered: false
            }
        );
    }

    #[test]
    fn test_corrupt_entry_falls_back_to_default() {
        let storage = MemoryStorage::new();
        storage.set("counter", "{not json").unwrap();
        let store = PersistedStore::<Counter, _>::load(storage);
        assert_eq!(store.get(), &Counter::default());
    }

    #[test]
    fn test_outdated_version_discarded() {
        let storage = MemoryStorage::new();
        storage
            .set("counter", r#"{"state": 9, "version": 0}"#)
            .unwrap();
        let store = PersistedStore::<Counter, _>::load(storage);
        assert_eq!(store.get().count, 0);
    }

    #[test]
    fn test_reset_removes_entry() {
        let storage = MemoryStorage::new();
        let mut store = PersistedStore::<Counter, _>::load(storage.clone());
        store.update(|c| c.count = 1).unwrap();
        assert_eq!(storage.len(), 1);
        store.reset();
        assert!(storage.is_empty());
        assert_eq!(store.get().count, 0);
    }
}
