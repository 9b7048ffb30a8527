//! Typed collections over a [`DurableStore`].
//!
//! Every collection is a JSON array stored whole under one key. Loading is
//! forgiving: a missing key is an empty collection, and so is a value that
//! fails to read or parse (logged, never propagated), so a damaged store
//! never keeps the scoreboard from starting.

use crate::error::{CoreError, CoreResult};
use scoreboard_storage::DurableStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, error};

/// The keys the engine persists under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKey {
    /// The tournament collection.
    Tournaments,
    /// Automatic backup history.
    BackupRecords,
    /// The audit trail.
    ChangeLog,
    /// The latest sync envelope, observed by other contexts.
    SyncEvent,
}

impl StoreKey {
    /// Returns the key text.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Tournaments => "tournaments",
            Self::BackupRecords => "backupRecords",
            Self::ChangeLog => "changeLog",
            Self::SyncEvent => "tournaments-sync-event",
        }
    }
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Typed access to a shared [`DurableStore`].
#[derive(Clone)]
pub struct CollectionStore {
    inner: Arc<dyn DurableStore>,
}

impl CollectionStore {
    /// Wraps a store.
    #[must_use]
    pub fn new(inner: Arc<dyn DurableStore>) -> Self {
        Self { inner }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn inner(&self) -> &Arc<dyn DurableStore> {
        &self.inner
    }

    /// Loads a collection, failing on unreadable or malformed data.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the value is not a JSON
    /// array of `T`.
    pub fn try_load<T: DeserializeOwned>(&self, key: StoreKey) -> CoreResult<Vec<T>> {
        match self.inner.load(key.as_str())? {
            Some(bytes) => Ok(serde_json::from_slice(&bytes)?),
            None => Ok(Vec::new()),
        }
    }

    /// Loads a collection, substituting an empty one for anything that
    /// cannot be read.
    #[must_use]
    pub fn load<T: DeserializeOwned>(&self, key: StoreKey) -> Vec<T> {
        match self.try_load(key) {
            Ok(items) => {
                debug!(key = %key, count = items.len(), "loaded collection");
                items
            }
            Err(e) => {
                error!(key = %key, error = %e, "stored collection is unreadable, starting empty");
                Vec::new()
            }
        }
    }

    /// Serializes and replaces a whole collection.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn try_save<T: Serialize>(&self, key: StoreKey, items: &[T]) -> CoreResult<()> {
        let bytes = serde_json::to_vec(items)?;
        self.inner.save(key.as_str(), &bytes)?;
        Ok(())
    }

    /// Replaces a whole collection, logging a failed write.
    ///
    /// Returns whether the write succeeded. The caller's in-memory state is
    /// authoritative either way.
    pub fn save<T: Serialize>(&self, key: StoreKey, items: &[T]) -> bool {
        match self.try_save(key, items) {
            Ok(()) => true,
            Err(e) => {
                error!(key = %key, error = %e, "failed to persist collection");
                false
            }
        }
    }

    /// Loads a single JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails or the value does not parse.
    pub fn try_load_document<T: DeserializeOwned>(&self, key: StoreKey) -> CoreResult<Option<T>> {
        match self.inner.load(key.as_str())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Replaces a single JSON document.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn try_save_document<T: Serialize>(&self, key: StoreKey, document: &T) -> CoreResult<()> {
        let bytes = serde_json::to_vec(document)?;
        self.inner.save(key.as_str(), &bytes)?;
        Ok(())
    }

    /// Removes a key, logging a failure.
    pub fn remove(&self, key: StoreKey) -> bool {
        match self.inner.remove(key.as_str()) {
            Ok(()) => true,
            Err(e) => {
                error!(key = %key, error = %CoreError::from(e), "failed to remove collection");
                false
            }
        }
    }
}

impl fmt::Debug for CollectionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollectionStore").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Tournament;
    use scoreboard_storage::{FileStore, InMemoryStore};
    use tempfile::tempdir;

    fn memory() -> (Arc<InMemoryStore>, CollectionStore) {
        let raw = Arc::new(InMemoryStore::new());
        let store = CollectionStore::new(raw.clone());
        (raw, store)
    }

    #[test]
    fn missing_key_loads_empty() {
        let (_, store) = memory();
        let items: Vec<Tournament> = store.load(StoreKey::Tournaments);
        assert!(items.is_empty());
    }

    #[test]
    fn save_then_load() {
        let (_, store) = memory();
        let items = vec![Tournament::new("Cup").add_team("Red")];

        assert!(store.save(StoreKey::Tournaments, &items));
        let loaded: Vec<Tournament> = store.load(StoreKey::Tournaments);
        assert_eq!(loaded, items);
    }

    #[test]
    fn malformed_value_loads_empty() {
        let (raw, store) = memory();
        raw.save("tournaments", b"{not json").unwrap();

        let loaded: Vec<Tournament> = store.load(StoreKey::Tournaments);
        assert!(loaded.is_empty());
        assert!(store.try_load::<Tournament>(StoreKey::Tournaments).is_err());
    }

    #[test]
    fn wrong_shape_loads_empty() {
        let (raw, store) = memory();
        raw.save("tournaments", br#"{"tournaments":[]}"#).unwrap();

        let loaded: Vec<Tournament> = store.load(StoreKey::Tournaments);
        assert!(loaded.is_empty());
    }

    #[test]
    fn timestamps_are_iso_text() {
        let (raw, store) = memory();
        store.save(StoreKey::Tournaments, &[Tournament::new("Cup")]);

        let bytes = raw.load("tournaments").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        let created = value[0]["createdAt"].as_str().unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(created).is_ok());
    }

    #[test]
    fn remove_key() {
        let (raw, store) = memory();
        store.save(StoreKey::ChangeLog, &[1, 2, 3]);
        assert!(store.remove(StoreKey::ChangeLog));
        assert!(raw.load("changeLog").unwrap().is_none());
    }

    #[test]
    fn keys_are_distinct() {
        let keys = [
            StoreKey::Tournaments,
            StoreKey::BackupRecords,
            StoreKey::ChangeLog,
            StoreKey::SyncEvent,
        ];
        for key in keys {
            assert!(scoreboard_storage::validate_key(key.as_str()).is_ok());
        }
        assert_eq!(StoreKey::SyncEvent.to_string(), "tournaments-sync-event");
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempdir().unwrap();
        let store = CollectionStore::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        let items = vec![Tournament::new("Cup")];

        store.save(StoreKey::Tournaments, &items);
        let reopened = CollectionStore::new(Arc::new(FileStore::open(dir.path()).unwrap()));
        let loaded: Vec<Tournament> = reopened.load(StoreKey::Tournaments);
        assert_eq!(loaded, items);
    }
}
