//! In-memory store for testing.

use crate::error::StorageResult;
use crate::store::{validate_key, DurableStore};
use parking_lot::RwLock;
use std::collections::BTreeMap;

/// An in-memory durable store.
///
/// This store keeps every value in memory and is suitable for:
/// - Unit tests
/// - Integration tests
/// - Ephemeral sessions that don't need persistence
///
/// Several contexts can share one instance through an `Arc` to simulate
/// views of the same device.
///
/// # Example
///
/// ```rust
/// use scoreboard_storage::{DurableStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// store.save("changeLog", b"[]").unwrap();
/// store.remove("changeLog").unwrap();
/// assert!(store.load("changeLog").unwrap().is_none());
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    values: RwLock<BTreeMap<String, Vec<u8>>>,
}

impl InMemoryStore {
    /// Creates a new empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with pre-existing values.
    ///
    /// Useful for testing recovery from stored data.
    #[must_use]
    pub fn with_values<I, K>(values: I) -> Self
    where
        I: IntoIterator<Item = (K, Vec<u8>)>,
        K: Into<String>,
    {
        Self {
            values: RwLock::new(values.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Returns the number of keys holding a value.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.read().len()
    }

    /// Returns true if no key holds a value.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.read().is_empty()
    }

    /// Removes every value.
    pub fn clear(&self) {
        self.values.write().clear();
    }
}

impl DurableStore for InMemoryStore {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(self.values.read().get(key).cloned())
    }

    fn save(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        self.values.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        self.values.write().remove(key);
        Ok(())
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        Ok(self.values.read().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StorageError;
    use proptest::prelude::*;

    #[test]
    fn memory_new_is_empty() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());
        assert!(store.load("tournaments").unwrap().is_none());
    }

    #[test]
    fn memory_save_replaces_whole_value() {
        let store = InMemoryStore::new();
        store.save("tournaments", b"[1,2,3]").unwrap();
        store.save("tournaments", b"[]").unwrap();

        assert_eq!(store.load("tournaments").unwrap().unwrap(), b"[]");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_keys_are_independent() {
        let store = InMemoryStore::new();
        store.save("tournaments", b"a").unwrap();
        store.save("changeLog", b"b").unwrap();
        store.remove("tournaments").unwrap();

        assert!(store.load("tournaments").unwrap().is_none());
        assert_eq!(store.load("changeLog").unwrap().unwrap(), b"b");
        assert_eq!(store.keys().unwrap(), vec!["changeLog".to_string()]);
    }

    #[test]
    fn memory_remove_missing_is_ok() {
        let store = InMemoryStore::new();
        assert!(store.remove("backupRecords").is_ok());
    }

    #[test]
    fn memory_with_values() {
        let store = InMemoryStore::with_values([("tournaments", b"not json".to_vec())]);
        assert_eq!(store.load("tournaments").unwrap().unwrap(), b"not json");
    }

    #[test]
    fn memory_rejects_invalid_key() {
        let store = InMemoryStore::new();
        let result = store.save("../x", b"1");
        assert!(matches!(result, Err(StorageError::InvalidKey { .. })));
    }

    #[test]
    fn memory_clear() {
        let store = InMemoryStore::new();
        store.save("a", b"1").unwrap();
        store.clear();
        assert!(store.is_empty());
    }

    proptest! {
        #[test]
        fn read_after_write(value in prop::collection::vec(any::<u8>(), 0..512)) {
            let store = InMemoryStore::new();
            store.save("key", &value).unwrap();
            prop_assert_eq!(store.load("key").unwrap(), Some(value));
        }
    }
}
