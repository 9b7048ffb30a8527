//! Durable store trait definition.

use crate::error::{StorageError, StorageResult};

/// Longest key a store accepts.
pub const MAX_KEY_LEN: usize = 64;

/// A key-partitioned durable store.
///
/// Stores are **opaque byte stores**. Each key holds one value which is
/// always replaced as a whole. Scoreboard owns all interpretation of the
/// bytes - stores do not know about tournaments, backups or change logs.
///
/// # Invariants
///
/// - `load` after `save` on the same key returns the saved bytes
/// - `load` of a key that was never saved (or was removed) returns `None`
/// - `save` never leaves a partially written value visible
/// - Stores must be `Send + Sync` so contexts can share them
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
/// - [`super::FileStore`] - For persistent storage
pub trait DurableStore: Send + Sync {
    /// Loads the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or an I/O error occurs.
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>>;

    /// Replaces the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or the write fails.
    fn save(&self, key: &str, value: &[u8]) -> StorageResult<()>;

    /// Removes the value stored under `key`. Removing a missing key is not
    /// an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is invalid or an I/O error occurs.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Lists the keys currently holding a value, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the listing cannot be produced.
    fn keys(&self) -> StorageResult<Vec<String>>;
}

/// Checks that `key` is usable by every store.
///
/// Keys are 1 to [`MAX_KEY_LEN`] ASCII letters, digits, `-` or `_`.
///
/// # Errors
///
/// Returns [`StorageError::InvalidKey`] otherwise.
pub fn validate_key(key: &str) -> StorageResult<()> {
    let valid = !key.is_empty()
        && key.len() <= MAX_KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');

    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey {
            key: key.to_string(),
        })
    }
}
