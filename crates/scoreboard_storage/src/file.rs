//! File-based store for persistent storage.

use crate::error::{StorageError, StorageResult};
use crate::store::{validate_key, DurableStore};
use parking_lot::RwLock;
use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

/// Prefix of in-flight temporary files. Keys cannot start with it.
const TEMP_PREFIX: &str = ".tmp-";

/// A directory-backed durable store.
///
/// Each key maps to one file named after the key. Values survive process
/// restarts.
///
/// # Durability
///
/// `save` writes the new value to a temporary file, syncs it, and renames
/// it over the previous file, so readers see either the old or the new
/// value, never a mix.
///
/// # Thread Safety
///
/// The store is thread-safe within one process. Separate processes sharing
/// a directory get last-write-wins per key, with no locking.
///
/// # Example
///
/// ```no_run
/// use scoreboard_storage::{DurableStore, FileStore};
/// use std::path::Path;
///
/// let store = FileStore::open(Path::new("scoreboard-data")).unwrap();
/// store.save("tournaments", b"[]").unwrap();
/// ```
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
    lock: RwLock<()>,
}

impl FileStore {
    /// Opens a store rooted at `dir`, creating the directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created or `dir` exists
    /// but is not a directory.
    pub fn open(dir: &Path) -> StorageResult<Self> {
        fs::create_dir_all(dir)?;
        if !dir.is_dir() {
            return Err(StorageError::Corrupted(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            lock: RwLock::new(()),
        })
    }

    /// Returns the directory holding the store's files.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.dir
    }

    fn value_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{TEMP_PREFIX}{key}"))
    }
}

impl DurableStore for FileStore {
    fn load(&self, key: &str) -> StorageResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let _guard = self.lock.read();

        match fs::read(self.value_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &[u8]) -> StorageResult<()> {
        validate_key(key)?;
        let _guard = self.lock.write();

        let temp = self.temp_path(key);
        {
            let mut file = File::create(&temp)?;
            file.write_all(value)?;
            file.sync_all()?;
        }
        fs::rename(&temp, self.value_path(key))?;

        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        validate_key(key)?;
        let _guard = self.lock.write();

        match fs::remove_file(self.value_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> StorageResult<Vec<String>> {
        let _guard = self.lock.read();

        let mut keys = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str() {
                if validate_key(name).is_ok() {
                    keys.push(name.to_string());
                }
            }
        }
        keys.sort();

        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn file_open_creates_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("store");

        let store = FileStore::open(&path).unwrap();
        assert!(path.is_dir());
        assert_eq!(store.path(), path);
    }

    #[test]
    fn file_save_and_load() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.save("tournaments", b"[]").unwrap();
        assert_eq!(store.load("tournaments").unwrap().unwrap(), b"[]");
    }

    #[test]
    fn file_load_missing_is_none() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(store.load("changeLog").unwrap().is_none());
    }

    #[test]
    fn file_persistence() {
        let dir = tempdir().unwrap();

        {
            let store = FileStore::open(dir.path()).unwrap();
            store.save("backupRecords", b"persistent data").unwrap();
        }

        {
            let store = FileStore::open(dir.path()).unwrap();
            assert_eq!(
                store.load("backupRecords").unwrap().unwrap(),
                b"persistent data"
            );
        }
    }

    #[test]
    fn file_save_replaces_and_leaves_no_temp() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.save("tournaments", b"first, longer value").unwrap();
        store.save("tournaments", b"second").unwrap();

        assert_eq!(store.load("tournaments").unwrap().unwrap(), b"second");
        assert!(!store.temp_path("tournaments").exists());
    }

    #[test]
    fn file_remove() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.save("changeLog", b"[]").unwrap();
        store.remove("changeLog").unwrap();
        assert!(store.load("changeLog").unwrap().is_none());

        // Removing again is fine
        store.remove("changeLog").unwrap();
    }

    #[test]
    fn file_keys_skip_temp_files() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        store.save("tournaments", b"[]").unwrap();
        store.save("changeLog", b"[]").unwrap();
        fs::write(dir.path().join(".tmp-tournaments"), b"stale").unwrap();

        assert_eq!(
            store.keys().unwrap(),
            vec!["changeLog".to_string(), "tournaments".to_string()]
        );
    }

    #[test]
    fn file_rejects_path_traversal() {
        let dir = tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();

        let result = store.save("../outside", b"x");
        assert!(matches!(result, Err(StorageError::InvalidKey { .. })));
    }

    #[test]
    fn file_open_on_regular_file_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("plain");
        fs::write(&path, b"x").unwrap();

        assert!(FileStore::open(&path).is_err());
    }
}
