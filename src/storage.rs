use std::{
    cell::RefCell,
    collections::HashMap,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use fs2::FileExt;
use log::{debug, error, info, trace};
use tempfile::NamedTempFile;

use crate::{CalError, Result};

/// Durable key-value persistence for serialized collections.
///
/// Values are whole documents: there are no partial reads and no
/// transactions beyond [`KeyValueStore::compare_and_set`].
pub trait KeyValueStore {
    /// Returns the stored text for `key`, or `None` if the key is absent.
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Replaces the stored text for `key`.
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Writes `value` only if the current text equals `expected`.
    ///
    /// Returns `false` without writing when another writer got there first.
    fn compare_and_set(&self, key: &str, expected: Option<&str>, value: &str) -> Result<bool> {
        let current = self.get(key)?;
        if current.as_deref() != expected {
            debug!("compare_and_set on '{}' found a newer value", key);
            return Ok(false);
        }
        self.set(key, value)?;
        Ok(true)
    }
}

/// Stores each key as `<root>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Creates a file store rooted at `root`, creating the directory if needed.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        if !root.exists() {
            debug!("Data directory does not exist, creating: {}", root.display());
            fs::create_dir_all(&root).map_err(|e| {
                error!("Failed to create data directory: {}", e);
                CalError::DirectoryError { path: root.clone() }
            })?;
        }

        info!("Opened file store at {}", root.display());
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", key))
    }

    /// Takes the advisory lock guarding `key`, blocking until it is free.
    fn lock(&self, key: &str) -> Result<KeyLock> {
        let path = self.root.join(format!("{}.lock", key));
        let file = File::create(&path).map_err(|e| {
            error!("Failed to create lock file {}: {}", path.display(), e);
            CalError::Io(e)
        })?;

        file.lock_exclusive().map_err(|e| {
            error!("Failed to lock {}: {}", path.display(), e);
            CalError::Io(e)
        })?;

        trace!("Locked {}", path.display());
        Ok(KeyLock { _file: file })
    }
}

/// Releases the key lock when dropped.
struct KeyLock {
    _file: File,
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.key_path(key);
        if !path.exists() {
            trace!("No stored value at {}", path.display());
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| {
            error!("Failed to read {}: {}", path.display(), e);
            CalError::Io(e)
        })?;
        Ok(Some(content))
    }

    /// Writes through a temporary file in the same directory and renames it
    /// into place, so readers never observe a half-written document.
    fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.key_path(key);
        debug!("Writing {} bytes to {}", value.len(), path.display());

        let mut temp_file = NamedTempFile::new_in(&self.root).map_err(|e| {
            error!("Failed to create temporary file: {}", e);
            CalError::Io(e)
        })?;

        temp_file.write_all(value.as_bytes()).map_err(|e| {
            error!("Failed to write to temporary file: {}", e);
            CalError::Io(e)
        })?;
        temp_file.flush()?;

        temp_file.persist(&path).map_err(|e| {
            error!("Failed to persist file {}: {}", path.display(), e.error);
            CalError::Io(e.error)
        })?;

        trace!("Persisted {}", path.display());
        Ok(())
    }

    /// Holds the key's lock file across the read and the write, so two
    /// processes cannot both pass the comparison.
    fn compare_and_set(&self, key: &str, expected: Option<&str>, value: &str) -> Result<bool> {
        let _lock = self.lock(key)?;

        let current = self.get(key)?;
        if current.as_deref() != expected {
            debug!("compare_and_set on '{}' found a newer value", key);
            return Ok(false);
        }
        self.set(key, value)?;
        Ok(true)
    }
}

/// In-process store, mostly for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store with `key` already holding `value`.
    pub fn with_value(key: &str, value: &str) -> Self {
        let store = Self::new();
        store
            .values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        store
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for &T {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn compare_and_set(&self, key: &str, expected: Option<&str>, value: &str) -> Result<bool> {
        (**self).compare_and_set(key, expected, value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_absent_key() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert_eq!(store.get("events").unwrap(), None);
    }

    #[test]
    fn test_file_store_set_and_get() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path().join("nested")).unwrap();
        store.set("events", "[]").unwrap();
        assert_eq!(store.get("events").unwrap().as_deref(), Some("[]"));
        assert!(dir.path().join("nested/events.json").exists());

        store.set("events", "[1]").unwrap();
        assert_eq!(store.get("events").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_compare_and_set() {
        let store = MemoryStore::new();
        assert!(store.compare_and_set("k", None, "a").unwrap());
        assert!(!store.compare_and_set("k", None, "b").unwrap());
        assert!(store.compare_and_set("k", Some("a"), "c").unwrap());
        assert_eq!(store.get("k").unwrap().as_deref(), Some("c"));
    }

    #[test]
    fn test_file_store_compare_and_set_across_handles() {
        let dir = TempDir::new().unwrap();
        let first = FileStore::open(dir.path()).unwrap();
        let second = FileStore::open(dir.path()).unwrap();

        assert!(first.compare_and_set("events", None, "[1]").unwrap());
        // The second handle still believes the key is absent.
        assert!(!second.compare_and_set("events", None, "[2]").unwrap());
        assert_eq!(first.get("events").unwrap().as_deref(), Some("[1]"));

        assert!(second.compare_and_set("events", Some("[1]"), "[3]").unwrap());
        assert_eq!(first.get("events").unwrap().as_deref(), Some("[3]"));
        assert!(dir.path().join("events.lock").exists());
    }

    #[test]
    fn test_file_store_lock_is_released() {
        let dir = TempDir::new().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        store.compare_and_set("events", None, "[]").unwrap();

        // A failed comparison must not leave the key locked either.
        assert!(!store.compare_and_set("events", None, "[1]").unwrap());

        let lock = File::create(dir.path().join("events.lock")).unwrap();
        lock.try_lock_exclusive().unwrap();
    }
}
