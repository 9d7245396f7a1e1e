//! Key-value stores with automatic JSON serialization.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::rc::Rc;

use serde::{de::DeserializeOwned, Serialize};

use crate::StorageError;

/// A byte-oriented key-value store (the localStorage port).
///
/// Methods take `&self`; implementations use interior mutability because
/// the client side is single-threaded and stores are shared between the
/// cart and whoever else persists session data.
pub trait KeyValueStore {
    /// Get the raw bytes stored under `key`.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError>;

    /// Delete `key`. Deleting a missing key is not an error.
    fn delete(&self, key: &str) -> Result<(), StorageError>;
}

impl<T: KeyValueStore + ?Sized> KeyValueStore for Rc<T> {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        (**self).set(key, value)
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        (**self).delete(key)
    }
}

/// In-memory store, used as the test double and as the fallback when no
/// persistent backend is configured.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, Vec<u8>>>,
    unavailable: Cell<bool>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a disabled or full backend: every call fails while set.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.set(unavailable);
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.unavailable.get() {
            return Err(StorageError::Unavailable("memory store disabled".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.check()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        self.check()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Directory-backed store: one `<key>.json` file per key.
///
/// Lets the CLI keep a cart between invocations the way a browser keeps
/// localStorage between page loads.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
            && !key.starts_with('.');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", key.replace(':', "_"))))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read(&path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &[u8]) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        fs::write(path, value)?;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Typed cache over a [`KeyValueStore`].
///
/// Values are stored as JSON, so any `Serialize + DeserializeOwned` type
/// round-trips.
#[derive(Debug, Clone)]
pub struct Cache<S> {
    store: S,
}

impl<S: KeyValueStore> Cache<S> {
    /// Wrap a store.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Get a value from the cache.
    ///
    /// Returns `None` if the key doesn't exist. Malformed JSON is an error;
    /// callers that want fall-back-to-default semantics decide that themselves.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, StorageError> {
        match self.store.get(key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Set a value in the cache.
    pub fn set<T: Serialize>(&self, key: &str, value: &T) -> Result<(), StorageError> {
        let bytes = serde_json::to_vec(value)?;
        self.store.set(key, &bytes)
    }

    /// Delete a value from the cache.
    pub fn delete(&self, key: &str) -> Result<(), StorageError> {
        self.store.delete(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Snapshot {
        count: u32,
    }

    #[test]
    fn test_memory_store_roundtrip() {
        let cache = Cache::new(MemoryStore::new());
        cache.set("snap", &Snapshot { count: 3 }).unwrap();
        assert_eq!(cache.get::<Snapshot>("snap").unwrap(), Some(Snapshot { count: 3 }));

        cache.delete("snap").unwrap();
        assert_eq!(cache.get::<Snapshot>("snap").unwrap(), None);
    }

    #[test]
    fn test_unavailable_store_fails() {
        let store = MemoryStore::new();
        store.set_unavailable(true);
        assert!(matches!(
            store.set("k", b"v"),
            Err(StorageError::Unavailable(_))
        ));
        store.set_unavailable(false);
        assert!(store.set("k", b"v").is_ok());
        assert_eq!(store.get("k").unwrap().as_deref(), Some(&b"v"[..]));
    }

    #[test]
    fn test_malformed_json_is_error() {
        let store = MemoryStore::new();
        store.set("snap", b"{not json").unwrap();
        let cache = Cache::new(store);
        assert!(cache.get::<Snapshot>("snap").is_err());
    }

    #[test]
    fn test_shared_store_through_rc() {
        let store = Rc::new(MemoryStore::new());
        let a = Cache::new(Rc::clone(&store));
        let b = Cache::new(Rc::clone(&store));
        a.set("shared", &Snapshot { count: 1 }).unwrap();
        assert_eq!(b.get::<Snapshot>("shared").unwrap(), Some(Snapshot { count: 1 }));
    }

    #[test]
    fn test_file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("state")).unwrap();
        let cache = Cache::new(store);

        assert_eq!(cache.get::<Snapshot>("cart:v1").unwrap(), None);
        cache.set("cart:v1", &Snapshot { count: 7 }).unwrap();
        assert_eq!(cache.get::<Snapshot>("cart:v1").unwrap(), Some(Snapshot { count: 7 }));

        cache.delete("cart:v1").unwrap();
        cache.delete("cart:v1").unwrap();
        assert_eq!(cache.get::<Snapshot>("cart:v1").unwrap(), None);
    }

    #[test]
    fn test_file_store_rejects_path_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        assert!(matches!(
            store.set("../escape", b"x"),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
