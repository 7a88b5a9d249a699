//! Durable key-value storage backends
//!
//! LocalStorage in the browser, one JSON file per key on native, and an
//! in-memory map for tests and headless sessions.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

/// Errors that can occur while reading or writing storage
#[derive(Debug)]
pub enum StorageError {
    /// Filesystem failure
    Io(std::io::Error),
    /// No backing store (private browsing, no data directory)
    Unavailable,
    /// The backend refused the write (quota, read-only)
    Rejected(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "IO error: {}", e),
            StorageError::Unavailable => write!(f, "Storage unavailable"),
            StorageError::Rejected(msg) => write!(f, "Write rejected: {}", msg),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Read/write contract for one string value per key
pub trait KeyValueStore {
    /// `Ok(None)` when nothing was ever written under `key`
    fn load(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// A store shared between the progression engine and settings.
/// Single-threaded: everything runs on the frame loop.
pub type SharedStore = Rc<RefCell<dyn KeyValueStore>>;

/// Wrap a concrete backend for sharing
pub fn shared<S: KeyValueStore + 'static>(store: S) -> SharedStore {
    Rc::new(RefCell::new(store))
}

/// Volatile store. Can be flipped read-only to simulate a full or locked
/// backend.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
    read_only: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seeded with one value
    pub fn with_value(key: &str, value: &str) -> Self {
        let mut store = Self::new();
        store.values.insert(key.to_string(), value.to_string());
        store
    }

    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    /// Raw value, bypassing the trait (test inspection)
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.values.get(key).cloned())
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.read_only {
            return Err(StorageError::Rejected("store is read-only".to_string()));
        }
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: std::path::PathBuf,
}

#[cfg(not(target_arch = "wasm32"))]
impl FileStore {
    pub fn new(dir: impl Into<std::path::PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `<data dir>/eco-dash`, if the platform has a data directory
    pub fn in_data_dir() -> Option<Self> {
        dirs::data_dir().map(|d| Self::new(d.join("eco-dash")))
    }

    fn path(&self, key: &str) -> std::path::PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl KeyValueStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.path(key)) {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir)?;
        // Write aside then rename so a crash never leaves half a file
        let tmp = self.dir.join(format!("{}.json.tmp", key));
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, self.path(key))?;
        Ok(())
    }
}

/// Browser LocalStorage
#[cfg(target_arch = "wasm32")]
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorageStore;

#[cfg(target_arch = "wasm32")]
impl LocalStorageStore {
    fn storage() -> Result<web_sys::Storage, StorageError> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or(StorageError::Unavailable)
    }
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStorageStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Rejected(format!("{:?}", e)))
    }

    fn save(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, value)
            .map_err(|e| StorageError::Rejected(format!("{:?}", e)))
    }
}

/// Best durable store for the current target, in memory as a last resort
pub fn default_store() -> SharedStore {
    #[cfg(target_arch = "wasm32")]
    {
        shared(LocalStorageStore)
    }

    #[cfg(not(target_arch = "wasm32"))]
    {
        match FileStore::in_data_dir() {
            Some(store) => {
                log::info!("Saving to {}", store.dir.display());
                shared(store)
            }
            None => {
                log::warn!("No data directory, progress will not be kept");
                shared(MemoryStore::new())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_roundtrip() {
        let mut store = MemoryStore::new();
        assert!(store.load("k").unwrap().is_none());
        store.save("k", "v").unwrap();
        assert_eq!(store.load("k").unwrap().as_deref(), Some("v"));
        store.save("k", "w").unwrap();
        assert_eq!(store.get("k"), Some("w"));
    }

    #[test]
    fn test_read_only_rejects_writes() {
        let mut store = MemoryStore::with_value("k", "old");
        store.set_read_only(true);
        let err = store.save("k", "new").unwrap_err();
        assert!(matches!(err, StorageError::Rejected(_)));
        assert_eq!(store.get("k"), Some("old"));
    }

    #[test]
    fn test_error_display() {
        let err: StorageError = std::io::Error::other("disk gone").into();
        assert!(err.to_string().contains("disk gone"));
        assert_eq!(StorageError::Unavailable.to_string(), "Storage unavailable");
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_store_roundtrip() {
        let dir = std::env::temp_dir().join(format!("eco-dash-test-{}", std::process::id()));
        let mut store = FileStore::new(&dir);
        assert!(store.load("profile").unwrap().is_none());
        store.save("profile", "{\"a\":1}").unwrap();
        assert_eq!(store.load("profile").unwrap().as_deref(), Some("{\"a\":1}"));
        assert!(!dir.join("profile.json.tmp").exists());
        store.save("profile", "{\"a\":2}").unwrap();
        assert_eq!(store.load("profile").unwrap().as_deref(), Some("{\"a\":2}"));
        let _ = std::fs::remove_dir_all(&dir);
    }
}
