//! Process-local key/value persistence.
//!
//! A single JSON object on disk maps string keys to serialized JSON values.
//! It holds the favorites set and the last known section image URLs, data
//! that belongs to this storefront instance and never to the data store.
//! Every write rewrites the whole file through a temporary file and a rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use esther_core::favorites::{FAVORITES_KEY, FavoritesStorage, StorageError};
use thiserror::Error;

/// Errors writing the local store.
#[derive(Debug, Error)]
pub enum LocalStoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// JSON file of string keys and serialized values.
#[derive(Debug)]
pub struct LocalStore {
    path: Option<PathBuf>,
    values: Mutex<BTreeMap<String, String>>,
}

impl LocalStore {
    /// Open the store at `path`.
    ///
    /// A missing file starts empty. An unreadable file is logged and also
    /// starts empty; it is replaced on the next write.
    #[must_use]
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!(error = %e, path = %path.display(), "Discarding unreadable local store");
                BTreeMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(e) => {
                tracing::warn!(error = %e, path = %path.display(), "Failed to read local store");
                BTreeMap::new()
            }
        };

        Self {
            path: Some(path),
            values: Mutex::new(values),
        }
    }

    /// Store that lives only in memory.
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            path: None,
            values: Mutex::new(BTreeMap::new()),
        }
    }

    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Serialized value stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    /// Store a serialized value under `key` and flush the file.
    ///
    /// The flush is blocking file I/O done while holding the lock, so writers
    /// are serialized and every write lands as a whole file. Keep values small:
    /// async callers block their worker thread for the duration. The value is
    /// kept in memory even when the flush fails.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStoreError`] if the file cannot be written.
    pub fn set(&self, key: &str, value: impl Into<String>) -> Result<(), LocalStoreError> {
        let mut values = self.lock();
        values.insert(key.to_string(), value.into());
        self.flush(&values)
    }

    /// Serialize `value` as JSON and store it under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`LocalStoreError`] if serialization or the write fails.
    pub fn set_json<T: serde::Serialize>(&self, key: &str, value: &T) -> Result<(), LocalStoreError> {
        let serialized = serde_json::to_string(value)?;
        self.set(key, serialized)
    }

    /// Deserialize the value under `key`, `None` if absent or unreadable.
    #[must_use]
    pub fn get_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.get(key)?;
        serde_json::from_str(&raw)
            .map_err(|e| tracing::warn!(error = %e, key = %key, "Ignoring unreadable local value"))
            .ok()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, BTreeMap<String, String>> {
        self.values.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn flush(&self, values: &BTreeMap<String, String>) -> Result<(), LocalStoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir)?;
        }

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, serde_json::to_vec_pretty(values)?)?;
        std::fs::rename(&tmp, path)?;
        Ok(())
    }
}

/// Favorites persistence backed by a shared [`LocalStore`].
#[derive(Debug, Clone)]
pub struct LocalFavorites {
    store: Arc<LocalStore>,
}

impl LocalFavorites {
    #[must_use]
    pub const fn new(store: Arc<LocalStore>) -> Self {
        Self { store }
    }
}

impl FavoritesStorage for LocalFavorites {
    fn read(&self) -> Option<String> {
        self.store.get(FAVORITES_KEY)
    }

    fn write(&self, serialized: &str) -> Result<(), StorageError> {
        self.store
            .set(FAVORITES_KEY, serialized)
            .map_err(|e| StorageError(e.to_string()))
    }
}
