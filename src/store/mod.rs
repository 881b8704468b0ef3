//! Persistent key/value storage for preferences and notes.
//!
//! Everything lives in a single `storage.json` object under the data
//! directory. When that directory cannot be created or written the store
//! degrades to "unavailable": reads yield their fallback and writes report
//! `false`, so callers never have to handle I/O failures themselves.

mod notes;
mod preferences;

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

pub use notes::{NOTES_KEY, Notes, strip_tags};
pub use preferences::{PreferenceSnapshot, Preferences, SLIDERS_KEY, THEME_KEY, Theme};

pub const STORE_FILE: &str = "storage.json";

/// Quota the usage warning is measured against.
pub const STORE_LIMIT: usize = 5 * 1024 * 1024;

const CACHE_PREFIX: &str = "smartfin-cache-";
const CURRENT_CACHE: &str = "smartfin-cache-v6";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("storage file {path} is not a JSON object of strings: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[derive(Debug, Clone)]
pub struct KvStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
    available: bool,
}

/// Default location: `<platform data dir>/smartfin`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("smartfin")
}

impl KvStore {
    /// Volatile store that never touches disk.
    pub fn in_memory() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
            available: true,
        }
    }

    /// Store that refuses every read and write.
    pub fn unavailable() -> Self {
        Self {
            path: None,
            entries: BTreeMap::new(),
            available: false,
        }
    }

    /// Opens `dir/storage.json`, creating the directory if needed, and
    /// checks that it can be written.
    pub fn try_open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir).map_err(|source| StoreError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(STORE_FILE);
        let entries = if path.exists() {
            let raw = fs::read_to_string(&path).map_err(|source| StoreError::Io {
                path: path.clone(),
                source,
            })?;
            if raw.trim().is_empty() {
                BTreeMap::new()
            } else {
                serde_json::from_str(&raw).map_err(|source| StoreError::Json {
                    path: path.clone(),
                    source,
                })?
            }
        } else {
            BTreeMap::new()
        };

        let store = Self {
            path: Some(path),
            entries,
            available: true,
        };
        store.persist()?;
        debug!(entries = store.entries.len(), "opened storage");
        Ok(store)
    }

    /// Like [`KvStore::try_open`], but falls back to an unavailable store.
    pub fn open(dir: &Path) -> Self {
        match Self::try_open(dir) {
            Ok(store) => store,
            Err(e) => {
                warn!("storage not available, using fallbacks: {e}");
                Self::unavailable()
            }
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    fn persist(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let json = serde_json::to_string_pretty(&self.entries).map_err(|source| {
            StoreError::Json {
                path: path.clone(),
                source,
            }
        })?;
        fs::write(path, json).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        if !self.available {
            return None;
        }
        self.entries.get(key).map(String::as_str)
    }

    pub fn get_or(&self, key: &str, fallback: &str) -> String {
        self.get(key).unwrap_or(fallback).to_string()
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Stores `value` under `key`; returns whether it was persisted.
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        if !self.available {
            debug!(key, "storage unavailable, value not saved");
            return false;
        }
        let previous = self.entries.insert(key.to_string(), value.to_string());
        if let Err(e) = self.persist() {
            warn!(key, "could not save storage item: {e}");
            match previous {
                Some(v) => self.entries.insert(key.to_string(), v),
                None => self.entries.remove(key),
            };
            return false;
        }
        true
    }

    pub fn remove(&mut self, key: &str) -> bool {
        if !self.available {
            return false;
        }
        let Some(previous) = self.entries.remove(key) else {
            return true;
        };
        if let Err(e) = self.persist() {
            warn!(key, "could not remove storage item: {e}");
            self.entries.insert(key.to_string(), previous);
            return false;
        }
        true
    }

    pub fn clear(&mut self) -> bool {
        if !self.available {
            return false;
        }
        let previous = std::mem::take(&mut self.entries);
        if let Err(e) = self.persist() {
            warn!("could not clear storage: {e}");
            self.entries = previous;
            return false;
        }
        true
    }

    pub fn keys(&self) -> Vec<String> {
        if !self.available {
            return Vec::new();
        }
        self.entries.keys().cloned().collect()
    }

    /// Approximate usage: characters across every key and value.
    pub fn size(&self) -> usize {
        if !self.available {
            return 0;
        }
        self.entries
            .iter()
            .map(|(k, v)| k.chars().count() + v.chars().count())
            .sum()
    }

    /// True once usage passes 80% of [`STORE_LIMIT`].
    pub fn is_full(&self) -> bool {
        self.size() * 5 > STORE_LIMIT * 4
    }

    /// Drops stale cache entries left behind by earlier releases.
    pub fn cleanup(&mut self) -> bool {
        if !self.available {
            return false;
        }
        let stale: Vec<String> = self
            .entries
            .keys()
            .filter(|k| k.starts_with(CACHE_PREFIX) && k.as_str() != CURRENT_CACHE)
            .cloned()
            .collect();
        stale.iter().all(|key| self.remove(key))
    }

    /// Start-up housekeeping: cleanup plus a usage report in the log.
    pub fn initialize(&mut self) {
        self.cleanup();
        if self.available {
            debug!(bytes = self.size(), "storage available");
            if self.is_full() {
                warn!("storage is getting full, consider cleanup");
            }
        } else {
            debug!("storage not available, using fallbacks");
        }
    }
}
