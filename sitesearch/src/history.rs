//! Recent-search history
//!
//! Newest-first, unique by term, capped at [`MAX_HISTORY_ENTRIES`], persisted
//! as a JSON array under [`HISTORY_STORAGE_KEY`]. Persistence is best effort:
//! a failing backend loses durability, never the in-memory session list.

use crate::interface::HistoryEntry;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Storage key holding the serialized history
pub const HISTORY_STORAGE_KEY: &str = "recent-searches";

/// History capacity
pub const MAX_HISTORY_ENTRIES: usize = 5;

/// Terms shorter than this are never remembered. Measured in UTF-16 code
/// units, the unit browser-side history uses, so "🚀a" (3 units) qualifies.
const MIN_TERM_UNITS: usize = 3;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable string key/value storage
pub trait Storage: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&self, key: &str) -> StorageResult<()>;
}

/// In-process storage; lives as long as the value does
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// One `<key>.json` file per key under a directory
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
}

impl FileStorage {
    /// Use `dir`, creating it on first write
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self { dir: dir.as_ref().to_path_buf() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> StorageResult<PathBuf> {
        let valid = !key.is_empty()
            && key.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl Storage for FileStorage {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        fs::create_dir_all(&self.dir)?;
        // Readers never observe a partially written record
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, value)?;
        fs::rename(&tmp, &path)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        let path = self.path_for(key)?;
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Bounded, most-recent-first list of past search terms
pub struct HistoryStore {
    storage: Arc<dyn Storage>,
    entries: Vec<HistoryEntry>,
}

impl HistoryStore {
    /// Empty store over `storage`; call [`HistoryStore::load`] to read persisted entries.
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self { storage, entries: Vec::new() }
    }

    /// Current in-memory history, newest first
    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    /// Read persisted history.
    ///
    /// A corrupt record is removed and replaced by an empty history; an
    /// unreadable backend also yields an empty history. Neither is an error.
    pub fn load(&mut self) -> Vec<HistoryEntry> {
        let raw = match self.storage.get(HISTORY_STORAGE_KEY) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "search history unavailable, starting empty");
                None
            }
        };

        self.entries = match raw {
            None => Vec::new(),
            Some(raw) => match serde_json::from_str::<Vec<HistoryEntry>>(&raw) {
                Ok(mut entries) => {
                    entries.truncate(MAX_HISTORY_ENTRIES);
                    entries
                }
                Err(e) => {
                    warn!(error = %e, "discarding corrupt search history");
                    if let Err(e) = self.storage.remove(HISTORY_STORAGE_KEY) {
                        warn!(error = %e, "failed to remove corrupt search history");
                    }
                    Vec::new()
                }
            },
        };
        self.entries.clone()
    }

    /// Remember `term` now. See [`HistoryStore::record_at`].
    pub fn record(&mut self, term: &str) -> Vec<HistoryEntry> {
        self.record_at(term, Utc::now())
    }

    /// Remember `term` with the given timestamp.
    ///
    /// Terms of two UTF-16 units or fewer leave history untouched. Otherwise any older
    /// entry for the term is dropped, the new one goes to the front, and the
    /// list is cut to capacity before persisting.
    pub fn record_at(&mut self, term: &str, at: DateTime<Utc>) -> Vec<HistoryEntry> {
        if term.encode_utf16().count() < MIN_TERM_UNITS {
            return self.entries.clone();
        }

        self.entries.retain(|e| e.term != term);
        self.entries.insert(0, HistoryEntry { term: term.to_string(), timestamp: at });
        self.entries.truncate(MAX_HISTORY_ENTRIES);
        self.persist();
        debug!(term, entries = self.entries.len(), "recorded search term");
        self.entries.clone()
    }

    /// Forget everything, in memory and in storage
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.storage.remove(HISTORY_STORAGE_KEY) {
            warn!(error = %e, "failed to clear persisted search history");
        }
    }

    fn persist(&self) {
        let json = match serde_json::to_string(&self.entries) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize search history");
                return;
            }
        };
        if let Err(e) = self.storage.set(HISTORY_STORAGE_KEY, &json) {
            warn!(error = %e, "failed to persist search history");
        }
    }
}
