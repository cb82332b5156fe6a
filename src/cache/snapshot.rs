//! Snapshot Module
//!
//! Encodes the cache as a JSON array of entries and stores it in a
//! key-value slot that outlives the process.

use std::fmt::Debug;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::cache::CacheEntry;
use crate::error::{CacheError, Result};

// == Snapshot Store Trait ==
/// A single persistent slot holding the latest snapshot payload.
pub trait SnapshotStore: Send + Sync + Debug {
    /// Replaces the stored payload.
    fn write(&self, payload: &str) -> Result<()>;

    /// Returns the stored payload, or `None` if nothing was ever written.
    fn read(&self) -> Result<Option<String>>;
}

// == Codec ==
/// Serializes entries into the snapshot format.
pub fn encode<'a>(entries: impl IntoIterator<Item = &'a CacheEntry>) -> Result<String> {
    let entries: Vec<&CacheEntry> = entries.into_iter().collect();
    serde_json::to_string(&entries)
        .map_err(|e| CacheError::Persistence(format!("Failed to encode snapshot: {}", e)))
}

/// Parses a snapshot payload.
pub fn decode(payload: &str) -> Result<Vec<CacheEntry>> {
    serde_json::from_str(payload)
        .map_err(|e| CacheError::Persistence(format!("Failed to decode snapshot: {}", e)))
}

// == File Snapshot Store ==
/// Keeps the snapshot in a file, replaced atomically on each write.
///
/// Writes use blocking `std::fs` calls on the caller's thread. The server
/// calls them from async handlers while holding the store's write lock, so
/// every mutation waits on the disk.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn write(&self, payload: &str) -> Result<()> {
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, payload).map_err(|e| {
            CacheError::Persistence(format!("Failed to write {}: {}", tmp.display(), e))
        })?;
        fs::rename(&tmp, &self.path).map_err(|e| {
            CacheError::Persistence(format!("Failed to replace {}: {}", self.path.display(), e))
        })
    }

    fn read(&self) -> Result<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(payload) => Ok(Some(payload)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CacheError::Persistence(format!(
                "Failed to read {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}

// == Memory Snapshot Store ==
/// Keeps the snapshot in memory.
///
/// Clones share the slot, so a second `CacheStore` built from a clone sees
/// what the first one persisted, like a new browser session reading the
/// same local storage.
#[derive(Debug, Clone, Default)]
pub struct MemorySnapshotStore {
    slot: Arc<Mutex<Option<String>>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-loaded with `payload`.
    pub fn with_payload(payload: impl Into<String>) -> Self {
        Self {
            slot: Arc::new(Mutex::new(Some(payload.into()))),
        }
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn write(&self, payload: &str) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| CacheError::Persistence("Snapshot slot poisoned".to_string()))?;
        *slot = Some(payload.to_string());
        Ok(())
    }

    fn read(&self) -> Result<Option<String>> {
        let slot = self
            .slot
            .lock()
            .map_err(|_| CacheError::Persistence("Snapshot slot poisoned".to_string()))?;
        Ok(slot.clone())
    }
}
