//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL, tags and a
//! size estimate.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cache entry with its data and metadata.
///
/// This is also the unit of the persisted snapshot, so every field is
/// serialized as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The key this entry is stored under
    pub key: String,
    /// The stored value
    pub data: Value,
    /// Expiration timestamp (Unix milliseconds)
    pub expires_at: u64,
    /// Labels for group invalidation
    #[serde(default)]
    pub tags: BTreeSet<String>,
    /// Byte length of the serialized data
    pub size: usize,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new entry that expires `ttl` after `now_ms`.
    pub fn new(
        key: impl Into<String>,
        data: Value,
        now_ms: u64,
        ttl: Duration,
        tags: impl IntoIterator<Item = String>,
    ) -> Self {
        let size = estimate_size(&data);
        Self {
            key: key.into(),
            data,
            expires_at: now_ms.saturating_add(ttl.as_millis() as u64),
            tags: tags.into_iter().collect(),
            size,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired at `now_ms`.
    ///
    /// The entry is still live at exactly `expires_at`; it is expired only
    /// once the current time is strictly past it.
    pub fn is_expired(&self, now_ms: u64) -> bool {
        now_ms > self.expires_at
    }

    // == Has Tag ==
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

// == Utility Functions ==
/// Estimates the stored size of a value as the byte length of its JSON form.
pub fn estimate_size(data: &Value) -> usize {
    // Value always serializes: its map keys are strings
    serde_json::to_vec(data).map_or(0, |bytes| bytes.len())
}
