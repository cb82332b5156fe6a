//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with expiry-ordered eviction,
//! tag invalidation and snapshot persistence.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::cache::snapshot::{self, SnapshotStore};
use crate::cache::{
    estimate_size, CacheEntry, CacheStats, Clock, ExpiryTracker, SystemClock, MAX_KEY_LENGTH,
};
use crate::error::{CacheError, Result};

// == Set Outcome ==
/// What a `set` did besides storing the entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOutcome {
    /// Whether the new entry is still in the cache after eviction
    pub stored: bool,
    /// Keys evicted to get back under capacity, in eviction order
    pub evicted: Vec<String>,
}

// == Cache Store ==
/// Size-bounded cache with TTL expiry and tag invalidation.
///
/// When the byte total goes over `max_size` the entry with the soonest
/// `expires_at` is evicted first, including the entry that was just written.
/// If a snapshot store is attached, every mutation rewrites the snapshot.
#[derive(Debug)]
pub struct CacheStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Eviction order
    expiry: ExpiryTracker,
    /// Performance statistics
    stats: CacheStats,
    /// Sum of `size` over all entries
    total_size: usize,
    /// Capacity in bytes
    max_size: usize,
    /// TTL for entries written without one
    default_ttl: Duration,
    clock: Arc<dyn Clock>,
    snapshots: Option<Box<dyn SnapshotStore>>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty, unpersisted store on the system clock.
    ///
    /// # Arguments
    /// * `max_size` - Capacity in bytes of serialized data
    /// * `default_ttl` - TTL for entries written without one
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            expiry: ExpiryTracker::new(),
            stats: CacheStats::new(),
            total_size: 0,
            max_size,
            default_ttl,
            clock: Arc::new(SystemClock),
            snapshots: None,
        }
    }

    /// Replaces the time source.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Attaches a snapshot store and rehydrates from it.
    ///
    /// Expiry during rehydration is judged by the current clock, so call
    /// `with_clock` first when overriding it.
    pub fn with_snapshot_store(mut self, snapshots: Box<dyn SnapshotStore>) -> Self {
        self.snapshots = Some(snapshots);
        self.rehydrate();
        self
    }

    // == Set ==
    /// Stores `data` under `key` for `ttl` (or the default TTL).
    ///
    /// An existing entry under the same key is replaced and its size released
    /// before capacity is checked.
    pub fn set(
        &mut self,
        key: impl Into<String>,
        data: Value,
        ttl: Option<Duration>,
        tags: impl IntoIterator<Item = String>,
    ) -> Result<SetOutcome> {
        let key = key.into();
        validate_key(&key)?;

        let now = self.clock.now_ms();
        let ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(key.clone(), data, now, ttl, tags);
        self.insert_entry(entry);

        let evicted = self.enforce_capacity();
        let stored = self.entries.contains_key(&key);
        if !stored {
            debug!("Entry '{}' does not fit in {} bytes and was evicted", key, self.max_size);
        }

        self.persist();
        Ok(SetOutcome { stored, evicted })
    }

    // == Get ==
    /// Returns the data under `key` if it has not expired.
    ///
    /// Expired entries are removed and counted as misses.
    pub fn get(&mut self, key: &str) -> Result<Value> {
        let now = self.clock.now_ms();

        let Some(entry) = self.entries.get(key) else {
            self.stats.record_miss();
            return Err(CacheError::NotFound(key.to_string()));
        };

        if !entry.is_expired(now) {
            let data = entry.data.clone();
            self.stats.record_hit();
            return Ok(data);
        }

        self.remove_entry(key);
        self.stats.record_expirations(1);
        self.stats.record_miss();
        self.persist();
        Err(CacheError::Expired(key.to_string()))
    }

    // == Delete ==
    /// Removes an entry. Returns whether one was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key).is_some();
        if removed {
            self.persist();
        }
        removed
    }

    // == Invalidate By Tag ==
    /// Removes every entry carrying `tag`. Returns how many were removed.
    pub fn invalidate_by_tag(&mut self, tag: &str) -> usize {
        let keys: Vec<String> = self
            .entries
            .values()
            .filter(|entry| entry.has_tag(tag))
            .map(|entry| entry.key.clone())
            .collect();

        for key in &keys {
            self.remove_entry(key);
        }

        let count = keys.len();
        if count > 0 {
            self.stats.record_invalidations(count);
            info!("Invalidated {} entries tagged '{}'", count, tag);
            self.persist();
        }
        count
    }

    // == Clear ==
    /// Removes every entry. Returns how many were removed.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        self.entries.clear();
        self.expiry.clear();
        self.total_size = 0;
        self.persist();
        count
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let expired = self.expiry.expired_keys(self.clock.now_ms());

        for key in &expired {
            self.remove_entry(key);
        }

        let count = expired.len();
        if count > 0 {
            self.stats.record_expirations(count);
            self.persist();
        }
        count
    }

    // == Accessors ==
    /// Returns true if a live entry exists under `key`. No side effects.
    pub fn contains(&self, key: &str) -> bool {
        let now = self.clock.now_ms();
        self.entries
            .get(key)
            .is_some_and(|entry| !entry.is_expired(now))
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_totals(self.entries.len(), self.total_size);
        stats.max_size = self.max_size;
        stats
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_size(&self) -> usize {
        self.total_size
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    // == Internals ==
    fn insert_entry(&mut self, entry: CacheEntry) {
        self.remove_entry(&entry.key);
        self.total_size += entry.size;
        self.expiry.track(&entry.key, entry.expires_at);
        self.entries.insert(entry.key.clone(), entry);
    }

    fn remove_entry(&mut self, key: &str) -> Option<CacheEntry> {
        let entry = self.entries.remove(key)?;
        self.total_size -= entry.size;
        self.expiry.remove(key);
        Some(entry)
    }

    /// Evicts soonest-expiring entries until the total fits.
    fn enforce_capacity(&mut self) -> Vec<String> {
        let mut evicted = Vec::new();

        while self.total_size > self.max_size {
            let Some(key) = self.expiry.evict_soonest() else {
                break;
            };
            if let Some(entry) = self.entries.remove(&key) {
                self.total_size -= entry.size;
            }
            self.stats.record_eviction();
            evicted.push(key);
        }

        if !evicted.is_empty() {
            debug!("Evicted {} entries to stay within {} bytes", evicted.len(), self.max_size);
        }
        evicted
    }

    /// Writes the whole cache to the snapshot store. Failures are logged only.
    ///
    /// Entries are written in eviction order so that a reload re-tracks them
    /// in the same `(expires_at, write)` order. The write is synchronous and
    /// runs while the caller holds the store.
    fn persist(&self) {
        let Some(snapshots) = &self.snapshots else {
            return;
        };

        let ordered = self.expiry.keys().filter_map(|key| self.entries.get(key));
        let written = snapshot::encode(ordered)
            .and_then(|payload| snapshots.write(&payload));
        if let Err(e) = written {
            warn!("Failed to persist cache snapshot: {}", e);
        }
    }

    /// Loads live entries from the snapshot store.
    fn rehydrate(&mut self) {
        let Some(snapshots) = &self.snapshots else {
            return;
        };

        let payload = match snapshots.read() {
            Ok(Some(payload)) => payload,
            Ok(None) => return,
            Err(e) => {
                warn!("Failed to read cache snapshot: {}", e);
                return;
            }
        };

        let entries = match snapshot::decode(&payload) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Discarding unreadable cache snapshot: {}", e);
                return;
            }
        };

        let now = self.clock.now_ms();
        let total = entries.len();
        let held_before = self.entries.len();
        let mut loaded = 0;

        for mut entry in entries {
            if entry.is_expired(now) {
                continue;
            }
            // Snapshot sizes are not trusted
            entry.size = estimate_size(&entry.data);
            self.insert_entry(entry);
            loaded += 1;
        }

        let evicted = self.enforce_capacity();
        info!(
            "Rehydrated {} of {} snapshot entries ({} evicted for capacity, {} now held)",
            loaded,
            total,
            evicted.len(),
            self.entries.len()
        );

        // The snapshot no longer matches what is held
        if loaded < total || held_before > 0 || !evicted.is_empty() {
            self.persist();
        }
    }
}

// == Validation ==
fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() {
        return Err(CacheError::InvalidRequest("Key cannot be empty".to_string()));
    }
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::InvalidRequest(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    Ok(())
}
