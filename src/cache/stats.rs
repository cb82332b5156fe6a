//! Cache Statistics Module
//!
//! Tracks cache counters and size totals.

use serde::Serialize;

// == Cache Stats ==
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Number of successful cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals (key not found or expired)
    pub misses: u64,
    /// Number of entries evicted to stay within capacity
    pub evictions: u64,
    /// Number of entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Number of entries removed by tag invalidation
    pub invalidations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
    /// Sum of entry sizes in bytes
    pub total_size: usize,
    /// Capacity in bytes
    pub max_size: usize,
}

impl CacheStats {
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Returns hits / (hits + misses), or 0.0 if no requests have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expirations(&mut self, count: usize) {
        self.expirations += count as u64;
    }

    pub fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }

    // == Update Totals ==
    pub fn set_totals(&mut self, entries: usize, size: usize) {
        self.total_entries = entries;
        self.total_size = size;
    }
}
