//! Expiry Tracker Module
//!
//! Orders keys by expiration time for soonest-to-expire eviction.

use std::collections::{BTreeSet, HashMap};

// == Expiry Tracker ==
/// Tracks keys ordered by `(expires_at, write sequence)`.
///
/// The front of the ordering is the next eviction victim. Keys with equal
/// expiry are ordered by when they were last written, earliest first.
#[derive(Debug, Default)]
pub struct ExpiryTracker {
    /// Eviction order
    order: BTreeSet<(u64, u64, String)>,
    /// Current position of each key in `order`
    positions: HashMap<String, (u64, u64)>,
    /// Monotonic write counter
    next_seq: u64,
}

impl ExpiryTracker {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Track ==
    /// Records (or re-records) a key with its expiration time.
    ///
    /// Re-tracking an existing key moves it behind every other key with the
    /// same expiry.
    pub fn track(&mut self, key: &str, expires_at: u64) {
        self.remove(key);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.order.insert((expires_at, seq, key.to_string()));
        self.positions.insert(key.to_string(), (expires_at, seq));
    }

    // == Remove ==
    /// Stops tracking a key. Unknown keys are ignored.
    pub fn remove(&mut self, key: &str) {
        if let Some((expires_at, seq)) = self.positions.remove(key) {
            self.order.remove(&(expires_at, seq, key.to_string()));
        }
    }

    // == Evict Soonest ==
    /// Returns and removes the key that expires soonest.
    pub fn evict_soonest(&mut self) -> Option<String> {
        let (_, _, key) = self.order.pop_first()?;
        self.positions.remove(&key);
        Some(key)
    }

    // == Keys ==
    /// Iterates keys in eviction order, soonest first.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(|(_, _, key)| key.as_str())
    }

    // == Expired Keys ==
    /// Returns every key whose expiry is strictly before `now_ms`.
    pub fn expired_keys(&self, now_ms: u64) -> Vec<String> {
        self.order
            .iter()
            .take_while(|(expires_at, _, _)| *expires_at < now_ms)
            .map(|(_, _, key)| key.clone())
            .collect()
    }

    // == Clear ==
    pub fn clear(&mut self) {
        self.order.clear();
        self.positions.clear();
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.positions.contains_key(key)
    }
}
