//! Cache Module
//!
//! Provides a size-bounded in-memory cache with TTL expiration, tag
//! invalidation, soonest-expiry eviction and snapshot persistence.

mod clock;
mod entry;
mod expiry;
pub mod snapshot;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use clock::{current_timestamp_ms, Clock, ManualClock, SystemClock};
pub use entry::{estimate_size, CacheEntry};
pub use expiry::ExpiryTracker;
pub use snapshot::{FileSnapshotStore, MemorySnapshotStore, SnapshotStore};
pub use stats::CacheStats;
pub use store::{CacheStore, SetOutcome};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Default capacity in bytes
pub const DEFAULT_MAX_SIZE: usize = 50 * 1024 * 1024; // 50 MB
