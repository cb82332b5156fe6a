//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries, so
//! entries nobody reads again still release their bytes.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::CacheStore;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// # Arguments
/// * `cache` - Arc<RwLock<CacheStore>> shared reference to the cache
/// * `cleanup_interval_secs` - Interval in seconds between cleanup runs
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
pub fn spawn_cleanup_task(
    cache: Arc<RwLock<CacheStore>>,
    cleanup_interval_secs: u64,
) -> JoinHandle<()> {
    spawn_cleanup_task_every(cache, Duration::from_secs(cleanup_interval_secs))
}

/// Same as [`spawn_cleanup_task`] with an arbitrary period.
pub fn spawn_cleanup_task_every(cache: Arc<RwLock<CacheStore>>, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting TTL cleanup task with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut cache_guard = cache.write().await;
                cache_guard.cleanup_expired()
            };

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}
