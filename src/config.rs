//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::DEFAULT_MAX_SIZE;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Cache capacity in bytes of serialized data
    pub max_size: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    pub default_ttl_ms: u64,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
    /// Snapshot file; `None` keeps the cache unpersisted
    pub snapshot_path: Option<PathBuf>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_SIZE_BYTES` - Cache capacity in bytes (default: 50 MB)
    /// - `DEFAULT_TTL_MS` - Default TTL in milliseconds (default: 300000)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 60)
    /// - `SNAPSHOT_PATH` - Snapshot file (default: unset)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_size: parse_var("MAX_SIZE_BYTES").unwrap_or(defaults.max_size),
            default_ttl_ms: parse_var("DEFAULT_TTL_MS").unwrap_or(defaults.default_ttl_ms),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL").unwrap_or(defaults.cleanup_interval),
            snapshot_path: env::var("SNAPSHOT_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        Duration::from_millis(self.default_ttl_ms)
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            default_ttl_ms: 300_000,
            server_port: 3000,
            cleanup_interval: 60,
            snapshot_path: None,
        }
    }
}
