//! Response DTOs for the cache server API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;
use serde_json::Value;

use crate::cache::{CacheStats, SetOutcome};
use crate::routing::{CachePartition, RouteDecision, PRECACHE_PATHS};

/// Response body for the GET operation (GET /get/:key)
#[derive(Debug, Clone, Serialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The stored value
    pub data: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, data: Value) -> Self {
        Self {
            key: key.into(),
            data,
        }
    }
}

/// Response body for the SET operation (PUT /set)
#[derive(Debug, Clone, Serialize)]
pub struct SetResponse {
    /// Success message
    pub message: String,
    /// The key that was set
    pub key: String,
    /// False when the entry was too large to keep
    pub stored: bool,
    /// Keys evicted to make room
    pub evicted: Vec<String>,
}

impl SetResponse {
    pub fn new(key: impl Into<String>, outcome: SetOutcome) -> Self {
        let key = key.into();
        let message = if outcome.stored {
            format!("Key '{}' set successfully", key)
        } else {
            format!("Key '{}' exceeded cache capacity and was evicted", key)
        };
        Self {
            message,
            key,
            stored: outcome.stored,
            evicted: outcome.evicted,
        }
    }
}

/// Response body for the DELETE operation (DELETE /del/:key)
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    /// The key that was deleted
    pub key: String,
}

impl DeleteResponse {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted successfully", key),
            key,
        }
    }
}

/// Response body for tag invalidation (DELETE /tags/:tag)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    pub tag: String,
    /// Number of entries removed
    pub removed: usize,
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for POST /route
#[derive(Debug, Clone, Serialize)]
pub struct RouteResponse {
    #[serde(flatten)]
    pub decision: RouteDecision,
    /// Cache the response is stored in, absent for network-only requests
    pub cache_name: Option<&'static str>,
}

impl From<RouteDecision> for RouteResponse {
    fn from(decision: RouteDecision) -> Self {
        Self {
            cache_name: decision.partition.map(CachePartition::name),
            decision,
        }
    }
}

/// Response body for GET /precache
#[derive(Debug, Clone, Serialize)]
pub struct PrecacheResponse {
    pub cache_name: &'static str,
    pub paths: Vec<&'static str>,
}

impl PrecacheResponse {
    pub fn static_assets() -> Self {
        Self {
            cache_name: CachePartition::Static.name(),
            paths: PRECACHE_PATHS.to_vec(),
        }
    }
}

/// Response body for POST /control
#[derive(Debug, Clone, Serialize)]
pub struct ControlResponse {
    pub message: String,
    /// Entries written or removed by the message
    pub affected: usize,
}

impl ControlResponse {
    pub fn new(message: impl Into<String>, affected: usize) -> Self {
        Self {
            message: message.into(),
            affected,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
