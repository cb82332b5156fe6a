//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use crate::routing::{Destination, RequestMode};

/// Request body for the SET operation (PUT /set)
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// Any JSON value
    pub data: Value,
    /// Optional TTL in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    /// Invalidation labels
    #[serde(default)]
    pub tags: Vec<String>,
}

impl SetRequest {
    /// Validates the fields the store does not check itself
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.tags.iter().any(|t| t.is_empty()) {
            return Some("Tags cannot be empty".to_string());
        }
        None
    }

    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }
}

/// Request body for POST /route
#[derive(Debug, Clone, Deserialize)]
pub struct RouteRequest {
    pub path: String,
    #[serde(default)]
    pub destination: Option<Destination>,
    #[serde(default)]
    pub mode: Option<RequestMode>,
}
