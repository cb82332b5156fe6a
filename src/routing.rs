//! Fetch Routing Module
//!
//! Fixed decision table mapping a storefront request to a caching strategy
//! and one of the two named cache partitions, plus the page-to-worker
//! control messages.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Path prefix of API requests
pub const API_PREFIX: &str = "/api/";

/// Page served when a navigation fails with nothing cached
pub const OFFLINE_PAGE: &str = "/offline.html";

/// Static paths cached up front
pub const PRECACHE_PATHS: &[&str] = &[
    "/",
    "/index.html",
    "/manifest.json",
    OFFLINE_PAGE,
    "/favicon.ico",
];

const ASSET_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "svg", "webp", "ico", "css", "js", "mjs", "woff", "woff2",
    "ttf", "otf",
];

// == Partitions ==
/// Named cache partitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CachePartition {
    Static,
    Api,
}

impl CachePartition {
    /// Versioned cache name the partition is stored under.
    pub fn name(self) -> &'static str {
        match self {
            CachePartition::Static => "storefront-static-v1",
            CachePartition::Api => "storefront-api-v1",
        }
    }
}

// == Strategies ==
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchStrategy {
    /// Try the network, fall back to the cached response
    NetworkFirst,
    /// Serve from cache, fetch on miss
    CacheFirst,
    /// Serve from cache, then network, then the offline page
    CacheFirstWithOfflineFallback,
    /// Never cached
    NetworkOnly,
}

/// Request destination, as reported by the fetch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Image,
    Style,
    Script,
    Font,
    Document,
    #[serde(other)]
    Other,
}

/// Request mode, as reported by the fetch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    NoCors,
    Cors,
    #[serde(other)]
    Other,
}

/// Outcome of routing one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RouteDecision {
    pub strategy: FetchStrategy,
    /// `None` for requests that are never cached
    pub partition: Option<CachePartition>,
}

// == Route ==
/// Picks the strategy for a request.
///
/// API paths win over everything else, then navigations, then static assets
/// by destination or file extension.
pub fn route(path: &str, destination: Option<Destination>, mode: Option<RequestMode>) -> RouteDecision {
    if path.starts_with(API_PREFIX) {
        return RouteDecision {
            strategy: FetchStrategy::NetworkFirst,
            partition: Some(CachePartition::Api),
        };
    }

    if mode == Some(RequestMode::Navigate) {
        return RouteDecision {
            strategy: FetchStrategy::CacheFirstWithOfflineFallback,
            partition: Some(CachePartition::Static),
        };
    }

    let static_destination = matches!(
        destination,
        Some(Destination::Image | Destination::Style | Destination::Script | Destination::Font)
    );
    if static_destination || has_asset_extension(path) {
        return RouteDecision {
            strategy: FetchStrategy::CacheFirst,
            partition: Some(CachePartition::Static),
        };
    }

    RouteDecision {
        strategy: FetchStrategy::NetworkOnly,
        partition: None,
    }
}

fn has_asset_extension(path: &str) -> bool {
    let path = path.split(['?', '#']).next().unwrap_or(path);
    let file = path.rsplit('/').next().unwrap_or(path);
    file.rsplit_once('.')
        .map(|(_, ext)| ASSET_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

// == Control Messages ==
/// Messages a page sends to the worker.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ControlMessage {
    SkipWaiting,
    CacheProduct { product_id: String, data: Value },
    ClearCache,
}

impl ControlMessage {
    /// Cache key a product is stored under.
    pub fn product_key(product_id: &str) -> String {
        format!("product:{}", product_id)
    }
}
