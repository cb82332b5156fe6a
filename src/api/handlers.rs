//! API Handlers
//!
//! HTTP request handlers for each cache server endpoint.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::cache::{CacheStore, FileSnapshotStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ControlResponse, DeleteResponse, GetResponse, HealthResponse, InvalidateResponse,
    PrecacheResponse, RouteRequest, RouteResponse, SetRequest, SetResponse, StatsResponse,
};
use crate::routing::{self, ControlMessage};

/// Tag attached to products cached through the control channel
pub const PRODUCT_TAG: &str = "product";

/// Application state shared across all handlers.
///
/// Contains the cache store wrapped in Arc<RwLock<>> for thread-safe access.
#[derive(Clone)]
pub struct AppState {
    /// Thread-safe cache store
    pub cache: Arc<RwLock<CacheStore>>,
}

impl AppState {
    /// Creates a new AppState with the given cache store.
    pub fn new(cache: CacheStore) -> Self {
        Self {
            cache: Arc::new(RwLock::new(cache)),
        }
    }

    /// Creates a new AppState from configuration.
    ///
    /// Attaches a file snapshot when `snapshot_path` is set, which also
    /// rehydrates the cache from it.
    pub fn from_config(config: &Config) -> Self {
        let mut cache = CacheStore::new(config.max_size, config.default_ttl());
        if let Some(path) = &config.snapshot_path {
            info!("Persisting cache snapshots to {}", path.display());
            cache = cache.with_snapshot_store(Box::new(FileSnapshotStore::new(path.clone())));
        }
        Self::new(cache)
    }
}

/// Handler for PUT /set
pub async fn set_handler(
    State(state): State<AppState>,
    Json(req): Json<SetRequest>,
) -> Result<Json<SetResponse>> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    // Keys are validated by the store
    let ttl = req.ttl();
    let mut cache = state.cache.write().await;
    let outcome = cache.set(req.key.clone(), req.data, ttl, req.tags)?;

    Ok(Json(SetResponse::new(req.key, outcome)))
}

/// Handler for GET /get/:key
pub async fn get_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<GetResponse>> {
    // Write lock: expired entries are removed and stats updated
    let mut cache = state.cache.write().await;
    let data = cache.get(&key)?;

    Ok(Json(GetResponse::new(key, data)))
}

/// Handler for DELETE /del/:key
pub async fn delete_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<DeleteResponse>> {
    let mut cache = state.cache.write().await;
    if !cache.delete(&key) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(key)))
}

/// Handler for DELETE /tags/:tag
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Json<InvalidateResponse> {
    let mut cache = state.cache.write().await;
    let removed = cache.invalidate_by_tag(&tag);

    Json(InvalidateResponse { tag, removed })
}

/// Handler for GET /stats
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::from(cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

/// Handler for POST /route
pub async fn route_handler(Json(req): Json<RouteRequest>) -> Json<RouteResponse> {
    let decision = routing::route(&req.path, req.destination, req.mode);
    Json(RouteResponse::from(decision))
}

/// Handler for GET /precache
pub async fn precache_handler() -> Json<PrecacheResponse> {
    Json(PrecacheResponse::static_assets())
}

/// Handler for POST /control
///
/// Applies a page-to-worker control message to the cache.
pub async fn control_handler(
    State(state): State<AppState>,
    Json(msg): Json<ControlMessage>,
) -> Result<Json<ControlResponse>> {
    let response = match msg {
        ControlMessage::SkipWaiting => ControlResponse::new("Worker activation acknowledged", 0),
        ControlMessage::CacheProduct { product_id, data } => {
            let key = ControlMessage::product_key(&product_id);
            let mut cache = state.cache.write().await;
            let outcome = cache.set(key, data, None, vec![PRODUCT_TAG.to_string()])?;
            ControlResponse::new(
                format!("Product '{}' cached", product_id),
                usize::from(outcome.stored),
            )
        }
        ControlMessage::ClearCache => {
            let mut cache = state.cache.write().await;
            let removed = cache.clear();
            info!("Cache cleared by control message ({} entries)", removed);
            ControlResponse::new("Cache cleared", removed)
        }
    };

    Ok(Json(response))
}
