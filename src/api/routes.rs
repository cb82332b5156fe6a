//! API Routes
//!
//! Configures the Axum router with all cache server endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    control_handler, delete_handler, get_handler, health_handler, invalidate_handler,
    precache_handler, route_handler, set_handler, stats_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `PUT /set` - Store a value
/// - `GET /get/:key` - Retrieve a value by key
/// - `DELETE /del/:key` - Delete a key
/// - `DELETE /tags/:tag` - Invalidate every entry carrying a tag
/// - `GET /stats` - Get cache statistics
/// - `GET /health` - Health check endpoint
/// - `POST /route` - Fetch strategy for a request
/// - `GET /precache` - Static paths cached up front
/// - `POST /control` - Worker control message
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(delete_handler))
        .route("/tags/:tag", delete(invalidate_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .route("/route", post(route_handler))
        .route("/precache", get(precache_handler))
        .route("/control", post(control_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
