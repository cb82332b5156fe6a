//! API Module
//!
//! HTTP handlers and routing for the cache server REST API.
//!
//! # Endpoints
//! - `PUT /set` - Store a value with optional TTL and tags
//! - `GET /get/:key` - Retrieve a value by key
//! - `DELETE /del/:key` - Delete a key
//! - `DELETE /tags/:tag` - Invalidate by tag
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint
//! - `POST /route` - Fetch strategy decision
//! - `GET /precache` - Precached static paths
//! - `POST /control` - Worker control messages

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
