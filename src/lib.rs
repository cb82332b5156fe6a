//! Storefront Cache - A tagged, size-bounded TTL cache
//!
//! Evicts soonest-expiring entries when over capacity, invalidates by tag,
//! and snapshots itself so a new session can rehydrate.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod routing;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use tasks::spawn_cleanup_task;
