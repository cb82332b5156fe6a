//! Request and Response models for the cache server API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{RouteRequest, SetRequest};
pub use responses::{
    ControlResponse, DeleteResponse, ErrorResponse, GetResponse, HealthResponse,
    InvalidateResponse, PrecacheResponse, RouteResponse, SetResponse, StatsResponse,
};
