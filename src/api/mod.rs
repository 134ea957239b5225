//! API Module
//!
//! HTTP handlers and routing for the relay REST API.
//!
//! # Endpoints
//! - `GET /fetch?url=` - Relay a GET through the cache (coalesced, cached)
//! - `POST /fetch` - Relay a mutating call (coalesced, never cached)
//! - `DELETE /cache?url=` - Invalidate a cached response
//! - `GET /stats` - Get cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
