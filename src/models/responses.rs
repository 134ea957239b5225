//! Response DTOs for the relay API
//!
//! Defines the structure of outgoing HTTP response bodies. Relayed fetches
//! return the upstream JSON verbatim and have no DTO of their own.

use serde::Serialize;

/// Response body for the invalidate operation (DELETE /cache)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Success message
    pub message: String,
    /// The key that was invalidated
    pub key: String,
    /// Whether an entry was actually present
    pub removed: bool,
}

impl InvalidateResponse {
    /// Creates a new InvalidateResponse
    pub fn new(key: impl Into<String>, removed: bool) -> Self {
        let key = key.into();
        let message = if removed {
            format!("Entry for '{}' invalidated", key)
        } else {
            format!("No entry for '{}'", key)
        };
        Self {
            message,
            key,
            removed,
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Number of fresh cache retrievals
    pub hits: u64,
    /// Number of failed cache retrievals
    pub misses: u64,
    /// Number of entries purged after their TTL elapsed
    pub expirations: u64,
    /// Number of callers that joined an in-flight request
    pub coalesced: u64,
    /// Current number of entries in cache
    pub total_entries: usize,
    /// Number of requests currently in flight
    pub in_flight: usize,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse, computing the hit rate.
    pub fn new(
        hits: u64,
        misses: u64,
        expirations: u64,
        coalesced: u64,
        total_entries: usize,
        in_flight: usize,
    ) -> Self {
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        Self {
            hits,
            misses,
            expirations,
            coalesced,
            total_entries,
            in_flight,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status string
    pub status: String,
}

impl HealthResponse {
    /// Creates a healthy response
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

/// Generic error response body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

impl ErrorResponse {
    /// Creates a new ErrorResponse
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
