//! Request DTOs for the relay API
//!
//! Defines the structure of incoming HTTP request parameters and bodies.

use serde::Deserialize;

/// Query parameters for the cached fetch operation (GET /fetch)
///
/// # Fields
/// - `url`: The upstream URL to relay to
/// - `ttl`: Optional TTL override in milliseconds for the cached response
#[derive(Debug, Clone, Deserialize)]
pub struct FetchParams {
    /// The upstream URL
    pub url: String,
    /// Optional TTL override in milliseconds
    #[serde(default)]
    pub ttl: Option<u64>,
}

impl FetchParams {
    /// Validates the request parameters
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.url.is_empty() {
            return Some("URL cannot be empty".to_string());
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Some("URL must be http or https".to_string());
        }
        None
    }
}

/// Request body for the mutating relay operation (POST /fetch)
///
/// Mutating calls bypass the cache entirely; they are still coalesced by
/// URL while in flight.
#[derive(Debug, Clone, Deserialize)]
pub struct MutateRequest {
    /// The upstream URL
    pub url: String,
    /// JSON body forwarded upstream
    #[serde(default)]
    pub body: Option<serde_json::Value>,
}

impl MutateRequest {
    /// Validates the request data
    pub fn validate(&self) -> Option<String> {
        if self.url.is_empty() {
            return Some("URL cannot be empty".to_string());
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Some("URL must be http or https".to_string());
        }
        None
    }
}

/// Query parameters for cache invalidation (DELETE /cache)
#[derive(Debug, Clone, Deserialize)]
pub struct InvalidateParams {
    /// The upstream URL whose cached response should be dropped
    pub url: String,
}
