//! API Handlers
//!
//! HTTP request handlers for each relay endpoint. The handlers build the
//! cache key from the upstream URL and hand the actual transport to the
//! response cache as the operation to coalesce.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    Json,
};
use serde_json::Value;
use tracing::debug;

use crate::cache::{CachePolicy, ResponseCache};
use crate::config::Config;
use crate::error::{RelayError, Result};
use crate::models::{
    FetchParams, HealthResponse, InvalidateParams, InvalidateResponse, MutateRequest,
    StatsResponse,
};

/// Application state shared across all handlers.
///
/// The response cache is constructed once at startup and shared by
/// reference; handlers never hold cache state of their own.
#[derive(Clone)]
pub struct AppState {
    /// Shared response cache
    pub cache: Arc<ResponseCache>,
    /// Upstream HTTP client
    pub http: reqwest::Client,
}

impl AppState {
    /// Creates a new AppState around the given cache.
    pub fn new(cache: ResponseCache) -> Self {
        Self {
            cache: Arc::new(cache),
            http: reqwest::Client::new(),
        }
    }

    /// Creates a new AppState from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(ResponseCache::from_config(config))
    }
}

/// Derives the cache key for an upstream URL.
///
/// Keyed by URL only; the mutating path never stores, so GET and POST to
/// the same URL cannot shadow each other in the cache.
pub fn cache_key(url: &str) -> String {
    format!("fetch_{}", url)
}

/// Handler for GET /fetch
///
/// Relays a GET request to the upstream URL through the cache: fresh cached
/// responses are returned without touching the network, concurrent requests
/// for the same URL share one upstream call, and successful responses are
/// cached under the configured or per-request TTL.
pub async fn fetch_handler(
    State(state): State<AppState>,
    Query(params): Query<FetchParams>,
) -> Result<Json<Value>> {
    if let Some(error_msg) = params.validate() {
        return Err(RelayError::InvalidRequest(error_msg));
    }

    let key = cache_key(&params.url);
    let ttl = params.ttl.map(Duration::from_millis);
    let client = state.http.clone();
    let url = params.url.clone();

    let value = state
        .cache
        .fetch_deduplicated(&key, CachePolicy::Cacheable, ttl, move || async move {
            relay_get(&client, &url).await
        })
        .await?;

    Ok(Json(value))
}

/// Handler for POST /fetch
///
/// Relays a mutating call to the upstream URL. The cache is bypassed in
/// both directions; identical in-flight calls still coalesce.
pub async fn mutate_handler(
    State(state): State<AppState>,
    Json(req): Json<MutateRequest>,
) -> Result<Json<Value>> {
    if let Some(error_msg) = req.validate() {
        return Err(RelayError::InvalidRequest(error_msg));
    }

    let key = cache_key(&req.url);
    let client = state.http.clone();
    let url = req.url.clone();
    let body = req.body.clone();

    let value = state
        .cache
        .fetch_deduplicated(&key, CachePolicy::Bypass, None, move || async move {
            relay_post(&client, &url, body).await
        })
        .await?;

    Ok(Json(value))
}

/// Handler for DELETE /cache
///
/// Drops the cached response for an upstream URL.
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Query(params): Query<InvalidateParams>,
) -> Result<Json<InvalidateResponse>> {
    let key = cache_key(&params.url);
    let removed = state.cache.invalidate(&key).await;
    debug!(key = %key, removed, "cache invalidation requested");

    Ok(Json(InvalidateResponse::new(key, removed)))
}

/// Handler for GET /stats
///
/// Returns current cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let stats = state.cache.stats().await;

    Json(StatsResponse::new(
        stats.hits,
        stats.misses,
        stats.expirations,
        stats.coalesced,
        stats.total_entries,
        state.cache.in_flight(),
    ))
}

/// Handler for GET /health
///
/// Returns health status of the relay.
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

// == Transport ==

/// Issues the upstream GET and decodes the JSON body.
async fn relay_get(client: &reqwest::Client, url: &str) -> Result<Value> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|e| RelayError::Operation(format!("Upstream request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RelayError::Operation(format!(
            "Upstream returned {}",
            status
        )));
    }

    response
        .json()
        .await
        .map_err(|e| RelayError::Operation(format!("Upstream body not JSON: {}", e)))
}

/// Issues the upstream POST and decodes the JSON body.
async fn relay_post(client: &reqwest::Client, url: &str, body: Option<Value>) -> Result<Value> {
    let mut request = client.post(url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request
        .send()
        .await
        .map_err(|e| RelayError::Operation(format!("Upstream request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        return Err(RelayError::Operation(format!(
            "Upstream returned {}",
            status
        )));
    }

    response
        .json()
        .await
        .map_err(|e| RelayError::Operation(format!("Upstream body not JSON: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_state() -> AppState {
        AppState::new(ResponseCache::new(Duration::from_secs(300)))
    }

    #[test]
    fn test_cache_key_shape() {
        assert_eq!(
            cache_key("http://localhost:9000/api/employees"),
            "fetch_http://localhost:9000/api/employees"
        );
    }

    #[tokio::test]
    async fn test_fetch_handler_rejects_bad_url() {
        let state = test_state();

        let params = FetchParams {
            url: "not-a-url".to_string(),
            ttl: None,
        };
        let result = fetch_handler(State(state), Query(params)).await;
        assert!(matches!(result, Err(RelayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_fetch_handler_serves_cached_without_upstream() {
        let state = test_state();

        // Pre-populate the cache; no upstream exists at this URL, so any
        // network attempt would fail
        let url = "http://localhost:1/api/employees";
        state
            .cache
            .put(&cache_key(url), json!([{"id": 1}]), None)
            .await
            .unwrap();

        let params = FetchParams {
            url: url.to_string(),
            ttl: None,
        };
        let response = fetch_handler(State(state), Query(params)).await.unwrap();
        assert_eq!(response.0, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn test_mutate_handler_rejects_bad_url() {
        let state = test_state();

        let req = MutateRequest {
            url: String::new(),
            body: None,
        };
        let result = mutate_handler(State(state), Json(req)).await;
        assert!(matches!(result, Err(RelayError::InvalidRequest(_))));
    }

    #[tokio::test]
    async fn test_invalidate_handler() {
        let state = test_state();
        let url = "http://localhost:1/api/employees";

        state
            .cache
            .put(&cache_key(url), json!(1), None)
            .await
            .unwrap();

        let params = InvalidateParams {
            url: url.to_string(),
        };
        let response = invalidate_handler(State(state.clone()), Query(params))
            .await
            .unwrap();
        assert!(response.removed);
        assert!(state.cache.get(&cache_key(url)).await.is_none());
    }

    #[tokio::test]
    async fn test_stats_handler() {
        let state = test_state();

        let response = stats_handler(State(state)).await;
        assert_eq!(response.hits, 0);
        assert_eq!(response.misses, 0);
        assert_eq!(response.in_flight, 0);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.status, "healthy");
    }
}
