//! Response Cache Module
//!
//! Combines the TTL store with the pending-request table into the composite
//! `fetch_deduplicated` operation callers use: fresh cache entries are served
//! directly, concurrent requests for the same key share one in-flight
//! operation, and successful cacheable results are stored for next time.

use std::collections::HashMap;
use std::future::Future;
use std::path::Path;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use crate::cache::pending::{await_outcome_error, PendingRequests, Registration};
use crate::cache::{persist, CacheEntry, CacheStats, TtlStore};
use crate::config::Config;
use crate::error::Result;

// == Cache Policy ==
/// Whether a request's result may be served from and stored into the cache.
///
/// Mutating calls must use `Bypass`: they never read the cache and their
/// results are never stored. Coalescing applies either way, keyed by the
/// request key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Idempotent request; cache reads and writes are allowed
    Cacheable,
    /// State-changing request; skip the cache entirely
    Bypass,
}

// == Response Cache ==
/// TTL response cache with in-flight request coalescing.
///
/// Constructed once at application start and shared by reference; the store
/// and the pending table are both instance fields, not ambient globals.
#[derive(Debug)]
pub struct ResponseCache {
    store: RwLock<TtlStore>,
    pending: PendingRequests,
}

impl ResponseCache {
    // == Constructor ==
    /// Creates a new ResponseCache.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied to entries stored without an explicit TTL
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            store: RwLock::new(TtlStore::new(default_ttl)),
            pending: PendingRequests::new(),
        }
    }

    /// Creates a new ResponseCache from configuration.
    pub fn from_config(config: &Config) -> Self {
        Self::new(Duration::from_millis(config.default_ttl_ms))
    }

    // == Get ==
    /// Returns the cached payload for `key` if present and not stale.
    ///
    /// A stale entry is purged as a side effect and reported as absent.
    pub async fn get(&self, key: &str) -> Option<Value> {
        self.store.write().await.get(key)
    }

    // == Put ==
    /// Stores a payload under `key`, overwriting any previous entry.
    ///
    /// # Arguments
    /// * `key` - The key to store under
    /// * `value` - The payload to store
    /// * `ttl` - Optional TTL (uses the configured default when None)
    pub async fn put(&self, key: &str, value: Value, ttl: Option<Duration>) -> Result<()> {
        self.store.write().await.put(key.to_string(), value, ttl)
    }

    // == Invalidate ==
    /// Removes an entry by key. Returns true if an entry was present.
    pub async fn invalidate(&self, key: &str) -> bool {
        self.store.write().await.remove(key)
    }

    // == Fetch Deduplicated ==
    /// Fetches the payload for `key`, deduplicating concurrent requests.
    ///
    /// 1. Under `CachePolicy::Cacheable`, a fresh cache entry is returned
    ///    immediately without invoking `operation`.
    /// 2. Otherwise, if an operation for `key` is already in flight, this
    ///    caller awaits that operation's settlement instead of starting a
    ///    duplicate.
    /// 3. Otherwise this caller leads: `operation` runs, its outcome is
    ///    fanned out to every waiter, the pending slot is cleared, and a
    ///    successful cacheable result is stored.
    ///
    /// Failures propagate to all waiters and are never cached; the next call
    /// for the key starts a fresh operation.
    ///
    /// # Arguments
    /// * `key` - Request identity; requests with equal keys coalesce
    /// * `policy` - Whether the cache may serve and store this request
    /// * `ttl` - Optional TTL override for a stored result
    /// * `operation` - The underlying fetch, invoked at most once per flight
    pub async fn fetch_deduplicated<F, Fut>(
        &self,
        key: &str,
        policy: CachePolicy,
        ttl: Option<Duration>,
        operation: F,
    ) -> Result<Value>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if policy == CachePolicy::Cacheable {
            if let Some(value) = self.get(key).await {
                debug!(key, "served from cache");
                return Ok(value);
            }
        }

        match self.pending.join_or_register(key) {
            Registration::Waiter(mut rx) => {
                self.store.write().await.record_coalesced();
                match rx.recv().await {
                    Ok(outcome) => outcome,
                    Err(_) => Err(await_outcome_error()),
                }
            }
            Registration::Leader(guard) => {
                let outcome = operation().await;

                if policy == CachePolicy::Cacheable {
                    if let Ok(value) = &outcome {
                        // A payload the store refuses (e.g. oversized) is
                        // still a successful fetch; only caching is skipped
                        if let Err(e) = self.put(key, value.clone(), ttl).await {
                            warn!(key, error = %e, "result not cached");
                        }
                    }
                }

                guard.settle(outcome.clone());
                outcome
            }
        }
    }

    // == Cleanup Expired ==
    /// Removes all stale entries. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        self.store.write().await.cleanup_expired()
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub async fn stats(&self) -> CacheStats {
        self.store.read().await.stats()
    }

    /// Returns the number of keys with an operation currently in flight.
    pub fn in_flight(&self) -> usize {
        self.pending.in_flight()
    }

    /// Returns the current number of cached entries.
    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }

    /// Returns true if the cache holds no entries.
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.is_empty()
    }

    // == Persistence ==
    /// Writes all non-stale entries to a JSON snapshot file.
    pub async fn save_snapshot(&self, path: &Path) -> Result<()> {
        let entries = self.store.read().await.export_entries();
        persist::save_snapshot(path, &entries)
    }

    /// Replaces the cache contents with a previously written snapshot.
    ///
    /// A missing file restores an empty cache. Restored entries keep their
    /// original timestamps, so the TTL check still applies on next access.
    pub async fn load_snapshot(&self, path: &Path) -> Result<usize> {
        let entries: HashMap<String, CacheEntry> = persist::load_snapshot(path)?;
        let count = entries.len();
        self.store.write().await.restore_entries(entries);
        Ok(count)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RelayError;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn test_cache() -> ResponseCache {
        ResponseCache::new(Duration::from_secs(300))
    }

    #[tokio::test]
    async fn test_put_then_get() {
        let cache = test_cache();

        cache.put("k1", json!({"a": 1}), None).await.unwrap();
        assert_eq!(cache.get("k1").await, Some(json!({"a": 1})));
    }

    #[tokio::test]
    async fn test_fetch_populates_cache() {
        let cache = test_cache();
        let calls = Arc::new(AtomicUsize::new(0));

        let calls_op = Arc::clone(&calls);
        let value = cache
            .fetch_deduplicated("k1", CachePolicy::Cacheable, None, move || async move {
                calls_op.fetch_add(1, Ordering::SeqCst);
                Ok(json!("fetched"))
            })
            .await
            .unwrap();

        assert_eq!(value, json!("fetched"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // Second call is served from cache, no second invocation
        let calls_op = Arc::clone(&calls);
        let value = cache
            .fetch_deduplicated("k1", CachePolicy::Cacheable, None, move || async move {
                calls_op.fetch_add(1, Ordering::SeqCst);
                Ok(json!("fetched again"))
            })
            .await
            .unwrap();

        assert_eq!(value, json!("fetched"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_bypass_never_reads_or_stores() {
        let cache = test_cache();
        cache.put("k1", json!("cached"), None).await.unwrap();

        let value = cache
            .fetch_deduplicated("k1", CachePolicy::Bypass, None, || async {
                Ok(json!("mutated"))
            })
            .await
            .unwrap();

        // Bypass ignores the cached value and does not replace it
        assert_eq!(value, json!("mutated"));
        assert_eq!(cache.get("k1").await, Some(json!("cached")));
    }

    #[tokio::test]
    async fn test_concurrent_fetches_coalesce() {
        let cache = Arc::new(test_cache());
        let calls = Arc::new(AtomicUsize::new(0));

        let (a, b) = tokio::join!(
            cache.fetch_deduplicated("k1", CachePolicy::Cacheable, None, {
                let calls = Arc::clone(&calls);
                move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(30)).await;
                    Ok(json!("shared"))
                }
            }),
            cache.fetch_deduplicated("k1", CachePolicy::Cacheable, None, {
                let calls = Arc::clone(&calls);
                move || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(json!("duplicate"))
                }
            }),
        );

        assert_eq!(a.unwrap(), json!("shared"));
        assert_eq!(b.unwrap(), json!("shared"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.stats().await.coalesced, 1);
    }

    #[tokio::test]
    async fn test_failure_propagates_and_is_not_cached() {
        let cache = test_cache();

        let result = cache
            .fetch_deduplicated("k1", CachePolicy::Cacheable, None, || async {
                Err(RelayError::Operation("upstream down".to_string()))
            })
            .await;

        assert!(matches!(result, Err(RelayError::Operation(_))));
        assert!(cache.get("k1").await.is_none());

        // The failed flight is cleared; a later call runs fresh
        let value = cache
            .fetch_deduplicated("k1", CachePolicy::Cacheable, None, || async {
                Ok(json!("recovered"))
            })
            .await
            .unwrap();
        assert_eq!(value, json!("recovered"));
    }

    #[tokio::test]
    async fn test_invalidate() {
        let cache = test_cache();

        cache.put("k1", json!(1), None).await.unwrap();
        assert!(cache.invalidate("k1").await);
        assert!(cache.get("k1").await.is_none());
        assert!(!cache.invalidate("k1").await);
    }

    #[tokio::test]
    async fn test_ttl_override() {
        let cache = test_cache();

        cache
            .fetch_deduplicated(
                "k1",
                CachePolicy::Cacheable,
                Some(Duration::from_millis(30)),
                || async { Ok(json!("short lived")) },
            )
            .await
            .unwrap();

        assert!(cache.get("k1").await.is_some());
        tokio::time::sleep(Duration::from_millis(60)).await;
        assert!(cache.get("k1").await.is_none());
    }
}
