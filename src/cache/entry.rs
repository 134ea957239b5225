//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// == Cache Entry ==
/// Represents a single cached response with its freshness metadata.
///
/// Timestamps are wall-clock Unix milliseconds so a snapshot written to disk
/// still honors the TTL check after a process restart. The serialized shape
/// is `{ "data": ..., "timestamp": ms, "ttl": ms }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// The cached payload, opaque to the cache
    pub data: Value,
    /// Insertion timestamp (Unix milliseconds)
    #[serde(rename = "timestamp")]
    pub stored_at: i64,
    /// Time-to-live in milliseconds
    pub ttl: u64,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry stamped with the current wall-clock time.
    ///
    /// # Arguments
    /// * `data` - The payload to cache
    /// * `ttl_ms` - TTL in milliseconds
    pub fn new(data: Value, ttl_ms: u64) -> Self {
        Self {
            data,
            stored_at: current_timestamp_ms(),
            ttl: ttl_ms,
        }
    }

    // == Is Stale ==
    /// Checks whether the entry's TTL has elapsed.
    ///
    /// An entry is readable only while `now - stored_at <= ttl`; past that
    /// point it is treated as absent and purged on next access.
    pub fn is_stale(&self) -> bool {
        let age = current_timestamp_ms().saturating_sub(self.stored_at);
        age > self.ttl as i64
    }

    // == Time To Live ==
    /// Returns remaining TTL in milliseconds, 0 if already stale.
    pub fn ttl_remaining_ms(&self) -> u64 {
        let expires_at = self.stored_at + self.ttl as i64;
        let now = current_timestamp_ms();
        if expires_at > now {
            (expires_at - now) as u64
        } else {
            0
        }
    }
}

// == Utility Functions ==
/// Returns current Unix timestamp in milliseconds.
pub fn current_timestamp_ms() -> i64 {
    Utc::now().timestamp_millis()
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;
    use std::time::Duration;

    #[test]
    fn test_entry_creation() {
        let entry = CacheEntry::new(json!({"rows": [1, 2, 3]}), 60_000);

        assert_eq!(entry.data, json!({"rows": [1, 2, 3]}));
        assert_eq!(entry.ttl, 60_000);
        assert!(!entry.is_stale());
    }

    #[test]
    fn test_entry_staleness() {
        let entry = CacheEntry::new(json!("payload"), 30);

        assert!(!entry.is_stale());

        sleep(Duration::from_millis(60));

        assert!(entry.is_stale());
    }

    #[test]
    fn test_ttl_remaining() {
        let entry = CacheEntry::new(json!(1), 10_000);

        let remaining = entry.ttl_remaining_ms();
        assert!(remaining <= 10_000);
        assert!(remaining >= 9_000);
    }

    #[test]
    fn test_ttl_remaining_stale() {
        let entry = CacheEntry::new(json!(1), 10);

        sleep(Duration::from_millis(30));

        assert_eq!(entry.ttl_remaining_ms(), 0);
    }

    #[test]
    fn test_serialized_shape() {
        let entry = CacheEntry::new(json!({"id": 7}), 5000);
        let value = serde_json::to_value(&entry).unwrap();

        assert!(value.get("data").is_some());
        assert!(value.get("timestamp").is_some());
        assert!(value.get("ttl").is_some());
        assert_eq!(value["ttl"], json!(5000));
    }

    #[test]
    fn test_deserialize_snapshot_shape() {
        let json = r#"{"data": {"name": "leave"}, "timestamp": 1700000000000, "ttl": 300000}"#;
        let entry: CacheEntry = serde_json::from_str(json).unwrap();

        assert_eq!(entry.stored_at, 1_700_000_000_000);
        assert_eq!(entry.ttl, 300_000);
        // An entry stamped in 2023 is long past its 5 minute TTL
        assert!(entry.is_stale());
    }
}
