//! TTL Store Module
//!
//! Keyed response storage with per-entry TTL expiration. Stale entries are
//! treated as absent and purged on the access that discovers them.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::cache::{CacheEntry, CacheStats, MAX_KEY_LENGTH, MAX_VALUE_SIZE};
use crate::error::{RelayError, Result};

// == TTL Store ==
/// Main cache storage with TTL expiration.
#[derive(Debug)]
pub struct TtlStore {
    /// Key-value storage
    entries: HashMap<String, CacheEntry>,
    /// Performance statistics
    stats: CacheStats,
    /// Default TTL for entries inserted without an explicit TTL
    default_ttl: Duration,
}

impl TtlStore {
    // == Constructor ==
    /// Creates a new TtlStore.
    ///
    /// # Arguments
    /// * `default_ttl` - TTL applied to entries inserted without an explicit TTL
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            stats: CacheStats::new(),
            default_ttl,
        }
    }

    // == Put ==
    /// Stores a payload under a key with optional TTL.
    ///
    /// Overwrite is always legal: if the key already exists, the payload is
    /// replaced and the TTL restarts.
    ///
    /// # Arguments
    /// * `key` - The key to store under
    /// * `value` - The payload to store
    /// * `ttl` - Optional TTL (uses the default when None)
    pub fn put(&mut self, key: String, value: Value, ttl: Option<Duration>) -> Result<()> {
        if key.is_empty() {
            return Err(RelayError::InvalidRequest("Key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(RelayError::InvalidRequest(format!(
                "Key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }

        // Size check against the serialized form, since that is what a
        // snapshot would write out
        let serialized_len = serde_json::to_string(&value)
            .map_err(|e| RelayError::Internal(format!("Unserializable payload: {}", e)))?
            .len();
        if serialized_len > MAX_VALUE_SIZE {
            return Err(RelayError::InvalidRequest(format!(
                "Payload exceeds maximum size of {} bytes",
                MAX_VALUE_SIZE
            )));
        }

        let effective_ttl = ttl.unwrap_or(self.default_ttl);
        let entry = CacheEntry::new(value, effective_ttl.as_millis() as u64);
        self.entries.insert(key, entry);

        self.stats.set_total_entries(self.entries.len());

        Ok(())
    }

    // == Get ==
    /// Retrieves a payload by key.
    ///
    /// Returns `None` for absent keys and for stale entries; a stale entry is
    /// purged as a side effect, so the subsequent lookup is also absent.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    pub fn get(&mut self, key: &str) -> Option<Value> {
        match self.entries.get(key) {
            Some(entry) if entry.is_stale() => {
                self.entries.remove(key);
                self.stats.set_total_entries(self.entries.len());
                self.stats.record_expiration();
                self.stats.record_miss();
                None
            }
            Some(entry) => {
                let value = entry.data.clone();
                self.stats.record_hit();
                Some(value)
            }
            None => {
                self.stats.record_miss();
                None
            }
        }
    }

    // == Remove ==
    /// Removes an entry by key. Returns true if an entry was present.
    ///
    /// # Arguments
    /// * `key` - The key to remove
    pub fn remove(&mut self, key: &str) -> bool {
        let removed = self.entries.remove(key).is_some();
        if removed {
            self.stats.set_total_entries(self.entries.len());
        }
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Record Coalesced ==
    /// Records that a caller joined an in-flight request instead of issuing
    /// its own.
    pub fn record_coalesced(&mut self) {
        self.stats.record_coalesced();
    }

    // == Cleanup Expired ==
    /// Removes all stale entries from the store.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let stale_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_stale())
            .map(|(key, _)| key.clone())
            .collect();

        let count = stale_keys.len();

        for key in stale_keys {
            self.entries.remove(&key);
            self.stats.record_expiration();
        }

        self.stats.set_total_entries(self.entries.len());
        count
    }

    // == Snapshot Access ==
    /// Returns a clone of all non-stale entries, for snapshotting.
    pub fn export_entries(&self) -> HashMap<String, CacheEntry> {
        self.entries
            .iter()
            .filter(|(_, entry)| !entry.is_stale())
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect()
    }

    /// Replaces the store contents with previously snapshotted entries.
    ///
    /// Stale entries are accepted here; they are purged lazily on access,
    /// exactly as if the process had never restarted.
    pub fn restore_entries(&mut self, entries: HashMap<String, CacheEntry>) {
        self.entries = entries;
        self.stats.set_total_entries(self.entries.len());
    }

    // == Length ==
    /// Returns the current number of entries in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
