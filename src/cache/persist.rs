//! Snapshot Persistence Module
//!
//! Serializes the cache contents to a JSON file so entries survive a process
//! restart. Each entry keeps the `{ "data": ..., "timestamp": ms, "ttl": ms }`
//! shape, and restored entries still honor the TTL check on next access.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::cache::CacheEntry;
use crate::error::{RelayError, Result};

// == Save ==
/// Writes the given entries to `path` as a JSON object keyed by cache key.
///
/// # Arguments
/// * `path` - Destination file; parent directories must exist
/// * `entries` - Entries to persist
pub fn save_snapshot(path: &Path, entries: &HashMap<String, CacheEntry>) -> Result<()> {
    let json = serde_json::to_string_pretty(entries)
        .map_err(|e| RelayError::Persistence(format!("Snapshot serialization failed: {}", e)))?;

    fs::write(path, json)
        .map_err(|e| RelayError::Persistence(format!("Snapshot write failed: {}", e)))?;

    debug!(path = %path.display(), entries = entries.len(), "snapshot written");
    Ok(())
}

// == Load ==
/// Reads a snapshot written by [`save_snapshot`].
///
/// A missing file is a normal cold start and yields an empty map; a present
/// but unreadable or malformed file is an error.
pub fn load_snapshot(path: &Path) -> Result<HashMap<String, CacheEntry>> {
    if !path.exists() {
        debug!(path = %path.display(), "no snapshot file, starting empty");
        return Ok(HashMap::new());
    }

    let json = fs::read_to_string(path)
        .map_err(|e| RelayError::Persistence(format!("Snapshot read failed: {}", e)))?;

    serde_json::from_str(&json)
        .map_err(|e| RelayError::Persistence(format!("Snapshot parse failed: {}", e)))
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut entries = HashMap::new();
        entries.insert(
            "fetch_/api/employees".to_string(),
            CacheEntry::new(json!([{"id": 1}]), 300_000),
        );
        save_snapshot(&path, &entries).unwrap();

        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded["fetch_/api/employees"].data, json!([{"id": 1}]));
        assert_eq!(loaded["fetch_/api/employees"].ttl, 300_000);
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("never_written.json");

        let loaded = load_snapshot(&path).unwrap();
        assert!(loaded.is_empty());
    }

    #[test]
    fn test_load_malformed_file_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");
        fs::write(&path, "not json at all").unwrap();

        let result = load_snapshot(&path);
        assert!(matches!(result, Err(RelayError::Persistence(_))));
    }

    #[test]
    fn test_restored_entry_keeps_timestamp() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cache.json");

        let mut entries = HashMap::new();
        let entry = CacheEntry::new(json!("v"), 300_000);
        let stored_at = entry.stored_at;
        entries.insert("k".to_string(), entry);
        save_snapshot(&path, &entries).unwrap();

        std::thread::sleep(Duration::from_millis(10));

        let loaded = load_snapshot(&path).unwrap();
        // The clock keeps running against the original insertion time
        assert_eq!(loaded["k"].stored_at, stored_at);
        assert!(!loaded["k"].is_stale());
    }
}
