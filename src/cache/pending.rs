//! Pending Request Table
//!
//! Tracks in-flight fetch operations so concurrent callers asking for the
//! same key share one underlying operation instead of issuing duplicates.
//!
//! At most one in-flight handle exists per key. The first caller for a key
//! becomes the leader and runs the operation; everyone else subscribes to the
//! leader's settlement. The slot is cleared when the operation settles,
//! success or failure, so the next call after a failure retries fresh.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::Value;
use tokio::sync::broadcast;
use tracing::debug;

use crate::error::RelayError;

/// Outcome of a fetch operation, fanned out to every coalesced waiter.
pub type FetchOutcome = std::result::Result<Value, RelayError>;

type PendingMap = HashMap<String, broadcast::Sender<FetchOutcome>>;

// == Pending Requests ==
/// Mapping from request key to an in-flight, shareable settlement handle.
#[derive(Debug, Default)]
pub struct PendingRequests {
    inner: Arc<Mutex<PendingMap>>,
}

/// Result of asking the table about a key: either this caller leads the
/// operation, or it waits on an existing one.
pub enum Registration {
    /// No operation in flight; the caller must run it and settle the guard
    Leader(LeaderGuard),
    /// An operation is already in flight; await its settlement
    Waiter(broadcast::Receiver<FetchOutcome>),
}

impl PendingRequests {
    // == Constructor ==
    /// Creates an empty pending-request table.
    pub fn new() -> Self {
        Self::default()
    }

    // == Join Or Register ==
    /// Atomically checks for an in-flight operation under `key`.
    ///
    /// The check and the registration happen under one lock acquisition, so
    /// two callers racing on the same key can never both become leader.
    pub fn join_or_register(&self, key: &str) -> Registration {
        let mut map = self.lock();
        if let Some(sender) = map.get(key) {
            debug!(key, "joining in-flight request");
            return Registration::Waiter(sender.subscribe());
        }

        // Single settlement per handle, so capacity 1 is sufficient
        let (sender, _initial_rx) = broadcast::channel(1);
        map.insert(key.to_string(), sender.clone());

        Registration::Leader(LeaderGuard {
            key: key.to_string(),
            sender,
            table: Arc::clone(&self.inner),
            settled: false,
        })
    }

    // == In Flight ==
    /// Returns the number of keys with an operation currently in flight.
    pub fn in_flight(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if an operation is in flight for `key`.
    pub fn contains(&self, key: &str) -> bool {
        self.lock().contains_key(key)
    }

    // The map is only ever held for short synchronous sections, so a
    // poisoned lock just means a panic mid-insert; the map itself is still
    // structurally sound.
    fn lock(&self) -> MutexGuard<'_, PendingMap> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// == Leader Guard ==
/// RAII handle held by the caller that owns the in-flight operation.
///
/// Settling the guard clears the table slot and fans the outcome out to all
/// waiters. If the leader future is dropped before settling (e.g. the HTTP
/// client disconnected), the guard still clears the slot on drop and the
/// closed channel tells waiters the request was abandoned, so a key can
/// never be wedged by a vanished leader.
#[derive(Debug)]
pub struct LeaderGuard {
    key: String,
    sender: broadcast::Sender<FetchOutcome>,
    table: Arc<Mutex<PendingMap>>,
    settled: bool,
}

impl LeaderGuard {
    /// Clears the pending slot and delivers the outcome to every waiter.
    pub fn settle(mut self, outcome: FetchOutcome) {
        self.clear_slot();
        self.settled = true;
        // No waiters is fine; the leader already has the outcome
        let _ = self.sender.send(outcome);
    }

    fn clear_slot(&self) {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}

impl Drop for LeaderGuard {
    fn drop(&mut self) {
        if !self.settled {
            debug!(key = %self.key, "in-flight request abandoned before settling");
            self.clear_slot();
        }
    }
}

/// Maps a waiter's receive result to the operation outcome.
///
/// A closed channel means the leader vanished without settling; surfaced as
/// an operation failure so the caller can retry fresh.
pub fn await_outcome_error() -> RelayError {
    RelayError::Operation("request abandoned before completion".to_string())
}
