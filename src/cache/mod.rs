//! Cache Module
//!
//! Provides a TTL response cache with in-flight request coalescing.

mod entry;
mod pending;
mod persist;
mod relay;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use pending::{FetchOutcome, PendingRequests};
pub use persist::{load_snapshot, save_snapshot};
pub use relay::{CachePolicy, ResponseCache};
pub use stats::CacheStats;
pub use store::TtlStore;

// == Public Constants ==
/// Maximum allowed key length in bytes (keys are typically request URLs)
pub const MAX_KEY_LENGTH: usize = 2048;

/// Maximum allowed payload size in serialized bytes
pub const MAX_VALUE_SIZE: usize = 4 * 1024 * 1024; // 4 MB
