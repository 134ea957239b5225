//! Fetch Relay - a caching, deduplicating JSON fetch layer
//!
//! Provides a TTL response cache with request coalescing and a headless
//! virtual-scrolling window calculator for large tables.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod table;
pub mod tasks;

pub use api::AppState;
pub use cache::{CachePolicy, ResponseCache};
pub use config::Config;
pub use table::VirtualTableRenderer;
pub use tasks::spawn_cleanup_task;
