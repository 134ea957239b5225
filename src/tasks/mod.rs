//! Background Tasks Module
//!
//! Contains background tasks that run periodically during relay operation.
//!
//! # Tasks
//! - TTL Cleanup: Removes stale cache entries at configured intervals

mod cleanup;

pub use cleanup::spawn_cleanup_task;
