//! Table Module
//!
//! Headless virtual scrolling for large tables: only the rows inside (or
//! just outside) the visible viewport are handed to the host for rendering.

mod renderer;
mod window;

// Re-export public types
pub use renderer::{RenderWindow, VirtualTableRenderer};
pub use window::{compute_window, RowWindow};

// == Public Constants ==
/// Tables at or below this row count render in full, with no windowing
pub const SMALL_TABLE_THRESHOLD: usize = 50;

/// Extra rows rendered past the visible viewport to smooth scrolling
pub const DEFAULT_BUFFER_ROWS: u32 = 2;
