//! Window Computation Module
//!
//! The windowing arithmetic as a pure function: which contiguous slice of
//! rows is visible for a given scroll position, and how far the rendered
//! block must be translated so it lines up with the true scroll position.

// == Row Window ==
/// A half-open row range `[start, end)` plus its vertical pixel offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowWindow {
    /// Index of the first rendered row
    pub start: usize,
    /// One past the last rendered row
    pub end: usize,
    /// Vertical translation in pixels (`start * row_height`)
    pub offset_px: u64,
}

impl RowWindow {
    /// Number of rows inside the window.
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    /// Returns true if the window contains no rows.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

// == Compute Window ==
/// Computes the visible row window for a scroll position.
///
/// `start = floor(scroll_offset / row_height)` clamped to `[0, row_count]`;
/// the window spans `ceil(viewport_height / row_height)` visible rows plus
/// `buffer_rows`, clipped so `end` never exceeds `row_count`.
///
/// Invariant: `0 <= start <= end <= row_count`. An empty row set yields an
/// empty window; an overscrolled offset clamps rather than slicing out of
/// range.
///
/// # Arguments
/// * `row_count` - Total number of rows
/// * `row_height` - Uniform row height in pixels, must be non-zero
/// * `viewport_height` - Visible container height in pixels
/// * `scroll_offset` - Current scroll position in pixels
/// * `buffer_rows` - Extra rows rendered past the viewport
pub fn compute_window(
    row_count: usize,
    row_height: u32,
    viewport_height: u32,
    scroll_offset: u64,
    buffer_rows: u32,
) -> RowWindow {
    debug_assert!(row_height > 0, "row_height must be non-zero");

    let start = ((scroll_offset / row_height as u64) as usize).min(row_count);
    let visible = viewport_height.div_ceil(row_height) + buffer_rows;
    let end = start.saturating_add(visible as usize).min(row_count);

    RowWindow {
        start,
        end,
        offset_px: start as u64 * row_height as u64,
    }
}
