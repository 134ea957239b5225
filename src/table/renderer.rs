//! Virtual Table Renderer Module
//!
//! Stateful wrapper around the window computation. The host feeds scroll
//! positions in and applies the returned slice + translation to its UI; the
//! renderer itself never touches a UI surface.

use crate::error::{RelayError, Result};
use crate::table::{compute_window, RowWindow, DEFAULT_BUFFER_ROWS, SMALL_TABLE_THRESHOLD};

// == Render Window ==
/// One rendering instruction: the rows to show and the vertical translation
/// to apply so they line up with the true scroll position.
#[derive(Debug, PartialEq)]
pub struct RenderWindow<'a, R> {
    /// The rows currently inside the window, in order
    pub rows: &'a [R],
    /// Vertical translation in pixels for the rendered block
    pub offset_px: u64,
}

// == Virtual Table Renderer ==
/// Windowed renderer over an ordered row collection.
///
/// Rows are opaque to the renderer and immutable once handed over. Small
/// tables (at most [`SMALL_TABLE_THRESHOLD`] rows) pass through whole: every
/// row renders, scroll positions are ignored and no windowing applies.
#[derive(Debug)]
pub struct VirtualTableRenderer<R> {
    rows: Vec<R>,
    row_height: u32,
    viewport_height: u32,
    scroll_offset: u64,
    windowed: bool,
}

impl<R> VirtualTableRenderer<R> {
    // == Constructor ==
    /// Creates a renderer over `rows`.
    ///
    /// Fails with a configuration error if `row_height` or `viewport_height`
    /// is zero; both are required for the window arithmetic.
    ///
    /// # Arguments
    /// * `rows` - Ordered row records, uniform height assumed
    /// * `row_height` - Pixel height of every row
    /// * `viewport_height` - Visible height of the scroll container
    pub fn new(rows: Vec<R>, row_height: u32, viewport_height: u32) -> Result<Self> {
        if row_height == 0 {
            return Err(RelayError::Configuration(
                "Row height must be positive".to_string(),
            ));
        }
        if viewport_height == 0 {
            return Err(RelayError::Configuration(
                "Viewport height must be positive".to_string(),
            ));
        }

        let windowed = rows.len() > SMALL_TABLE_THRESHOLD;

        Ok(Self {
            rows,
            row_height,
            viewport_height,
            scroll_offset: 0,
            windowed,
        })
    }

    // == On Scroll ==
    /// Records a new scroll position.
    ///
    /// Ignored for passthrough tables; they never scroll-window.
    pub fn on_scroll(&mut self, scroll_offset: u64) {
        if self.windowed {
            self.scroll_offset = scroll_offset;
        }
    }

    // == Render ==
    /// Produces the rendering instruction for the current scroll position.
    ///
    /// The returned slice is exactly the current window; the host must
    /// replace its previously rendered content with it wholesale, so no
    /// stale rows survive outside the window. Calling `render` twice with no
    /// intervening scroll yields identical output.
    pub fn render(&self) -> RenderWindow<'_, R> {
        let window = self.current_window();
        RenderWindow {
            rows: &self.rows[window.start..window.end],
            offset_px: window.offset_px,
        }
    }

    // == Current Window ==
    /// The row window for the current scroll position.
    ///
    /// Passthrough tables always report the full range at offset zero.
    pub fn current_window(&self) -> RowWindow {
        if !self.windowed {
            return RowWindow {
                start: 0,
                end: self.rows.len(),
                offset_px: 0,
            };
        }

        compute_window(
            self.rows.len(),
            self.row_height,
            self.viewport_height,
            self.scroll_offset,
            DEFAULT_BUFFER_ROWS,
        )
    }

    // == Accessors ==
    /// Returns true if this table is windowed (large table).
    pub fn is_windowed(&self) -> bool {
        self.windowed
    }

    /// Total pixel height of all rows; the host sizes its scroll spacer to
    /// this so the scrollbar reflects the full table.
    pub fn content_height(&self) -> u64 {
        self.rows.len() as u64 * self.row_height as u64
    }

    /// Total number of rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}
