use serde::{Deserialize, Serialize};

/// Default row height in pixels
pub const DEFAULT_ROW_HEIGHT: f64 = 24.0;

/// Inclusive band of rows the presentation layer should render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisibleRange {
    pub start_row: u32,
    pub end_row: u32,
}

impl VisibleRange {
    pub fn new(start_row: u32, end_row: u32) -> Self {
        Self { start_row, end_row }
    }

    pub fn contains(&self, row: u32) -> bool {
        row >= self.start_row && row <= self.end_row
    }

    pub fn row_count(&self) -> u32 {
        self.end_row.saturating_sub(self.start_row) + 1
    }

    pub fn rows(&self) -> std::ops::RangeInclusive<u32> {
        self.start_row..=self.end_row
    }
}

/// Scroll position and container size, in pixels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewportState {
    scroll_offset: f64,
    row_height: f64,
    viewport_height: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self::new(DEFAULT_ROW_HEIGHT, 20.0 * DEFAULT_ROW_HEIGHT)
    }
}

impl ViewportState {
    pub fn new(row_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_offset: 0.0,
            row_height,
            viewport_height,
        }
    }

    pub fn scroll_offset(&self) -> f64 {
        self.scroll_offset
    }

    pub fn row_height(&self) -> f64 {
        self.row_height
    }

    pub fn viewport_height(&self) -> f64 {
        self.viewport_height
    }

    /// Scroll to an absolute pixel offset; negative and NaN offsets clamp to 0
    pub fn scroll_to(&mut self, offset: f64) {
        self.scroll_offset = if offset.is_nan() { 0.0 } else { offset.max(0.0) };
    }

    pub fn set_viewport_height(&mut self, height: f64) {
        self.viewport_height = if height.is_nan() { 0.0 } else { height.max(0.0) };
    }

    /// First row whose top edge is at or above the scroll offset
    pub fn first_visible_row(&self) -> u64 {
        if self.row_height <= 0.0 {
            return 0;
        }
        (self.scroll_offset / self.row_height).floor() as u64
    }

    /// Number of rows the container can show
    pub fn rows_per_page(&self) -> u64 {
        if self.row_height <= 0.0 {
            return 0;
        }
        (self.viewport_height / self.row_height).ceil() as u64
    }

    /// Visible rows plus lookahead buffers, clamped to the grid.
    ///
    /// `start = max(0, floor(offset / height) - leading)` and
    /// `end = min(total - 1, start + ceil(viewport / height) + trailing)`.
    /// Returns `None` for an empty grid.
    pub fn visible_range(
        &self,
        total_rows: u32,
        leading_buffer: u32,
        trailing_buffer: u32,
    ) -> Option<VisibleRange> {
        if total_rows == 0 {
            return None;
        }
        let last_row = u64::from(total_rows - 1);

        let start = self
            .first_visible_row()
            .saturating_sub(u64::from(leading_buffer))
            .min(last_row);
        let end = start
            .saturating_add(self.rows_per_page())
            .saturating_add(u64::from(trailing_buffer))
            .min(last_row);

        Some(VisibleRange::new(start as u32, end as u32))
    }
}
