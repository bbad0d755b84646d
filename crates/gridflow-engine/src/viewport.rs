//! Viewport handling: visible range computation and lazy row materialization.

use tracing::debug;

use gridflow_core::{ViewportState, VisibleRange};

use crate::engine::{CellSnapshot, GridEngine};

impl GridEngine {
    /// Handle a scroll or resize.
    ///
    /// Rows entering the visible range (buffers included) that the populator
    /// has not reached yet are written and evaluated before this returns, so
    /// reads of the returned range never see `Pending`.
    pub fn set_viewport(&mut self, scroll_offset: f64, viewport_height: f64) -> Option<VisibleRange> {
        self.viewport.scroll_to(scroll_offset);
        self.viewport.set_viewport_height(viewport_height);

        let range = self.viewport.visible_range(
            self.config.total_rows,
            self.config.leading_buffer,
            self.config.trailing_buffer,
        );

        if let Some(range) = range {
            let mut written = 0;
            for row in range.rows() {
                written += self.materialize_row(row);
            }
            if written > 0 {
                debug!(
                    start_row = range.start_row,
                    end_row = range.end_row,
                    cells = written,
                    "materialized rows entering viewport"
                );
            }
        }

        self.visible = range;
        range
    }

    pub fn viewport(&self) -> &ViewportState {
        &self.viewport
    }

    /// Range computed by the last [`GridEngine::set_viewport`] call
    pub fn visible_range(&self) -> Option<VisibleRange> {
        self.visible
    }

    /// Snapshots of every written cell in the visible range, row-major.
    ///
    /// Visible rows are materialized by [`GridEngine::set_viewport`], so the
    /// store alone holds everything there is to show.
    pub fn read_visible(&self) -> Vec<CellSnapshot> {
        let Some(range) = self.visible else {
            return Vec::new();
        };

        self.store
            .records_in_rows(range.start_row, range.end_row)
            .into_iter()
            .map(|(coord, _)| self.read(coord))
            .collect()
    }
}
