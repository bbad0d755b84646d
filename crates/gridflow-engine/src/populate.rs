//! Bulk population of template rows in bounded batches.

use std::ops::Range;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use gridflow_core::CellCoord;

use crate::engine::GridEngine;

/// Population progress as seen by the presentation layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "camelCase")]
pub enum LoadingState {
    Idle,
    #[serde(rename_all = "camelCase")]
    Populating { next_row: u32, total_rows: u32 },
    Done,
}

impl LoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadingState::Populating { .. })
    }
}

/// `Idle -> Populating(next_row) -> Done` state machine.
///
/// Hands out one batch of rows at a time; the caller does the writing and
/// reports back with [`BulkPopulator::advance`].
#[derive(Debug, Clone)]
pub struct BulkPopulator {
    state: LoadingState,
    total_rows: u32,
    batch_size: u32,
}

impl BulkPopulator {
    pub fn new(total_rows: u32, batch_size: u32) -> Self {
        Self {
            state: LoadingState::Idle,
            total_rows,
            batch_size: batch_size.max(1),
        }
    }

    pub fn state(&self) -> LoadingState {
        self.state
    }

    /// Begin a pass from row 0. Has no effect while a pass is running.
    pub fn start(&mut self) {
        if self.state.is_loading() {
            return;
        }
        self.state = if self.total_rows == 0 {
            LoadingState::Done
        } else {
            LoadingState::Populating {
                next_row: 0,
                total_rows: self.total_rows,
            }
        };
    }

    /// Rows to write in the next tick, `None` unless populating
    pub fn next_batch(&self) -> Option<Range<u32>> {
        match self.state {
            LoadingState::Populating { next_row, total_rows } => {
                let end = next_row.saturating_add(self.batch_size).min(total_rows);
                Some(next_row..end)
            }
            _ => None,
        }
    }

    /// Record that every row below `next_row` has been written
    pub fn advance(&mut self, next_row: u32) {
        if let LoadingState::Populating { total_rows, .. } = self.state {
            self.state = if next_row >= total_rows {
                LoadingState::Done
            } else {
                LoadingState::Populating { next_row, total_rows }
            };
        }
    }

    /// Fraction of rows handed out so far, in `[0, 1]`
    pub fn progress(&self) -> f64 {
        match self.state {
            LoadingState::Idle => 0.0,
            LoadingState::Populating { next_row, total_rows } => {
                f64::from(next_row) / f64::from(total_rows)
            }
            LoadingState::Done => 1.0,
        }
    }
}

impl GridEngine {
    pub fn loading_state(&self) -> LoadingState {
        self.populator.state()
    }

    pub fn progress(&self) -> f64 {
        self.populator.progress()
    }

    /// Start (or restart) a population pass over the whole grid
    pub fn start_population(&mut self) {
        if self.populator.state().is_loading() {
            return;
        }
        self.populator.start();
        info!(
            total_rows = self.config.total_rows,
            batch_size = self.config.populate_batch_size,
            "population started"
        );
    }

    /// Populate one batch of rows. Returns the rows handled, or `None` once
    /// there is nothing left to do.
    pub fn tick(&mut self) -> Option<Range<u32>> {
        let batch = self.populator.next_batch()?;
        let start = Instant::now();

        let mut written = 0;
        for row in batch.clone() {
            written += self.materialize_row(row);
        }
        self.populator.advance(batch.end);

        debug!(
            rows = ?batch,
            cells = written,
            elapsed_us = start.elapsed().as_micros() as u64,
            "populated batch"
        );
        if self.populator.state() == LoadingState::Done {
            info!(
                cells = self.store.len(),
                materialized_rows = self.materialized_rows(),
                "population finished"
            );
        }

        Some(batch)
    }

    /// Run a whole population pass without yielding. Returns the number of
    /// batches processed.
    pub fn populate_all(&mut self) -> usize {
        self.start_population();
        let mut batches = 0;
        while self.tick().is_some() {
            batches += 1;
        }
        batches
    }

    /// Write and evaluate the template cells of `row` that have no record.
    ///
    /// Existing records (user edits, cells synthesized as precedents) are
    /// never overwritten. Returns the number of cells written.
    pub(crate) fn materialize_row(&mut self, row: u32) -> usize {
        if self.is_materialized(row) {
            return 0;
        }
        if !self.template.has_content(row, self.config.total_cols) {
            self.mark_materialized(row);
            return 0;
        }

        let mut written = 0;
        for col in 0..self.config.total_cols {
            let coord = CellCoord::new(row, col);
            if self.store.contains(coord) {
                if self.store.get_value(coord).is_pending() {
                    self.evaluate_cell(coord);
                }
                continue;
            }
            if let Some(raw) = self.template.raw_input(row, col) {
                self.store.set_raw(coord, raw);
                self.evaluate_cell(coord);
                written += 1;
            }
        }

        self.mark_materialized(row);
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::template::{ChainTemplate, LabelTemplate};
    use gridflow_core::CellValue;

    fn chain_engine(rows: u32, batch: u32) -> GridEngine {
        GridEngine::with_template(
            EngineConfig {
                total_rows: rows,
                total_cols: 4,
                populate_batch_size: batch,
                ..EngineConfig::default()
            },
            ChainTemplate::new("1"),
        )
        .unwrap()
    }

    #[test]
    fn test_state_machine() {
        let mut populator = BulkPopulator::new(10, 4);
        assert_eq!(populator.state(), LoadingState::Idle);
        assert_eq!(populator.next_batch(), None);

        populator.start();
        assert_eq!(populator.next_batch(), Some(0..4));
        populator.advance(4);
        assert_eq!(
            populator.state(),
            LoadingState::Populating {
                next_row: 4,
                total_rows: 10
            }
        );
        assert_eq!(populator.progress(), 0.4);

        populator.advance(8);
        assert_eq!(populator.next_batch(), Some(8..10));
        populator.advance(10);
        assert_eq!(populator.state(), LoadingState::Done);
        assert_eq!(populator.next_batch(), None);
        assert_eq!(populator.progress(), 1.0);
    }

    #[test]
    fn test_start_is_ignored_while_running() {
        let mut populator = BulkPopulator::new(10, 4);
        populator.start();
        populator.advance(4);
        populator.start();
        assert_eq!(populator.next_batch(), Some(4..8));
    }

    #[test]
    fn test_empty_grid_is_done_immediately() {
        let mut populator = BulkPopulator::new(0, 4);
        populator.start();
        assert_eq!(populator.state(), LoadingState::Done);
    }

    #[test]
    fn test_loading_state_serializes() {
        let state = LoadingState::Populating {
            next_row: 3,
            total_rows: 9,
        };
        let json = serde_json::to_value(state).unwrap();
        assert_eq!(json["state"], "populating");
        assert_eq!(json["nextRow"], 3);
        assert_eq!(json["totalRows"], 9);
    }

    #[test]
    fn test_batches_and_pending_reads() {
        let mut engine = chain_engine(10, 4);
        engine.start_population();

        assert_eq!(engine.tick(), Some(0..4));
        assert!(engine.loading_state().is_loading());
        assert_eq!(engine.read(CellCoord::new(3, 1)).value, CellValue::Number(4.0));
        // Not reached yet
        assert_eq!(engine.read(CellCoord::new(7, 1)).value, CellValue::Pending);

        assert_eq!(engine.tick(), Some(4..8));
        assert_eq!(engine.tick(), Some(8..10));
        assert_eq!(engine.tick(), None);
        assert_eq!(engine.loading_state(), LoadingState::Done);
        assert_eq!(engine.read(CellCoord::new(9, 1)).value, CellValue::Number(10.0));
        assert_eq!(engine.materialized_rows(), 10);
    }

    #[test]
    fn test_populator_never_overwrites_edits() {
        let mut engine = chain_engine(10, 3);
        engine.start_population();
        engine.tick();

        // Edit a row the populator has not reached yet
        engine.edit(CellCoord::new(5, 1), "100").unwrap();
        while engine.tick().is_some() {}

        assert_eq!(engine.value(CellCoord::new(5, 1)), &CellValue::Number(100.0));
        assert_eq!(engine.value(CellCoord::new(6, 1)), &CellValue::Number(101.0));
        assert_eq!(engine.value(CellCoord::new(9, 1)), &CellValue::Number(104.0));
    }

    #[test]
    fn test_population_then_edit_cascades() {
        let mut engine = chain_engine(50, 16);
        assert_eq!(engine.populate_all(), 4);

        let report = engine.edit(CellCoord::new(0, 0), "5").unwrap();
        assert_eq!(report.cells_recomputed, 51);
        for row in [0, 10, 49] {
            assert_eq!(
                engine.value(CellCoord::new(row, 1)),
                &CellValue::Number(5.0 * f64::from(row + 1))
            );
        }
    }

    #[test]
    fn test_label_rows() {
        let mut engine = GridEngine::with_template(
            EngineConfig {
                total_rows: 3,
                total_cols: 26,
                ..EngineConfig::default()
            },
            LabelTemplate { cols: 5 },
        )
        .unwrap();
        engine.populate_all();

        assert_eq!(engine.store().len(), 15);
        assert_eq!(
            engine.value(CellCoord::new(2, 4)),
            &CellValue::Text("2-4".to_string())
        );
        assert_eq!(engine.graph().edge_count(), 0);
    }
}
