//! Recalculation scheduling and reporting.
//!
//! An edit marks the edited cell and everything transitively dependent on
//! it as stale, then walks the dependency graph breadth-first re-running
//! the formula engine on each dependent that is still stale when reached.
//! The walk can run to completion inside [`GridEngine::edit`] or be advanced
//! a batch at a time with [`GridEngine::cascade_step`].

use std::collections::{HashSet, VecDeque};
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info};

use gridflow_core::{CellCoord, GridError};

use crate::engine::{Counters, GridEngine};

/// Report from one edit cascade or full recalculation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecalcReport {
    /// Number of cells whose value was recomputed (edited cell included)
    pub cells_recomputed: u64,
    /// Number of formulas found to sit on a reference cycle
    pub cycles_detected: u64,
    /// Wall time in microseconds
    pub duration_us: u64,
}

impl RecalcReport {
    pub fn had_cycles(&self) -> bool {
        self.cycles_detected > 0
    }

    /// Format as a concise one-line summary for logging
    pub fn summary(&self) -> String {
        format!(
            "{} cells in {}us, cycles={}",
            self.cells_recomputed, self.duration_us, self.cycles_detected
        )
    }
}

/// Breadth-first work left over from one or more edits
#[derive(Debug, Default)]
pub(crate) struct Cascade {
    queue: VecDeque<CellCoord>,
    visited: HashSet<CellCoord>,
}

struct Measure {
    start: Instant,
    counters: Counters,
}

impl GridEngine {
    fn measure(&self) -> Measure {
        Measure {
            start: Instant::now(),
            counters: self.counters,
        }
    }

    fn report_since(&self, measure: Measure) -> RecalcReport {
        RecalcReport {
            cells_recomputed: self.counters.cells_computed - measure.counters.cells_computed,
            cycles_detected: self.counters.cycles_detected - measure.counters.cycles_detected,
            duration_us: measure.start.elapsed().as_micros() as u64,
        }
    }

    /// Write `raw` at `coord` and bring every dependent cell up to date.
    ///
    /// Returns once the whole cascade has been recomputed. Fails without
    /// touching any state if `coord` lies outside the grid.
    pub fn edit(&mut self, coord: CellCoord, raw: &str) -> Result<RecalcReport, GridError> {
        let measure = self.measure();

        self.begin_edit(coord, raw)?;
        self.cascade_step(usize::MAX);

        let report = self.report_since(measure);
        debug!(cell = %coord, report = %report.summary(), "edit recalculated");
        Ok(report)
    }

    /// Write `raw` at `coord`, recompute that cell and queue its dependents.
    ///
    /// Every transitive dependent is marked stale (and reads as `Pending`)
    /// until [`GridEngine::cascade_step`] reaches it. Queued work from an
    /// earlier edit is kept and merged with this one.
    pub fn begin_edit(&mut self, coord: CellCoord, raw: &str) -> Result<(), GridError> {
        self.check_bounds(coord)?;

        self.store.set_raw(coord, raw);
        let affected = self.graph.affected_by(coord);
        self.stale.extend(affected);
        self.evaluate_cell(coord);

        // Cells visited by an earlier cascade may be stale again
        self.cascade.visited.clear();
        self.cascade.visited.insert(coord);
        self.cascade.queue.extend(self.graph.dependents(coord));
        Ok(())
    }

    /// Advance the queued cascade by at most `max_cells` dependents.
    ///
    /// Walks breadth-first; returns the number of distinct cells visited.
    pub fn cascade_step(&mut self, max_cells: usize) -> usize {
        let mut processed = 0;

        while processed < max_cells {
            let Some(cell) = self.cascade.queue.pop_front() else {
                break;
            };
            if !self.cascade.visited.insert(cell) {
                continue;
            }
            processed += 1;
            // Already refreshed as a precedent of an earlier dependent
            if self.stale.contains(&cell) {
                self.evaluate_cell(cell);
            }
            let dependents = self.graph.dependents(cell);
            self.cascade.queue.extend(dependents);
        }

        if self.cascade.queue.is_empty() {
            self.cascade.visited.clear();
        }
        processed
    }

    /// Whether a cascade started by [`GridEngine::begin_edit`] still has work
    pub fn cascade_pending(&self) -> bool {
        !self.cascade.queue.is_empty()
    }

    /// Apply many edits at once.
    ///
    /// The dependency graph and evaluation cache are rebuilt from scratch
    /// instead of being patched edit by edit.
    pub fn edit_many<I, S>(&mut self, edits: I) -> Result<RecalcReport, GridError>
    where
        I: IntoIterator<Item = (CellCoord, S)>,
        S: Into<String>,
    {
        let edits: Vec<(CellCoord, String)> = edits
            .into_iter()
            .map(|(coord, raw)| (coord, raw.into()))
            .collect();
        for (coord, _) in &edits {
            self.check_bounds(*coord)?;
        }

        let count = edits.len();
        for (coord, raw) in edits {
            self.store.set_raw(coord, raw);
        }

        self.graph.clear();
        self.cache.clear();
        self.cascade = Cascade::default();
        info!(edits = count, "bulk edit applied, dependency graph and cache reset");

        Ok(self.recalculate_all())
    }

    /// Recompute every record: formula cells in row-major order, then any
    /// literal no formula reached.
    ///
    /// Repeated calls without intervening edits leave all values unchanged.
    pub fn recalculate_all(&mut self) -> RecalcReport {
        let measure = self.measure();

        let coords = self.store.coords();
        self.stale.extend(coords.iter().copied());
        for coord in self.store.formula_cells().into_iter().chain(coords) {
            if self.stale.contains(&coord) {
                self.evaluate_cell(coord);
            }
        }

        let report = self.report_since(measure);
        info!(report = %report.summary(), "full recalculation finished");
        report
    }
}
