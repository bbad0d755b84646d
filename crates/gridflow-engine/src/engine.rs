use std::collections::HashSet;

use bitvec::vec::BitVec;
use serde::Serialize;

use gridflow_core::{CellCoord, CellStore, CellValue, GridError, ViewportState, VisibleRange};
use gridflow_formula::{CacheStats, DependencyGraph, EvaluationCache};

use crate::config::EngineConfig;
use crate::populate::BulkPopulator;
use crate::recalc::Cascade;
use crate::template::{BlankTemplate, RowTemplate};

/// What the presentation layer needs to paint one cell
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CellSnapshot {
    pub coord: CellCoord,
    /// A1-style address
    pub address: String,
    pub raw_text: Option<String>,
    pub display_value: String,
    pub value: CellValue,
}

/// Running totals used to build recalculation reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Counters {
    pub cells_computed: u64,
    pub cycles_detected: u64,
}

/// The reactive grid engine.
///
/// Owns the cell store, dependency graph, evaluation cache and population
/// state; everything is mutated only through the methods on this type.
pub struct GridEngine {
    pub(crate) config: EngineConfig,
    pub(crate) store: CellStore,
    pub(crate) graph: DependencyGraph,
    pub(crate) cache: EvaluationCache,
    /// Records whose computed value may be out of date
    pub(crate) stale: HashSet<CellCoord>,
    pub(crate) cascade: Cascade,
    pub(crate) template: Box<dyn RowTemplate>,
    /// Rows whose template cells have all been written
    pub(crate) materialized: BitVec,
    pub(crate) viewport: ViewportState,
    pub(crate) visible: Option<VisibleRange>,
    pub(crate) populator: BulkPopulator,
    pub(crate) counters: Counters,
}

impl GridEngine {
    /// Create an engine over an initially blank grid
    pub fn new(config: EngineConfig) -> Result<Self, GridError> {
        Self::with_template(config, BlankTemplate)
    }

    /// Create an engine whose rows are seeded from `template`
    pub fn with_template(
        config: EngineConfig,
        template: impl RowTemplate + 'static,
    ) -> Result<Self, GridError> {
        config.validate()?;

        let viewport = ViewportState::new(config.row_height, 0.0);
        let populator = BulkPopulator::new(config.total_rows, config.populate_batch_size);

        Ok(Self {
            store: CellStore::new(),
            graph: DependencyGraph::new(),
            cache: EvaluationCache::new(config.cache_capacity),
            stale: HashSet::new(),
            cascade: Cascade::default(),
            template: Box::new(template),
            materialized: BitVec::repeat(false, config.total_rows as usize),
            viewport,
            visible: None,
            populator,
            counters: Counters::default(),
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &CellStore {
        &self.store
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    pub fn in_bounds(&self, coord: CellCoord) -> bool {
        coord.is_valid(self.config.total_rows, self.config.total_cols)
    }

    pub(crate) fn check_bounds(&self, coord: CellCoord) -> Result<(), GridError> {
        if self.in_bounds(coord) {
            Ok(())
        } else {
            Err(GridError::OutOfBounds {
                coord,
                rows: self.config.total_rows,
                cols: self.config.total_cols,
            })
        }
    }

    /// Whether every template cell of `row` has been written
    pub fn is_materialized(&self, row: u32) -> bool {
        self.materialized
            .get(row as usize)
            .map(|bit| *bit)
            .unwrap_or(false)
    }

    /// Number of materialized rows
    pub fn materialized_rows(&self) -> usize {
        self.materialized.count_ones()
    }

    pub(crate) fn mark_materialized(&mut self, row: u32) {
        if (row as usize) < self.materialized.len() {
            self.materialized.set(row as usize, true);
        }
    }

    /// Current computed value at `coord` without triggering evaluation
    pub fn value(&self, coord: CellCoord) -> &CellValue {
        self.store.get_value(coord)
    }

    /// Read a cell for display.
    ///
    /// Cells the template will fill but which have not been written yet,
    /// and cells a queued cascade has not reached, read as `Pending` so they
    /// are never mistaken for final values.
    pub fn read(&self, coord: CellCoord) -> CellSnapshot {
        let (raw_text, value) = match self.store.get(coord) {
            Some(record) if self.stale.contains(&coord) => {
                (Some(record.raw_input.clone()), CellValue::Pending)
            }
            Some(record) => (Some(record.raw_input.clone()), record.computed_value.clone()),
            None if self.awaits_template(coord) => (None, CellValue::Pending),
            None => (None, CellValue::Empty),
        };

        CellSnapshot {
            coord,
            address: coord.to_a1(),
            raw_text,
            display_value: value.as_text(),
            value,
        }
    }

    fn awaits_template(&self, coord: CellCoord) -> bool {
        self.in_bounds(coord)
            && !self.is_materialized(coord.row)
            && self.template.raw_input(coord.row, coord.col).is_some()
    }
}
