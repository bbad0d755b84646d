//! Formula engine: bring one cell (and any out-of-date precedents) up to date.
//!
//! Evaluation walks precedents with an explicit work stack instead of
//! recursion, so a chain of a million formulas cannot exhaust the call stack.
//! A precedent is only re-evaluated when it is stale or still `Pending`;
//! clean precedents are read straight from the store.

use std::collections::HashSet;

use tracing::warn;

use gridflow_core::{is_formula, CellCoord, CellError, CellValue};
use gridflow_formula::Formula;

use crate::engine::GridEngine;

enum Visit {
    /// Decide whether the cell needs work and schedule its precedents
    Enter(CellCoord),
    /// All precedents are done; compute the cell itself
    Exit(CellCoord),
}

impl GridEngine {
    /// Evaluate the cell at `coord`, store and return its value.
    ///
    /// The cell is always recomputed; its precedents only if they are out of
    /// date. A cell with no record is synthesized from the row template if
    /// the template defines content for it, otherwise it is `Empty`.
    pub fn evaluate_cell(&mut self, coord: CellCoord) -> CellValue {
        if !self.store.contains(coord) && !self.synthesize(coord) {
            return CellValue::Empty;
        }
        self.stale.insert(coord);

        let mut in_progress: HashSet<CellCoord> = HashSet::new();
        let mut stack = vec![Visit::Enter(coord)];

        while let Some(visit) = stack.pop() {
            match visit {
                Visit::Enter(cell) => {
                    if in_progress.contains(&cell) || !self.needs_refresh(cell) {
                        continue;
                    }
                    let raw = match self.store.get_raw(cell) {
                        Some(raw) => raw.to_string(),
                        None => continue,
                    };

                    if !is_formula(&raw) {
                        self.graph.remove_cell(cell);
                        self.finish(cell, CellValue::from_literal(&raw));
                        continue;
                    }

                    in_progress.insert(cell);
                    stack.push(Visit::Exit(cell));

                    for precedent in Formula::parse(&raw).references() {
                        if in_progress.contains(&precedent) {
                            continue;
                        }
                        if !self.store.contains(precedent) {
                            self.synthesize(precedent);
                        }
                        if self.needs_refresh(precedent) {
                            stack.push(Visit::Enter(precedent));
                        }
                    }
                }
                Visit::Exit(cell) => {
                    self.complete_formula(cell, &in_progress);
                    in_progress.remove(&cell);
                }
            }
        }

        self.store.get_value(coord).clone()
    }

    /// A record needs evaluation if it was never computed or is marked stale
    fn needs_refresh(&self, coord: CellCoord) -> bool {
        match self.store.get(coord) {
            Some(record) => record.computed_value.is_pending() || self.stale.contains(&coord),
            None => false,
        }
    }

    /// Write the template content for a cell that has no record yet
    fn synthesize(&mut self, coord: CellCoord) -> bool {
        if !self.in_bounds(coord) || self.store.contains(coord) {
            return false;
        }
        match self.template.raw_input(coord.row, coord.col) {
            Some(raw) => {
                self.store.set_raw(coord, raw);
                true
            }
            None => false,
        }
    }

    fn complete_formula(&mut self, cell: CellCoord, in_progress: &HashSet<CellCoord>) {
        let formula = match self.store.get_raw(cell) {
            Some(raw) => Formula::parse(raw),
            None => return,
        };

        if formula.references().any(|p| in_progress.contains(&p)) {
            self.counters.cycles_detected += 1;
            warn!(cell = %cell, formula = formula.source(), "circular reference detected");
        }

        let value = match self.compute(&formula, in_progress) {
            Ok(n) => CellValue::Number(n),
            Err(e) => CellValue::Error(e),
        };

        self.graph.set_dependencies(cell, formula.dependencies());
        self.finish(cell, value);
    }

    /// Resolve operands and run the (cached) arithmetic.
    ///
    /// The first error among the precedents, in reference order, becomes
    /// the result.
    fn compute(
        &mut self,
        formula: &Formula,
        in_progress: &HashSet<CellCoord>,
    ) -> Result<f64, CellError> {
        if let Some(err) = formula.reference_error() {
            return Err(err);
        }

        let mut inputs = Vec::new();
        for precedent in formula.references() {
            if in_progress.contains(&precedent) {
                return Err(CellError::CircularReference);
            }
            if !self.in_bounds(precedent) {
                return Err(CellError::InvalidReference);
            }
            inputs.push(self.store.get_value(precedent).as_operand()?);
        }

        self.cache.evaluate(formula, &inputs)
    }

    fn finish(&mut self, cell: CellCoord, value: CellValue) {
        self.store.set_value(cell, value);
        self.stale.remove(&cell);
        self.counters.cells_computed += 1;
    }
}
