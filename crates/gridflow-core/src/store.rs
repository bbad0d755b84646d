use crate::cell::{CellRecord, CellValue};
use crate::chunk::ChunkedGrid;
use crate::range::CellCoord;

/// Sparse mapping of coordinates to raw text and last computed value.
///
/// Pure storage: writing raw input never evaluates anything. Records are
/// created on first write and never deleted in normal operation.
#[derive(Debug, Clone, Default)]
pub struct CellStore {
    cells: ChunkedGrid<CellRecord>,
}

impl CellStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw input at `coord`, `None` if the cell was never written
    pub fn get_raw(&self, coord: CellCoord) -> Option<&str> {
        self.cells.get(coord).map(|record| record.raw_input.as_str())
    }

    /// Last computed value (returns Empty for non-existent cells)
    pub fn get_value(&self, coord: CellCoord) -> &CellValue {
        const EMPTY: &CellValue = &CellValue::Empty;
        self.cells
            .get(coord)
            .map(|record| &record.computed_value)
            .unwrap_or(EMPTY)
    }

    pub fn get(&self, coord: CellCoord) -> Option<&CellRecord> {
        self.cells.get(coord)
    }

    /// Store raw input. The computed value is reset to `Pending` until the
    /// formula engine evaluates the cell.
    pub fn set_raw(&mut self, coord: CellCoord, raw: impl Into<String>) {
        let raw = raw.into();
        match self.cells.get_mut(coord) {
            Some(record) => {
                record.raw_input = raw;
                record.computed_value = CellValue::Pending;
            }
            None => {
                self.cells.insert(coord, CellRecord::new(raw));
            }
        }
    }

    /// Write the computed value of an existing record.
    ///
    /// Returns false (and stores nothing) if no record exists.
    pub fn set_value(&mut self, coord: CellCoord, value: CellValue) -> bool {
        match self.cells.get_mut(coord) {
            Some(record) => {
                record.computed_value = value;
                true
            }
            None => false,
        }
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        self.cells.contains(coord)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Coordinates of every record, row-major
    pub fn coords(&self) -> Vec<CellCoord> {
        let mut coords: Vec<CellCoord> = self.cells.iter().map(|(coord, _)| coord).collect();
        coords.sort_unstable();
        coords
    }

    /// Coordinates of every formula cell, row-major
    pub fn formula_cells(&self) -> Vec<CellCoord> {
        let mut coords: Vec<CellCoord> = self
            .cells
            .iter()
            .filter(|(_, record)| record.is_formula())
            .map(|(coord, _)| coord)
            .collect();
        coords.sort_unstable();
        coords
    }

    /// Records in rows `start_row..=end_row`, row-major
    pub fn records_in_rows(&self, start_row: u32, end_row: u32) -> Vec<(CellCoord, &CellRecord)> {
        self.cells.rows_in_range(start_row, end_row)
    }
}
