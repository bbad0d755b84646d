use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::range::CellCoord;

/// Cell-local formula errors.
///
/// These never abort the engine: they are stored as the cell's computed
/// value and shown in place of a number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CellError {
    /// #REF! - Reference token does not decode to a coordinate
    InvalidReference,
    /// #ERROR! - Expression contains characters or tokens outside the grammar
    Syntax,
    /// #DIV/0! - Division by zero
    DivisionByZero,
    /// #NUM! - Result is not a finite number
    NumError,
    /// Formula transitively references itself
    CircularReference,
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellError::InvalidReference => write!(f, "#REF!"),
            CellError::Syntax => write!(f, "#ERROR!"),
            CellError::DivisionByZero => write!(f, "#DIV/0!"),
            CellError::NumError => write!(f, "#NUM!"),
            CellError::CircularReference => write!(f, "#CIRCULAR!"),
        }
    }
}

/// Errors returned by grid operations (as opposed to values stored in cells)
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("cell {coord} is outside the {rows}x{cols} grid")]
    OutOfBounds { coord: CellCoord, rows: u32, cols: u32 },

    #[error("invalid configuration value for {key}: {value:?}")]
    InvalidConfig { key: &'static str, value: String },
}

impl GridError {
    /// Stable machine-readable code for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            GridError::OutOfBounds { .. } => "OUT_OF_BOUNDS",
            GridError::InvalidConfig { .. } => "INVALID_CONFIG",
        }
    }
}
