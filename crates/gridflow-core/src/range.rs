use serde::{Deserialize, Serialize};
use std::fmt;

/// Cell coordinate (0-indexed internally)
///
/// Field order gives the derived `Ord` row-major ordering, which is what
/// deterministic iteration over the grid relies on.
#[derive(
    Debug, Clone, Copy, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize,
)]
pub struct CellCoord {
    pub row: u32,
    pub col: u32,
}

impl CellCoord {
    pub const fn new(row: u32, col: u32) -> Self {
        CellCoord { row, col }
    }

    /// Convert to A1 notation (e.g., (0, 0) -> "A1")
    pub fn to_a1(&self) -> String {
        format!("{}{}", col_to_label(self.col), u64::from(self.row) + 1)
    }

    /// Check if this coord is within bounds
    pub fn is_valid(&self, max_rows: u32, max_cols: u32) -> bool {
        self.row < max_rows && self.col < max_cols
    }
}

impl fmt::Display for CellCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_a1())
    }
}

/// Convert column index (0-indexed) to label (A, B, ..., Z, AA, AB, ...)
///
/// Bijective base-26: "AA" immediately follows "Z".
pub fn col_to_label(col: u32) -> String {
    let mut label = Vec::new();
    // 1-indexed for calculation; u64 so that u32::MAX does not overflow
    let mut n = u64::from(col) + 1;

    while n > 0 {
        n -= 1;
        label.push(b'A' + (n % 26) as u8);
        n /= 26;
    }

    label.reverse();
    String::from_utf8(label).unwrap_or_default()
}

/// Convert column label (A, B, ..., Z, AA, AB, ...) to index (0-indexed)
///
/// Only uppercase ASCII letters are accepted. Returns `None` for an empty
/// label or one whose index does not fit in a `u32`.
pub fn col_from_label(label: &str) -> Option<u32> {
    if label.is_empty() {
        return None;
    }

    let mut col: u64 = 0;
    for c in label.bytes() {
        if !c.is_ascii_uppercase() {
            return None;
        }
        col = col
            .checked_mul(26)?
            .checked_add(u64::from(c - b'A') + 1)?;
        if col > u64::from(u32::MAX) + 1 {
            return None;
        }
    }

    u32::try_from(col - 1).ok()
}
