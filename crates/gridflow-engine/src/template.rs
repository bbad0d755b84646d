//! Domain rules that generate the initial content of a row.
//!
//! The bulk populator and the viewport materializer ask the template what a
//! not-yet-written cell should contain. Templates are pure: the same
//! coordinate always yields the same raw input.

/// Generates raw input for cells that have never been written
pub trait RowTemplate: Send {
    /// Raw input for `(row, col)`, or `None` if the template leaves it blank
    fn raw_input(&self, row: u32, col: u32) -> Option<String>;

    /// Whether any cell of `row` has template content
    fn has_content(&self, row: u32, total_cols: u32) -> bool {
        (0..total_cols).any(|col| self.raw_input(row, col).is_some())
    }
}

/// Leaves every cell blank
#[derive(Debug, Clone, Copy, Default)]
pub struct BlankTemplate;

impl RowTemplate for BlankTemplate {
    fn raw_input(&self, _row: u32, _col: u32) -> Option<String> {
        None
    }

    fn has_content(&self, _row: u32, _total_cols: u32) -> bool {
        false
    }
}

/// Running-sum chain: `A1` holds the seed, `B1 = A$1` and every following
/// `B` cell adds the seed to the cell above it, so `Bn` evaluates to `seed * n`.
#[derive(Debug, Clone)]
pub struct ChainTemplate {
    pub seed: String,
}

impl ChainTemplate {
    pub fn new(seed: impl Into<String>) -> Self {
        Self { seed: seed.into() }
    }
}

impl Default for ChainTemplate {
    fn default() -> Self {
        Self::new("1")
    }
}

impl RowTemplate for ChainTemplate {
    fn raw_input(&self, row: u32, col: u32) -> Option<String> {
        match (row, col) {
            (0, 0) => Some(self.seed.clone()),
            (0, 1) => Some("=A$1".to_string()),
            // Row numbers in A1 notation are 1-based: the cell above row r is r
            (_, 1) => Some(format!("=A$1+B{}", row)),
            _ => None,
        }
    }

    fn has_content(&self, _row: u32, total_cols: u32) -> bool {
        total_cols > 1
    }
}

/// Plain text `"{row}-{col}"` in the first `cols` columns
#[derive(Debug, Clone, Copy)]
pub struct LabelTemplate {
    pub cols: u32,
}

impl RowTemplate for LabelTemplate {
    fn raw_input(&self, row: u32, col: u32) -> Option<String> {
        (col < self.cols).then(|| format!("{}-{}", row, col))
    }

    fn has_content(&self, _row: u32, total_cols: u32) -> bool {
        self.cols.min(total_cols) > 0
    }
}
