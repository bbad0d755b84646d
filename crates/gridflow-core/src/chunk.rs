//! Chunked sparse storage for the grid.
//!
//! Two-level sparse structure:
//! - Top level: HashMap of chunk coordinates
//! - Bottom level: HashMap of local cell coordinates within each 16x16 chunk
//!
//! Absent cells cost nothing and are tested in O(1). Row-band queries (what
//! the viewport needs) only touch the chunks overlapping the band.

use std::collections::HashMap;

use crate::range::CellCoord;

/// Size of each chunk in both dimensions (16x16 cells per chunk).
pub const CHUNK_SIZE: u32 = 16;

/// Coordinate of a chunk in the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkCoord {
    /// Which 16-row block (row / CHUNK_SIZE)
    pub block_row: u32,
    /// Which 16-column block (col / CHUNK_SIZE)
    pub block_col: u32,
}

impl ChunkCoord {
    /// The chunk a cell belongs to.
    ///
    /// ```
    /// use gridflow_core::{CellCoord, ChunkCoord};
    ///
    /// let chunk = ChunkCoord::of(CellCoord::new(17, 33));
    /// assert_eq!(chunk.block_row, 1);
    /// assert_eq!(chunk.block_col, 2);
    /// ```
    pub fn of(coord: CellCoord) -> Self {
        Self {
            block_row: coord.row / CHUNK_SIZE,
            block_col: coord.col / CHUNK_SIZE,
        }
    }

    fn origin(&self) -> CellCoord {
        CellCoord::new(self.block_row * CHUNK_SIZE, self.block_col * CHUNK_SIZE)
    }
}

/// Local (row, col) inside a chunk, both in 0..CHUNK_SIZE
type LocalKey = (u8, u8);

fn local_key(coord: CellCoord) -> LocalKey {
    ((coord.row % CHUNK_SIZE) as u8, (coord.col % CHUNK_SIZE) as u8)
}

fn global_coord(chunk: ChunkCoord, (local_row, local_col): LocalKey) -> CellCoord {
    let origin = chunk.origin();
    CellCoord::new(origin.row + local_row as u32, origin.col + local_col as u32)
}

/// A chunked sparse grid.
///
/// Only chunks that contain data are allocated.
#[derive(Clone, Debug)]
pub struct ChunkedGrid<T> {
    chunks: HashMap<ChunkCoord, HashMap<LocalKey, T>>,
    len: usize,
}

impl<T> ChunkedGrid<T> {
    /// Create a new empty chunked grid.
    pub fn new() -> Self {
        Self {
            chunks: HashMap::new(),
            len: 0,
        }
    }

    pub fn get(&self, coord: CellCoord) -> Option<&T> {
        self.chunks.get(&ChunkCoord::of(coord))?.get(&local_key(coord))
    }

    pub fn get_mut(&mut self, coord: CellCoord) -> Option<&mut T> {
        self.chunks
            .get_mut(&ChunkCoord::of(coord))?
            .get_mut(&local_key(coord))
    }

    /// Insert a value, creating the chunk if necessary.
    ///
    /// Returns the previous value if one existed.
    pub fn insert(&mut self, coord: CellCoord, value: T) -> Option<T> {
        let previous = self
            .chunks
            .entry(ChunkCoord::of(coord))
            .or_default()
            .insert(local_key(coord), value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    pub fn contains(&self, coord: CellCoord) -> bool {
        self.get(coord).is_some()
    }

    /// Total number of stored cells.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterate over all cells in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, &T)> {
        self.chunks.iter().flat_map(|(chunk_coord, chunk)| {
            let chunk_coord = *chunk_coord;
            chunk
                .iter()
                .map(move |(key, value)| (global_coord(chunk_coord, *key), value))
        })
    }

    /// All cells in rows `start_row..=end_row`, sorted row-major.
    ///
    /// Visits only the chunk rows overlapping the band.
    pub fn rows_in_range(&self, start_row: u32, end_row: u32) -> Vec<(CellCoord, &T)> {
        if start_row > end_row {
            return Vec::new();
        }
        let first_block = start_row / CHUNK_SIZE;
        let last_block = end_row / CHUNK_SIZE;

        let mut result: Vec<(CellCoord, &T)> = self
            .chunks
            .iter()
            .filter(|(chunk_coord, _)| {
                (first_block..=last_block).contains(&chunk_coord.block_row)
            })
            .flat_map(|(chunk_coord, chunk)| {
                let chunk_coord = *chunk_coord;
                chunk
                    .iter()
                    .map(move |(key, value)| (global_coord(chunk_coord, *key), value))
            })
            .filter(|(coord, _)| coord.row >= start_row && coord.row <= end_row)
            .collect();

        result.sort_by_key(|(coord, _)| *coord);
        result
    }

    pub fn clear(&mut self) {
        self.chunks.clear();
        self.len = 0;
    }
}

impl<T> Default for ChunkedGrid<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_coord_of() {
        assert_eq!(
            ChunkCoord::of(CellCoord::new(15, 15)),
            ChunkCoord { block_row: 0, block_col: 0 }
        );
        assert_eq!(
            ChunkCoord::of(CellCoord::new(16, 16)),
            ChunkCoord { block_row: 1, block_col: 1 }
        );
    }

    #[test]
    fn test_local_and_global_coords() {
        let coord = CellCoord::new(17, 33);
        let key = local_key(coord);
        assert_eq!(key, (1, 1));
        assert_eq!(global_coord(ChunkCoord::of(coord), key), coord);
    }

    #[test]
    fn test_insert_get_replace() {
        let mut grid = ChunkedGrid::new();
        let coord = CellCoord::new(999_999, 3);

        assert!(!grid.contains(coord));
        assert_eq!(grid.insert(coord, "x"), None);
        assert_eq!(grid.insert(coord, "y"), Some("x"));
        assert_eq!(grid.get(coord), Some(&"y"));
        assert_eq!(grid.len(), 1);
        assert_eq!(grid.chunks.len(), 1);
        assert!(!grid.is_empty());
    }

    #[test]
    fn test_sparse_chunks_only_allocated_on_write() {
        let mut grid = ChunkedGrid::new();
        grid.insert(CellCoord::new(0, 0), 1);
        grid.insert(CellCoord::new(1_000_000, 0), 2);
        assert_eq!(grid.chunks.len(), 2);
        assert_eq!(grid.iter().count(), 2);
    }

    #[test]
    fn test_rows_in_range_sorted() {
        let mut grid = ChunkedGrid::new();
        for row in [40u32, 3, 17, 16, 100] {
            grid.insert(CellCoord::new(row, 1), row);
            grid.insert(CellCoord::new(row, 0), row);
        }

        let band: Vec<CellCoord> = grid
            .rows_in_range(16, 40)
            .into_iter()
            .map(|(coord, _)| coord)
            .collect();
        assert_eq!(
            band,
            vec![
                CellCoord::new(16, 0),
                CellCoord::new(16, 1),
                CellCoord::new(17, 0),
                CellCoord::new(17, 1),
                CellCoord::new(40, 0),
                CellCoord::new(40, 1),
            ]
        );
        assert!(grid.rows_in_range(5, 4).is_empty());
    }
}
