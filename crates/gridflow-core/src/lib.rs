pub mod cell;
pub mod chunk;
pub mod error;
pub mod range;
pub mod store;
pub mod viewport;

pub use cell::{is_formula, CellRecord, CellValue};
pub use chunk::{ChunkCoord, ChunkedGrid, CHUNK_SIZE};
pub use error::{CellError, GridError};
pub use range::{col_from_label, col_to_label, CellCoord};
pub use store::CellStore;
pub use viewport::{ViewportState, VisibleRange, DEFAULT_ROW_HEIGHT};
