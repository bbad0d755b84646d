pub mod config;
pub mod engine;
pub mod evaluate;
pub mod populate;
pub mod recalc;
pub mod scheduler;
pub mod template;
pub mod viewport;

pub use config::{EngineConfig, MAX_ROWS};
pub use engine::{CellSnapshot, GridEngine};
pub use populate::{BulkPopulator, LoadingState};
pub use recalc::RecalcReport;
pub use scheduler::{run_cascade, run_population};
pub use template::{BlankTemplate, ChainTemplate, LabelTemplate, RowTemplate};

pub use gridflow_core::{CellCoord, CellError, CellValue, GridError, VisibleRange};
