//! Cooperative drivers for bulk population and edit cascades.
//!
//! The engine itself is synchronous. These drivers run one batch at a time
//! and yield to the tokio scheduler in between, so other tasks on the same
//! thread (painting, input handling) interleave with long-running work.

use std::ops::Range;

use gridflow_core::{CellCoord, GridError};

use crate::engine::GridEngine;

/// Drive a full population pass.
///
/// `on_batch` runs after every batch with exclusive access to the engine,
/// e.g. to apply queued edits or repaint the viewport. Returns the number of
/// batches processed.
pub async fn run_population<F>(engine: &mut GridEngine, mut on_batch: F) -> usize
where
    F: FnMut(&mut GridEngine, Range<u32>),
{
    engine.start_population();

    let mut batches = 0;
    while let Some(batch) = engine.tick() {
        batches += 1;
        on_batch(engine, batch);
        tokio::task::yield_now().await;
    }
    batches
}

/// Apply one edit and propagate it in batches of
/// `cascade_batch_size` dependents.
///
/// `on_batch` runs after every batch, like in [`run_population`]; cells the
/// cascade has not reached yet read as `Pending` there. Returns the number of
/// batches processed.
pub async fn run_cascade<F>(
    engine: &mut GridEngine,
    coord: CellCoord,
    raw: &str,
    mut on_batch: F,
) -> Result<usize, GridError>
where
    F: FnMut(&mut GridEngine),
{
    engine.begin_edit(coord, raw)?;

    let batch_size = engine.config().cascade_batch_size as usize;
    let mut batches = 0;
    while engine.cascade_pending() {
        engine.cascade_step(batch_size);
        batches += 1;
        on_batch(engine);
        tokio::task::yield_now().await;
    }
    Ok(batches)
}
