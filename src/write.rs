// src/write.rs

use polars::prelude::DataFrame;
use std::path::Path;
use tracing::info;

use crate::aggregate::PERCENTAGE_SCALE;
use crate::engine::LocalEngine;
use crate::error::Result;

/// Write the aggregation result as a single CSV file at `path`, replacing
/// anything already there. Percentages are rendered with exactly two decimals.
#[tracing::instrument(
    level = "info",
    skip(engine, result, path),
    fields(path = %path.as_ref().display(), rows = result.height())
)]
pub fn write_output<P: AsRef<Path>>(
    engine: &LocalEngine,
    result: &mut DataFrame,
    path: P,
) -> Result<()> {
    engine.write_csv(result, path.as_ref(), Some(PERCENTAGE_SCALE as usize))?;
    info!("wrote output");
    Ok(())
}
