// src/aggregate.rs

use polars::prelude::*;
use tracing::{debug, info};

use crate::error::Result;
use crate::schema::{AGE_GROUP, IS_BINGE_WATCHED};
use crate::utils::round_half_up;

pub const BINGE_WATCHERS: &str = "BingeWatchers";
pub const TOTAL_USERS: &str = "TotalUsers";
pub const BINGE_WATCHERS_PERCENTAGE: &str = "BingeWatchersPercentage";

/// Decimal places kept in the percentage column.
pub const PERCENTAGE_SCALE: u32 = 2;

/// Percentage of users per age group who binge-watch.
///
/// Binge-watched rows and all rows are counted per age group separately and
/// then inner-joined, so an age group without a single binge-watched row does
/// not appear in the result at all. Rows with a null `AgeGroup` never match.
pub fn detect_binge_watching_patterns(ratings: &DataFrame) -> Result<DataFrame> {
    let binge_counts = ratings
        .clone()
        .lazy()
        .filter(col(IS_BINGE_WATCHED).eq(lit(true)))
        .group_by([col(AGE_GROUP)])
        .agg([len().cast(DataType::Int64).alias(BINGE_WATCHERS)]);
    let totals = ratings
        .clone()
        .lazy()
        .group_by([col(AGE_GROUP)])
        .agg([len().cast(DataType::Int64).alias(TOTAL_USERS)]);

    let mut joined = binge_counts
        .join(
            totals,
            [col(AGE_GROUP)],
            [col(AGE_GROUP)],
            JoinArgs {
                how: JoinType::Inner,
                ..Default::default()
            },
        )
        .sort([AGE_GROUP], SortMultipleOptions::default())
        .collect()?;
    debug!(groups = joined.height(), "joined counts");

    let percentage = binge_percentage(&joined)?;
    joined.with_column(percentage)?;
    let result = joined.select([AGE_GROUP, BINGE_WATCHERS, BINGE_WATCHERS_PERCENTAGE])?;

    info!(groups = result.height(), "aggregated");
    Ok(result)
}

/// `round(BingeWatchers / TotalUsers * 100, 2)`, half-up on the decimal form.
fn binge_percentage(joined: &DataFrame) -> Result<Series> {
    let binge = joined.column(BINGE_WATCHERS)?.i64()?;
    let total = joined.column(TOTAL_USERS)?.i64()?;

    let percentage: Float64Chunked = binge
        .into_iter()
        .zip(total.into_iter())
        .map(|pair| match pair {
            (Some(b), Some(t)) if t > 0 => Some(round_half_up(
                b as f64 / t as f64 * 100.0,
                PERCENTAGE_SCALE,
            )),
            _ => None,
        })
        .collect();
    Ok(percentage
        .with_name(BINGE_WATCHERS_PERCENTAGE.into())
        .into_series())
}
