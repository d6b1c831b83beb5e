//! Polars frames indexed by the series timestamps

use crate::Result;
use chrono::Timelike;
use forecast_core::TimeSeries;
use polars::prelude::*;

/// Timestamp column leading every feature frame
pub const DATE_COLUMN: &str = "Date";

/// Frame with a `Date` column and the observed values as `y`
pub fn base_frame(series: &TimeSeries) -> Result<DataFrame> {
    // date-only text for daily data, matching the saved price CSVs
    let daily = series
        .timestamps()
        .iter()
        .all(|t| t.num_seconds_from_midnight() == 0);
    let format = if daily { "%Y-%m-%d" } else { "%Y-%m-%d %H:%M:%S" };

    let dates: Vec<String> = series
        .timestamps()
        .iter()
        .map(|t| t.format(format).to_string())
        .collect();

    let df = DataFrame::new(vec![
        Series::new(DATE_COLUMN, dates),
        Series::new("y", series.values()),
    ])?;
    Ok(df)
}

/// Add a nullable feature column, replacing one with the same name
pub fn put_column(df: &mut DataFrame, name: &str, values: Vec<Option<f64>>) -> Result<()> {
    df.with_column(Series::new(name, values))?;
    Ok(())
}
