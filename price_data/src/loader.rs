//! Download-and-save entry points

use crate::error::Result;
use crate::provider::PriceProvider;
use crate::store::{ensure_dir, save_prices};
use crate::table::PriceTable;
use chrono::{Duration, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use tracing::info;

/// Instrument pulled when none is given
pub const DEFAULT_TICKER: &str = "SPY";

/// Years of history pulled when no range is given
pub const DEFAULT_YEARS: u32 = 2;

/// Fetch `ticker` for `[start, end)` and optionally save it to `save_path`
pub fn load_price_data(
    provider: &dyn PriceProvider,
    ticker: &str,
    start: NaiveDate,
    end: NaiveDate,
    save_path: Option<&Path>,
) -> Result<PriceTable> {
    let mut table = provider.fetch(ticker, start, end)?;

    if let Some(path) = save_path {
        save_prices(&mut table, path)?;
        info!("Saved {} rows for {} to {}", table.len(), ticker, path.display());
    }
    Ok(table)
}

/// Range covering the last `years` years up to today
pub fn trailing_range(years: u32) -> (NaiveDate, NaiveDate) {
    let end = Utc::now().date_naive() + Duration::days(1);
    let start = end - Duration::days(365 * i64::from(years));
    (start, end)
}

/// Where [`default_pull_and_save`] writes `ticker`
pub fn raw_path(data_dir: &Path, ticker: &str) -> PathBuf {
    data_dir
        .join("raw")
        .join(format!("{}.csv", ticker.to_lowercase()))
}

/// Pull the last `years` of `ticker` and save it under `{data_dir}/raw/`
pub fn default_pull_and_save(
    provider: &dyn PriceProvider,
    ticker: &str,
    years: u32,
    data_dir: &Path,
) -> Result<(PriceTable, PathBuf)> {
    let (start, end) = trailing_range(years);
    ensure_dir(data_dir.join("raw"))?;
    let path = raw_path(data_dir, ticker);

    let table = load_price_data(provider, ticker, start, end, Some(&path))?;
    Ok((table, path))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_path_lowercases_ticker() {
        let path = raw_path(Path::new("data"), "SPY");
        assert_eq!(path, Path::new("data").join("raw").join("spy.csv"));
    }

    #[test]
    fn trailing_range_spans_years() {
        let (start, end) = trailing_range(2);
        assert_eq!((end - start).num_days(), 730);
        assert!(end > Utc::now().date_naive());
    }
}
