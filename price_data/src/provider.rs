//! Price history sources

use crate::error::{DataError, Result};
use crate::store::load_prices;
use crate::table::PriceTable;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use tracing::info;

/// Source of daily OHLCV history
pub trait PriceProvider {
    /// Rows for `ticker` with `start <= date < end`, ascending and unique by date
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceTable>;
}

/// Reads tables previously saved as `{dir}/{ticker_lower}.csv`
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    /// Create a provider over `dir`
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    /// File holding `ticker`
    pub fn path_for(&self, ticker: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", ticker.to_lowercase()))
    }
}

impl PriceProvider for CsvProvider {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceTable> {
        let path = self.path_for(ticker);
        info!("Reading {} from {}", ticker, path.display());
        let table = load_prices(&path)?.between(start, end)?;

        if table.is_empty() {
            return Err(DataError::Empty {
                ticker: ticker.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        Ok(table)
    }
}
