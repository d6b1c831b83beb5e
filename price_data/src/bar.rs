//! Daily price bars and column names

use crate::error::{DataError, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Label of the date column in every stored table
pub const DATE_COLUMN: &str = "Date";

/// One trading day of OHLCV data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// Trading day
    pub date: NaiveDate,
    /// First traded price
    pub open: f64,
    /// Highest traded price
    pub high: f64,
    /// Lowest traded price
    pub low: f64,
    /// Last traded price
    pub close: f64,
    /// Close adjusted for splits and dividends
    pub adj_close: f64,
    /// Shares traded, `NaN` when the provider has none
    pub volume: f64,
}

/// Numeric column of a price table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceField {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
}

impl PriceField {
    /// Every field in stored column order
    pub const ALL: [PriceField; 6] = [
        PriceField::Open,
        PriceField::High,
        PriceField::Low,
        PriceField::Close,
        PriceField::AdjClose,
        PriceField::Volume,
    ];

    /// Column label used in stored tables
    pub fn column_name(&self) -> &'static str {
        match self {
            PriceField::Open => "Open",
            PriceField::High => "High",
            PriceField::Low => "Low",
            PriceField::Close => "Close",
            PriceField::AdjClose => "Adj Close",
            PriceField::Volume => "Volume",
        }
    }

    /// Value of this field in `bar`
    pub fn value(&self, bar: &PriceBar) -> f64 {
        match self {
            PriceField::Open => bar.open,
            PriceField::High => bar.high,
            PriceField::Low => bar.low,
            PriceField::Close => bar.close,
            PriceField::AdjClose => bar.adj_close,
            PriceField::Volume => bar.volume,
        }
    }
}

/// Lowercase a column label and drop everything but letters and digits
pub fn normalize_column(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl FromStr for PriceField {
    type Err = DataError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = normalize_column(s);
        PriceField::ALL
            .iter()
            .copied()
            .find(|field| normalize_column(field.column_name()) == normalized)
            .ok_or_else(|| DataError::MissingColumn(format!("Unknown price field: {}", s)))
    }
}

impl fmt::Display for PriceField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_field_spellings() {
        assert_eq!("Adj Close".parse::<PriceField>().unwrap(), PriceField::AdjClose);
        assert_eq!("adj_close".parse::<PriceField>().unwrap(), PriceField::AdjClose);
        assert_eq!("close".parse::<PriceField>().unwrap(), PriceField::Close);
        assert!("vwap".parse::<PriceField>().is_err());
    }
}
