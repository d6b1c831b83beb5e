//! Error types for the price_data crate

use forecast_core::ForecastError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Custom error types for the price_data crate
#[derive(Debug, Error)]
pub enum DataError {
    /// The provider returned no rows
    #[error("No price data for {ticker} between {start} and {end}")]
    Empty {
        ticker: String,
        start: String,
        end: String,
    },

    /// The provider answered with an error or an unexpected payload
    #[error("Provider error: {0}")]
    Provider(String),

    /// A required column is absent
    #[error("Column not found: {0}")]
    MissingColumn(String),

    /// A value could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error from the HTTP client
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Error from Polars operations
    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),

    /// Error from IO operations
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error building a time series from the table
    #[error("Series error: {0}")]
    Series(#[from] ForecastError),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, DataError>;

impl From<DataError> for ForecastError {
    fn from(err: DataError) -> Self {
        match err {
            DataError::Series(inner) => inner,
            DataError::Io(inner) => ForecastError::IoError(inner),
            other => ForecastError::DataUnavailable(other.to_string()),
        }
    }
}
