//! Error types for the forecast_core crate

use crate::order::ModelOrder;
use thiserror::Error;

/// Custom error types for the forecast_core crate
#[derive(Debug, Error)]
pub enum ForecastError {
    /// The data source produced nothing usable
    #[error("Data unavailable: {0}")]
    DataUnavailable(String),

    /// Series too short for the requested computation
    #[error("Insufficient data for {context}: need at least {needed} observations, got {got}")]
    InsufficientData {
        /// What was being computed
        context: String,
        /// Minimum number of observations required
        needed: usize,
        /// Number of observations available
        got: usize,
    },

    /// Series has zero variance, so no test statistic exists
    #[error("Series is constant ({len} observations of {value})")]
    ConstantSeries {
        /// Length of the series
        len: usize,
        /// The repeated value
        value: f64,
    },

    /// Malformed series (unordered timestamps, length mismatch)
    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    /// Numerical failure inside a computation
    #[error("Computation error: {0}")]
    Computation(String),

    /// Model estimation failed
    #[error("Failed to fit {order} on {n_obs} observations: {reason}")]
    ModelFit {
        /// Order that was attempted
        order: ModelOrder,
        /// Length of the training series
        n_obs: usize,
        /// Why estimation failed
        reason: String,
    },

    /// Invalid parameters supplied by the caller
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error from IO operations
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type with our custom error
pub type Result<T> = std::result::Result<T, ForecastError>;

impl ForecastError {
    /// Shorthand for an [`ForecastError::InsufficientData`] error
    pub fn insufficient(context: impl Into<String>, needed: usize, got: usize) -> Self {
        ForecastError::InsufficientData {
            context: context.into(),
            needed,
            got,
        }
    }

    /// Whether the error stems from a series that is too short
    pub fn is_insufficient_data(&self) -> bool {
        matches!(self, ForecastError::InsufficientData { .. })
    }
}
