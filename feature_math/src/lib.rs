//! # Feature Math
//!
//! Lagged and rolling-window feature columns for a single time series,
//! returned as polars frames with a leading `Date` column. Rows where a
//! feature is undefined hold null.

use polars::prelude::PolarsError;
use thiserror::Error;

pub mod frame;
pub mod lags;
pub mod rolling;

/// Errors that can occur while building features
#[derive(Error, Debug)]
pub enum FeatureError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Unknown rolling statistic: {0}")]
    UnknownStatistic(String),

    #[error("Polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for feature operations
pub type Result<T> = std::result::Result<T, FeatureError>;

// Re-export commonly used types
pub use crate::lags::{create_lag_features, shift};
pub use crate::rolling::{create_rolling_features, rolling, RollingStat, RollingWindow};
pub use crate::frame::DATE_COLUMN;
pub use polars::prelude::DataFrame;
