//! # ARIMA Pipeline
//!
//! Wires price download, feature construction and the stationarity-and-forecast
//! pipeline into one run.
//!
//! ## Example
//!
//! ```
//! use arima_pipeline::{run_on_series, PipelineConfig};
//! use forecast_core::observer::NoopObserver;
//! use forecast_core::synthetic::linear_trend_with_noise;
//!
//! let series = linear_trend_with_noise(300, 100.0, 0.5, 1.0, 11)?;
//! let run = run_on_series(&PipelineConfig::default(), &series, &NoopObserver)?;
//! println!("{} RMSE: {:?}", run.report.order, run.report.result.rmse);
//! # Ok::<(), anyhow::Error>(())
//! ```

pub mod app;
pub mod config;

pub use crate::app::{load_series, run_on_series, AppRun, SeriesSource};
pub use crate::config::{load_config, PipelineConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
