//! # Forecast Core
//!
//! Stationarity testing, differencing and ARIMA forecasting for a single
//! numeric time series.
//!
//! ## Features
//!
//! - Augmented Dickey-Fuller test with AIC/BIC/t-stat lag selection and
//!   MacKinnon p-values
//! - Differencing loop that stops once the unit root is rejected
//! - Order selection driven by a stationarity probe
//! - ARIMA estimation by conditional sum of squares, forecasting and evaluation
//! - Chronological train/test split
//!
//! ## Quick Start
//!
//! ```rust
//! use forecast_core::observer::NoopObserver;
//! use forecast_core::pipeline::{Pipeline, PipelineSettings};
//! use forecast_core::synthetic::linear_trend_with_noise;
//!
//! let series = linear_trend_with_noise(300, 100.0, 0.5, 1.0, 7)?;
//! let report = Pipeline::new(PipelineSettings::default()).run(&series, &NoopObserver)?;
//! println!("{} RMSE: {:?}", report.order, report.result.rmse);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod differencing;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod models;
pub mod observer;
pub mod optimize;
pub mod order;
pub mod pipeline;
pub mod regression;
pub mod series;
pub mod split;
pub mod stationarity;
pub mod synthetic;

// Re-export commonly used types
pub use crate::differencing::{make_stationary, Differencer, DifferencingConfig, DifferencingOutcome};
pub use crate::engine::{ForecastEngine, ForecastResult};
pub use crate::error::{ForecastError, Result};
pub use crate::models::arima::{ArimaModel, FitOptions, FittedArima};
pub use crate::models::{ForecastModel, TrainedForecastModel};
pub use crate::observer::{PipelineEvent, PipelineObserver, TracingObserver};
pub use crate::order::{select_order, ModelOrder, OrderSelector, StationarityProbe};
pub use crate::pipeline::{Pipeline, PipelineError, PipelineReport, PipelineSettings, Stage};
pub use crate::series::{Frequency, TimeSeries};
pub use crate::split::{split, train_test_split, TestSize};
pub use crate::stationarity::{AdfTest, Autolag, StationarityResult, UnitRootTest};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
