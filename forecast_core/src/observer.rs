//! Pipeline progress reporting
//!
//! Core components never log directly. They report what happened to a
//! [`PipelineObserver`] supplied by the caller; [`TracingObserver`] forwards the
//! events to `tracing`, [`RecordingObserver`] keeps them for inspection.

use crate::order::{ModelOrder, StationarityProbe};
use crate::stationarity::StationarityResult;
use std::cell::RefCell;
use tracing::{debug, info, warn};

/// Something that happened while running the pipeline
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineEvent {
    /// A unit-root test ran on the series differenced `order` times
    StationarityTested {
        order: usize,
        result: StationarityResult,
    },
    /// The series was differenced once more
    Differenced { order: usize, len: usize },
    /// The differencing limit was reached without rejecting the unit root
    NonStationary { order: usize, p_value: f64 },
    /// Differencing stopped because the series became too short
    DifferencingHalted { order: usize, len: usize },
    /// An ARIMA order was chosen
    OrderSelected {
        order: ModelOrder,
        probe: StationarityProbe,
    },
    /// The series was split into train and test segments
    SplitCompleted { train_len: usize, test_len: usize },
    /// Model estimation started
    FitStarted { order: ModelOrder, n_obs: usize },
    /// Model estimation finished
    FitCompleted {
        order: ModelOrder,
        iterations: usize,
        sigma2: f64,
        aic: f64,
    },
    /// Forecast metrics were computed
    Evaluated {
        rmse: Option<f64>,
        mape: Option<f64>,
        excluded_zero_actuals: usize,
    },
}

/// Receives pipeline events
pub trait PipelineObserver {
    /// Handle one event
    fn notify(&self, event: &PipelineEvent);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl PipelineObserver for NoopObserver {
    fn notify(&self, _event: &PipelineEvent) {}
}

/// Forwards events to the `tracing` subscriber
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn notify(&self, event: &PipelineEvent) {
        match event {
            PipelineEvent::StationarityTested { order, result } => {
                info!("ADF test at d={}: p={:.4}", order, result.p_value);
                debug!(
                    statistic = result.test_statistic,
                    used_lag = result.used_lag,
                    n_obs = result.n_obs,
                    "ADF regression"
                );
            }
            PipelineEvent::Differenced { order, len } => {
                debug!("Differenced to order {} ({} observations)", order, len);
            }
            PipelineEvent::NonStationary { order, p_value } => {
                warn!(
                    "Series still non-stationary after {} differences (p={:.4})",
                    order, p_value
                );
            }
            PipelineEvent::DifferencingHalted { order, len } => {
                warn!(
                    "Stopped differencing at order {}: only {} observations left",
                    order, len
                );
            }
            PipelineEvent::OrderSelected { order, probe } => match probe {
                StationarityProbe::Determined { p_value } => {
                    info!("Selected {} (probe p={:.4})", order, p_value)
                }
                StationarityProbe::Indeterminate { reason } => {
                    warn!("Selected {} after an indeterminate probe: {}", order, reason)
                }
            },
            PipelineEvent::SplitCompleted {
                train_len,
                test_len,
            } => {
                info!("Split into {} train / {} test observations", train_len, test_len);
            }
            PipelineEvent::FitStarted { order, n_obs } => {
                info!("Fitting {} to series of length {}", order, n_obs);
            }
            PipelineEvent::FitCompleted {
                order,
                iterations,
                sigma2,
                aic,
            } => {
                info!(
                    "Fitted {} in {} iterations (sigma2={:.6}, AIC={:.2})",
                    order, iterations, sigma2, aic
                );
            }
            PipelineEvent::Evaluated {
                rmse,
                mape,
                excluded_zero_actuals,
            } => {
                info!("Forecast RMSE: {:?}, MAPE: {:?}", rmse, mape);
                if *excluded_zero_actuals > 0 {
                    debug!("{} zero actuals excluded from MAPE", excluded_zero_actuals);
                }
            }
        }
    }
}

/// Keeps every event in memory
#[derive(Debug, Default)]
pub struct RecordingObserver {
    events: RefCell<Vec<PipelineEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Events received so far
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.borrow().clone()
    }
}

impl PipelineObserver for RecordingObserver {
    fn notify(&self, event: &PipelineEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}
