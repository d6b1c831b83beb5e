//! End-to-end stationarity and forecast pipeline
//!
//! raw series → differencing → split → order selection → fit → forecast →
//! evaluation, with every failure tagged by the stage that produced it.

use crate::differencing::{Differencer, DifferencingConfig, DifferencingOutcome};
use crate::engine::{ForecastEngine, ForecastResult};
use crate::error::ForecastError;
use crate::models::arima::{FitOptions, FittedArima};
use crate::models::naive::NaiveModel;
use crate::models::ForecastModel;
use crate::observer::{PipelineEvent, PipelineObserver};
use crate::order::{ModelOrder, OrderSelector, StationarityProbe};
use crate::series::TimeSeries;
use crate::split::{split, TestSize};
use crate::stationarity::AdfTest;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Pipeline step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Unit-root testing and differencing of the raw series
    Differencing,
    /// Chronological train/test split
    Splitting,
    /// Choosing `(p, d, q)` from the training segment
    OrderSelection,
    /// ARIMA estimation
    Fitting,
    /// Forecasting the held-out horizon
    Forecasting,
    /// Scoring against the test segment and the naive baseline
    Evaluation,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Differencing => "differencing",
            Stage::Splitting => "splitting",
            Stage::OrderSelection => "order selection",
            Stage::Fitting => "fitting",
            Stage::Forecasting => "forecasting",
            Stage::Evaluation => "evaluation",
        };
        f.write_str(name)
    }
}

/// A core error tagged with the stage that failed
#[derive(Debug, Error)]
#[error("{stage} stage failed: {source}")]
pub struct PipelineError {
    /// Where the pipeline stopped
    pub stage: Stage,
    /// Underlying error
    #[source]
    pub source: ForecastError,
}

impl PipelineError {
    fn at(stage: Stage) -> impl FnOnce(ForecastError) -> Self {
        move |source| Self { stage, source }
    }
}

/// Settings for every pipeline component
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// Differencing limits
    pub differencing: DifferencingConfig,
    /// Unit-root test used while differencing
    pub adf: AdfTest,
    /// Size of the held-out segment
    pub test_size: TestSize,
    /// Order selection policy
    pub order: OrderSelector,
    /// ARIMA estimation settings
    pub fit: FitOptions,
}

/// Everything the pipeline produced
#[derive(Debug, Clone)]
pub struct PipelineReport {
    /// Differencing result
    pub differencing: DifferencingOutcome,
    /// Training segment of the stationary series
    pub train: TimeSeries,
    /// Held-out segment of the stationary series
    pub test: TimeSeries,
    /// Selected order
    pub order: ModelOrder,
    /// Probe behind the order
    pub probe: StationarityProbe,
    /// Fitted model
    pub model: FittedArima,
    /// Forecast and its metrics
    pub result: ForecastResult,
    /// RMSE of repeating the last training value, when a test segment exists
    pub baseline_rmse: Option<f64>,
}

/// Runs the components in order
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    settings: PipelineSettings,
}

impl Pipeline {
    /// Create a pipeline from settings
    pub fn new(settings: PipelineSettings) -> Self {
        Self { settings }
    }

    /// Pipeline settings
    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Run every stage on `series`
    pub fn run(
        &self,
        series: &TimeSeries,
        observer: &dyn PipelineObserver,
    ) -> std::result::Result<PipelineReport, PipelineError> {
        let differencer = Differencer::with_tester(self.settings.adf, self.settings.differencing);
        let differencing = differencer
            .make_stationary(series, observer)
            .map_err(PipelineError::at(Stage::Differencing))?;

        let (train, test) = split(&differencing.series, self.settings.test_size)
            .map_err(PipelineError::at(Stage::Splitting))?;
        observer.notify(&PipelineEvent::SplitCompleted {
            train_len: train.len(),
            test_len: test.len(),
        });

        let (order, probe) = self.settings.order.select_order(&train, observer);

        let engine = ForecastEngine::new(self.settings.fit);
        observer.notify(&PipelineEvent::FitStarted {
            order,
            n_obs: train.len(),
        });
        let model = engine
            .fit(&train, order)
            .map_err(PipelineError::at(Stage::Fitting))?;
        observer.notify(&PipelineEvent::FitCompleted {
            order,
            iterations: model.iterations(),
            sigma2: model.sigma2(),
            aic: model.aic(),
        });

        let forecast = engine
            .forecast(&model, test.len())
            .map_err(PipelineError::at(Stage::Forecasting))?;

        let actual = if test.is_empty() { None } else { Some(&test) };
        let result = engine
            .evaluate(forecast, actual)
            .map_err(PipelineError::at(Stage::Evaluation))?;
        observer.notify(&PipelineEvent::Evaluated {
            rmse: result.rmse,
            mape: result.mape,
            excluded_zero_actuals: result.excluded_zero_actuals,
        });

        let baseline_rmse = match actual {
            Some(actual) => {
                let naive = NaiveModel::new()
                    .train(&train)
                    .map_err(PipelineError::at(Stage::Evaluation))?;
                engine
                    .forecast_and_evaluate(&naive, actual.len(), Some(actual))
                    .map_err(PipelineError::at(Stage::Evaluation))?
                    .rmse
            }
            None => None,
        };

        Ok(PipelineReport {
            differencing,
            train,
            test,
            order,
            probe,
            model,
            result,
            baseline_rmse,
        })
    }
}
