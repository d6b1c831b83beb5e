//! Fit, forecast and evaluate

use crate::error::{ForecastError, Result};
use crate::metrics;
use crate::models::arima::{ArimaModel, FitOptions, FittedArima};
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::order::ModelOrder;
use crate::series::TimeSeries;
use serde::Serialize;
use std::fmt;

/// Forecast values with optional error metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastResult {
    /// Forecast series
    pub forecast: TimeSeries,
    /// Root mean squared error against the actuals
    pub rmse: Option<f64>,
    /// Mean absolute percentage error (fraction) against the non-zero actuals
    pub mape: Option<f64>,
    /// Actuals equal to zero that were left out of MAPE
    #[serde(skip)]
    pub excluded_zero_actuals: usize,
}

impl ForecastResult {
    /// Serialize the result as pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ForecastError::Computation(format!("Failed to serialize forecast: {}", e)))
    }
}

impl fmt::Display for ForecastResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Forecast ({} steps):", self.forecast.len())?;
        for (t, v) in self
            .forecast
            .timestamps()
            .iter()
            .zip(self.forecast.values())
            .take(5)
        {
            writeln!(f, "  {}  {:.4}", t.format("%Y-%m-%d %H:%M:%S"), v)?;
        }
        match self.rmse {
            Some(rmse) => writeln!(f, "RMSE: {:.4}", rmse)?,
            None => writeln!(f, "RMSE: n/a")?,
        }
        match self.mape {
            Some(mape) => write!(f, "MAPE: {:.4}", mape),
            None => write!(f, "MAPE: n/a"),
        }
    }
}

/// Fits ARIMA models and scores their forecasts
#[derive(Debug, Clone, Copy, Default)]
pub struct ForecastEngine {
    options: FitOptions,
}

impl ForecastEngine {
    /// Create an engine with the given estimation settings
    pub fn new(options: FitOptions) -> Self {
        Self { options }
    }

    /// Estimation settings
    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Fit an ARIMA model of `order` to `train`
    pub fn fit(&self, train: &TimeSeries, order: ModelOrder) -> Result<FittedArima> {
        ArimaModel::new(order).with_options(self.options).train(train)
    }

    /// Forecast `steps` points from any trained model
    pub fn forecast<M: TrainedForecastModel>(&self, model: &M, steps: usize) -> Result<TimeSeries> {
        let forecast = model.forecast(steps)?;
        if forecast.len() != steps {
            return Err(ForecastError::Computation(format!(
                "{} returned {} points for a horizon of {}",
                model.name(),
                forecast.len(),
                steps
            )));
        }
        Ok(forecast)
    }

    /// Score `forecast` against `actual`, which is truncated to the forecast length
    pub fn evaluate(&self, forecast: TimeSeries, actual: Option<&TimeSeries>) -> Result<ForecastResult> {
        let actual = match actual {
            Some(actual) => actual,
            None => {
                return Ok(ForecastResult {
                    forecast,
                    rmse: None,
                    mape: None,
                    excluded_zero_actuals: 0,
                })
            }
        };

        if forecast.is_empty() {
            return Err(ForecastError::Configuration(
                "Cannot evaluate an empty forecast".to_string(),
            ));
        }
        if actual.len() < forecast.len() {
            return Err(ForecastError::Configuration(format!(
                "Actual series has {} points but the forecast has {}",
                actual.len(),
                forecast.len()
            )));
        }

        let aligned = &actual.values()[..forecast.len()];
        let rmse = metrics::rmse(forecast.values(), aligned)?;
        let (mape, excluded) = metrics::mape(forecast.values(), aligned)?;

        Ok(ForecastResult {
            forecast,
            rmse: Some(rmse),
            mape,
            excluded_zero_actuals: excluded,
        })
    }

    /// Forecast `steps` points and score them against `actual` when given
    pub fn forecast_and_evaluate<M: TrainedForecastModel>(
        &self,
        model: &M,
        steps: usize,
        actual: Option<&TimeSeries>,
    ) -> Result<ForecastResult> {
        let forecast = self.forecast(model, steps)?;
        self.evaluate(forecast, actual)
    }
}
