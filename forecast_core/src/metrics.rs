//! Forecast error metrics

use crate::error::{ForecastError, Result};
use serde::Serialize;

fn check_lengths(forecast: &[f64], actual: &[f64]) -> Result<()> {
    if forecast.len() != actual.len() || forecast.is_empty() {
        return Err(ForecastError::Configuration(format!(
            "Forecast and actual values must have the same non-zero length (got {} and {})",
            forecast.len(),
            actual.len()
        )));
    }
    Ok(())
}

/// Root mean squared error
pub fn rmse(forecast: &[f64], actual: &[f64]) -> Result<f64> {
    check_lengths(forecast, actual)?;
    let mse = forecast
        .iter()
        .zip(actual)
        .map(|(f, a)| (f - a).powi(2))
        .sum::<f64>()
        / forecast.len() as f64;
    Ok(mse.sqrt())
}

/// Mean absolute percentage error as a fraction, skipping zero actuals.
///
/// Returns the value and the number of skipped terms; the value is `None`
/// when every actual is zero.
pub fn mape(forecast: &[f64], actual: &[f64]) -> Result<(Option<f64>, usize)> {
    check_lengths(forecast, actual)?;
    let terms: Vec<f64> = forecast
        .iter()
        .zip(actual)
        .filter(|(_, a)| **a != 0.0)
        .map(|(f, a)| ((a - f) / a).abs())
        .collect();

    let skipped = forecast.len() - terms.len();
    if terms.is_empty() {
        return Ok((None, skipped));
    }
    Ok((Some(terms.iter().sum::<f64>() / terms.len() as f64), skipped))
}

/// Forecast accuracy metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastAccuracy {
    /// Mean Absolute Error
    pub mae: f64,
    /// Mean Squared Error
    pub mse: f64,
    /// Root Mean Squared Error
    pub rmse: f64,
    /// Mean Absolute Percentage Error (fraction, zero actuals skipped)
    pub mape: Option<f64>,
    /// Symmetric Mean Absolute Percentage Error (fraction)
    pub smape: f64,
}

/// Calculate accuracy metrics for a forecast vs actual values
pub fn forecast_accuracy(forecast: &[f64], actual: &[f64]) -> Result<ForecastAccuracy> {
    check_lengths(forecast, actual)?;
    let n = forecast.len() as f64;

    let errors: Vec<f64> = forecast.iter().zip(actual).map(|(f, a)| a - f).collect();
    let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
    let mse = errors.iter().map(|e| e.powi(2)).sum::<f64>() / n;

    let smape = actual
        .iter()
        .zip(forecast)
        .map(|(a, f)| {
            let denom = a.abs() + f.abs();
            if denom == 0.0 {
                0.0
            } else {
                2.0 * (a - f).abs() / denom
            }
        })
        .sum::<f64>()
        / n;

    Ok(ForecastAccuracy {
        mae,
        mse,
        rmse: mse.sqrt(),
        mape: mape(forecast, actual)?.0,
        smape,
    })
}

impl std::fmt::Display for ForecastAccuracy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Forecast Accuracy Metrics:")?;
        writeln!(f, "  MAE:   {:.4}", self.mae)?;
        writeln!(f, "  MSE:   {:.4}", self.mse)?;
        writeln!(f, "  RMSE:  {:.4}", self.rmse)?;
        match self.mape {
            Some(mape) => writeln!(f, "  MAPE:  {:.4}%", mape * 100.0)?,
            None => writeln!(f, "  MAPE:  n/a")?,
        }
        writeln!(f, "  SMAPE: {:.4}%", self.smape * 100.0)?;
        Ok(())
    }
}
