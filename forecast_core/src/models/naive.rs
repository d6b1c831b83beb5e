//! Naive baseline: repeat the last observed value

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::series::{Frequency, TimeSeries};
use chrono::{DateTime, Utc};

/// Naive forecaster
#[derive(Debug, Clone, Default)]
pub struct NaiveModel;

impl NaiveModel {
    /// Create a new naive model
    pub fn new() -> Self {
        Self
    }
}

/// Trained naive model
#[derive(Debug, Clone)]
pub struct FittedNaive {
    series_name: String,
    last_value: f64,
    last_timestamp: DateTime<Utc>,
    frequency: Frequency,
}

impl FittedNaive {
    /// The value every forecast repeats
    pub fn last_value(&self) -> f64 {
        self.last_value
    }
}

impl ForecastModel for NaiveModel {
    type Trained = FittedNaive;

    fn train(&self, data: &TimeSeries) -> Result<Self::Trained> {
        let clean = data.drop_missing();
        let (last_value, last_timestamp) = match (clean.last_value(), clean.last_timestamp()) {
            (Some(v), Some(t)) => (v, t),
            _ => return Err(ForecastError::insufficient("naive forecast", 1, 0)),
        };
        let frequency = data.frequency().unwrap_or_else(|_| Frequency::daily());

        Ok(FittedNaive {
            series_name: data.name().to_string(),
            last_value,
            last_timestamp,
            frequency,
        })
    }

    fn name(&self) -> &str {
        "Naive"
    }
}

impl TrainedForecastModel for FittedNaive {
    fn forecast(&self, steps: usize) -> Result<TimeSeries> {
        TimeSeries::new(
            format!("{}_naive", self.series_name),
            self.frequency.future_timestamps(self.last_timestamp, steps),
            vec![self.last_value; steps],
        )
    }

    fn name(&self) -> &str {
        "Naive"
    }
}
