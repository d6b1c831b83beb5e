//! Seeded synthetic series for demos and tests

use crate::error::{ForecastError, Result};
use crate::series::{Frequency, TimeSeries};
use chrono::{TimeZone, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};

fn noise(len: usize, std_dev: f64, seed: u64) -> Result<Vec<f64>> {
    let normal = Normal::new(0.0, std_dev).map_err(|e| {
        ForecastError::Configuration(format!("Invalid noise standard deviation {}: {}", std_dev, e))
    })?;
    let mut rng = StdRng::seed_from_u64(seed);
    Ok((0..len).map(|_| normal.sample(&mut rng)).collect())
}

fn business_days(name: &str, values: Vec<f64>) -> Result<TimeSeries> {
    let start = Utc
        .with_ymd_and_hms(2020, 1, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| ForecastError::Computation("Invalid synthetic start date".to_string()))?;
    TimeSeries::from_values(name, start, Frequency::BusinessDay, values)
}

/// `intercept + slope * t + ε_t` with Gaussian noise, on business days
pub fn linear_trend_with_noise(
    len: usize,
    intercept: f64,
    slope: f64,
    noise_std: f64,
    seed: u64,
) -> Result<TimeSeries> {
    let values = noise(len, noise_std, seed)?
        .into_iter()
        .enumerate()
        .map(|(t, e)| intercept + slope * t as f64 + e)
        .collect();
    business_days("trend", values)
}

/// Gaussian random walk starting at `start`, on business days
pub fn random_walk(len: usize, start: f64, step_std: f64, seed: u64) -> Result<TimeSeries> {
    let mut level = start;
    let values = noise(len, step_std, seed)?
        .into_iter()
        .map(|step| {
            level += step;
            level
        })
        .collect();
    business_days("random_walk", values)
}

/// Gaussian white noise around `mean`, on business days
pub fn white_noise(len: usize, mean: f64, std_dev: f64, seed: u64) -> Result<TimeSeries> {
    let values = noise(len, std_dev, seed)?
        .into_iter()
        .map(|e| mean + e)
        .collect();
    business_days("white_noise", values)
}
