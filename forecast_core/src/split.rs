//! Chronological train/test split

use crate::error::{ForecastError, Result};
use crate::series::TimeSeries;
use serde::{Deserialize, Serialize};

/// Size of the trailing test segment
///
/// Deserialises from a plain number: values below one are fractions, values
/// of one or more are counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub enum TestSize {
    /// Share of the series, in `[0, 1)`
    Fraction(f64),
    /// Absolute number of points
    Count(usize),
}

impl Default for TestSize {
    fn default() -> Self {
        TestSize::Fraction(0.2)
    }
}

impl TryFrom<f64> for TestSize {
    type Error = ForecastError;

    fn try_from(value: f64) -> Result<Self> {
        if !value.is_finite() || value < 0.0 {
            return Err(ForecastError::Configuration(format!(
                "test_size must be a non-negative number, got {}",
                value
            )));
        }
        if value < 1.0 {
            Ok(TestSize::Fraction(value))
        } else {
            Ok(TestSize::Count(value.trunc() as usize))
        }
    }
}

impl From<TestSize> for f64 {
    fn from(size: TestSize) -> Self {
        match size {
            TestSize::Fraction(f) => f,
            TestSize::Count(c) => c as f64,
        }
    }
}

impl TestSize {
    /// Number of test points for a series of `len`, clamped to `len`
    pub fn resolve(&self, len: usize) -> usize {
        let n_test = match *self {
            TestSize::Fraction(f) => (len as f64 * f).trunc() as usize,
            TestSize::Count(c) => c,
        };
        n_test.min(len)
    }
}

/// Split `series` into a leading train block and a trailing test block
pub fn split(series: &TimeSeries, test_size: TestSize) -> Result<(TimeSeries, TimeSeries)> {
    if let TestSize::Fraction(f) = test_size {
        // the enum can be built directly, bypassing TryFrom
        if !f.is_finite() || !(0.0..1.0).contains(&f) {
            return Err(ForecastError::Configuration(format!(
                "test fraction must be in [0, 1), got {}",
                f
            )));
        }
    }

    let n_test = test_size.resolve(series.len());
    let n_train = series.len() - n_test;
    if n_train == 0 {
        return Err(ForecastError::Configuration(format!(
            "test_size {} leaves no training data in a series of {} points",
            f64::from(test_size),
            series.len()
        )));
    }

    Ok((
        series.slice(0, n_train)?,
        series.slice(n_train, series.len())?,
    ))
}

/// Split with a numeric test size, as accepted by the configuration
pub fn train_test_split(series: &TimeSeries, test_size: f64) -> Result<(TimeSeries, TimeSeries)> {
    split(series, TestSize::try_from(test_size)?)
}
