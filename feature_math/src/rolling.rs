//! Rolling-window statistics
//!
//! Windows follow trailing semantics: the value at row `i` summarises rows
//! `i + 1 - window ..= i`, and rows before the first full window are null.

use crate::frame::{base_frame, put_column};
use crate::{FeatureError, Result};
use forecast_core::TimeSeries;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

/// Statistic computed over a rolling window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RollingStat {
    Mean,
    /// Sample standard deviation (ddof = 1)
    Std,
    Min,
    Max,
}

impl RollingStat {
    /// Statistics used when none are requested
    pub const DEFAULT: [RollingStat; 2] = [RollingStat::Mean, RollingStat::Std];
}

impl FromStr for RollingStat {
    type Err = FeatureError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mean" => Ok(RollingStat::Mean),
            "std" => Ok(RollingStat::Std),
            "min" => Ok(RollingStat::Min),
            "max" => Ok(RollingStat::Max),
            other => Err(FeatureError::UnknownStatistic(other.to_string())),
        }
    }
}

impl fmt::Display for RollingStat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RollingStat::Mean => "mean",
            RollingStat::Std => "std",
            RollingStat::Min => "min",
            RollingStat::Max => "max",
        };
        f.write_str(name)
    }
}

/// Fixed-size trailing window
#[derive(Debug, Clone)]
pub struct RollingWindow {
    window: usize,
    values: VecDeque<f64>,
}

impl RollingWindow {
    /// Create a new window holding `window` values
    pub fn new(window: usize) -> Result<Self> {
        if window == 0 {
            return Err(FeatureError::InvalidInput(
                "Window must be greater than zero".to_string(),
            ));
        }

        Ok(Self {
            window,
            values: VecDeque::with_capacity(window),
        })
    }

    /// Push a value, evicting the oldest once full
    pub fn update(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > self.window {
            self.values.pop_front();
        }
    }

    /// Number of values the window summarises
    pub fn window(&self) -> usize {
        self.window
    }

    /// Whether `window` values have been pushed
    pub fn is_full(&self) -> bool {
        self.values.len() == self.window
    }

    /// Statistic over the current window; `None` until full or if any value is `NaN`
    pub fn value(&self, stat: RollingStat) -> Option<f64> {
        if !self.is_full() || self.values.iter().any(|v| v.is_nan()) {
            return None;
        }

        let n = self.window as f64;
        let value = match stat {
            RollingStat::Mean => self.values.iter().sum::<f64>() / n,
            RollingStat::Std => {
                if self.window < 2 {
                    return None;
                }
                let mean = self.values.iter().sum::<f64>() / n;
                let ss: f64 = self.values.iter().map(|v| (v - mean).powi(2)).sum();
                (ss / (n - 1.0)).sqrt()
            }
            RollingStat::Min => self.values.iter().copied().fold(f64::INFINITY, f64::min),
            RollingStat::Max => self
                .values
                .iter()
                .copied()
                .fold(f64::NEG_INFINITY, f64::max),
        };
        Some(value)
    }
}

/// Trailing rolling statistic over `values`
pub fn rolling(values: &[f64], window: usize, stat: RollingStat) -> Result<Vec<Option<f64>>> {
    let mut state = RollingWindow::new(window)?;
    Ok(values
        .iter()
        .map(|&v| {
            state.update(v);
            state.value(stat)
        })
        .collect())
}

/// Frame with `Date`, `y` and one `roll_{w}_{stat}` column per window and statistic
///
/// An empty `stats` slice falls back to mean and std.
pub fn create_rolling_features(
    series: &TimeSeries,
    windows: &[usize],
    stats: &[RollingStat],
) -> Result<DataFrame> {
    let stats = if stats.is_empty() {
        &RollingStat::DEFAULT[..]
    } else {
        stats
    };

    let mut df = base_frame(series)?;
    for &window in windows {
        for &stat in stats {
            let column = rolling(series.values(), window, stat)?;
            put_column(&mut df, &format!("roll_{}_{}", window, stat), column)?;
        }
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn window_of_zero_is_invalid() {
        assert!(RollingWindow::new(0).is_err());
        assert!(rolling(&[1.0], 0, RollingStat::Mean).is_err());
    }

    #[test]
    fn rolling_mean_has_empty_prefix() {
        let out = rolling(&[1.0, 2.0, 3.0, 4.0], 3, RollingStat::Mean).unwrap();
        assert_eq!(out, vec![None, None, Some(2.0), Some(3.0)]);
    }

    #[test]
    fn rolling_std_uses_sample_variance() {
        let out = rolling(&[2.0, 4.0, 4.0, 4.0, 5.0], 5, RollingStat::Std).unwrap();
        // mean 3.8, squared deviations sum to 4.8
        assert_relative_eq!(out[4].unwrap(), (4.8f64 / 4.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn nan_inside_window_gives_no_value() {
        let out = rolling(&[1.0, f64::NAN, 3.0, 4.0, 5.0], 2, RollingStat::Max).unwrap();
        assert_eq!(out, vec![None, None, None, Some(4.0), Some(5.0)]);
    }

    #[test]
    fn window_reports_fill_state() {
        let mut window = RollingWindow::new(2).unwrap();
        window.update(1.0);
        assert!(!window.is_full());
        assert_eq!(window.value(RollingStat::Mean), None);

        window.update(3.0);
        window.update(5.0);
        assert!(window.is_full());
        assert_eq!(window.window(), 2);
        assert_eq!(window.value(RollingStat::Min), Some(3.0));

        let mut single = RollingWindow::new(1).unwrap();
        single.update(2.0);
        assert_eq!(single.value(RollingStat::Std), None);
    }

    #[test]
    fn parses_statistic_names() {
        assert_eq!("Mean".parse::<RollingStat>().unwrap(), RollingStat::Mean);
        assert_eq!(" max ".parse::<RollingStat>().unwrap(), RollingStat::Max);
        assert!(matches!(
            "median".parse::<RollingStat>(),
            Err(FeatureError::UnknownStatistic(_))
        ));
        assert_eq!(RollingStat::Std.to_string(), "std");
    }
}
