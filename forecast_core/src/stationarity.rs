//! Unit-root testing
//!
//! The Augmented Dickey-Fuller test regresses the first difference of the
//! series on its lagged level, a constant and lagged differences:
//!
//! ```text
//! Δy_t = β·y_{t-1} + Σ γ_i·Δy_{t-i} + α + ε_t
//! ```
//!
//! H0: the series has a unit root (β = 0, non-stationary).
//! Rejecting H0 (small p-value) means the series looks stationary.

use crate::error::{ForecastError, Result};
use crate::regression::{ols, OlsFit};
use crate::series::TimeSeries;
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// |t| threshold used by the t-stat lag selection (two-sided 10%)
const TSTAT_STOP: f64 = 1.644_853_626_951_472_2;

/// MacKinnon (1994) bounds and polynomials, constant-only regression, one variable
const TAU_MAX_C: f64 = 2.74;
const TAU_MIN_C: f64 = -18.83;
const TAU_STAR_C: f64 = -1.61;
const TAU_C_SMALLP: [f64; 3] = [2.1659, 1.4412, 0.038269];
const TAU_C_LARGEP: [f64; 4] = [1.7339, 0.93202, -0.12745, -0.010368];

/// MacKinnon (2010) response surface for critical values, constant-only regression
const TAU_C_2010: [(&str, [f64; 4]); 3] = [
    ("1%", [-3.43035, -6.5393, -16.786, -79.433]),
    ("5%", [-2.86154, -2.8903, -4.234, -40.040]),
    ("10%", [-2.56677, -1.5384, -2.809, 0.0]),
];

/// Lag-length selection for the augmented regression
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Autolag {
    /// Minimise the Akaike information criterion
    #[default]
    Aic,
    /// Minimise the Bayesian information criterion
    Bic,
    /// Drop lags from the maximum until the last one is significant
    TStat,
    /// Always use the maximum lag
    Fixed,
}

impl FromStr for Autolag {
    type Err = ForecastError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "aic" => Ok(Autolag::Aic),
            "bic" => Ok(Autolag::Bic),
            "t-stat" | "tstat" => Ok(Autolag::TStat),
            "none" | "fixed" => Ok(Autolag::Fixed),
            other => Err(ForecastError::Configuration(format!(
                "Unknown autolag criterion: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Autolag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Autolag::Aic => "AIC",
            Autolag::Bic => "BIC",
            Autolag::TStat => "t-stat",
            Autolag::Fixed => "fixed",
        };
        write!(f, "{}", name)
    }
}

/// Outcome of a unit-root test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationarityResult {
    /// ADF t-statistic of the lagged level
    pub test_statistic: f64,
    /// Approximate p-value in [0, 1]
    pub p_value: f64,
    /// Number of lagged differences in the final regression
    pub used_lag: usize,
    /// Observations used by the final regression
    pub n_obs: usize,
    /// Critical values keyed by significance label ("1%", "5%", "10%")
    pub critical_values: BTreeMap<String, f64>,
    /// Criterion value of the selected lag, absent for fixed lags
    pub information_criterion: Option<f64>,
}

impl StationarityResult {
    /// Whether the unit-root null is rejected at level `alpha`
    pub fn rejects_unit_root(&self, alpha: f64) -> bool {
        self.p_value < alpha
    }
}

impl fmt::Display for StationarityResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ADF statistic {:.4}, p-value {:.4}, lags {}, nobs {}",
            self.test_statistic, self.p_value, self.used_lag, self.n_obs
        )
    }
}

/// A statistical test for a unit root
pub trait UnitRootTest {
    /// Run the test on a series without missing values
    fn test(&self, series: &TimeSeries) -> Result<StationarityResult>;
}

/// Augmented Dickey-Fuller test with a constant term
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AdfTest {
    /// Lag selection criterion
    pub autolag: Autolag,
    /// Upper bound for the lag search, `12·(n/100)^¼` when absent
    pub max_lag: Option<usize>,
}

impl AdfTest {
    /// Create a test using the given lag selection criterion
    pub fn new(autolag: Autolag) -> Self {
        Self {
            autolag,
            max_lag: None,
        }
    }

    /// Set an explicit upper bound for the lag search
    pub fn with_max_lag(mut self, max_lag: usize) -> Self {
        self.max_lag = Some(max_lag);
        self
    }

    fn resolve_max_lag(&self, nobs: usize) -> Result<usize> {
        // nobs/2 - 1 - (number of trend terms)
        let cap = (nobs / 2) as i64 - 2;
        if cap < 0 {
            return Err(ForecastError::insufficient("ADF test", 4, nobs));
        }
        let cap = cap as usize;

        match self.max_lag {
            Some(lag) if lag > cap => Err(ForecastError::insufficient(
                format!("ADF test with max lag {}", lag),
                2 * lag + 4,
                nobs,
            )),
            Some(lag) => Ok(lag),
            None => {
                let default = (12.0 * (nobs as f64 / 100.0).powf(0.25)).ceil() as usize;
                Ok(default.min(cap))
            }
        }
    }

    /// Pick the lag length on a common sample starting after `max_lag`
    fn select_lag(&self, x: &[f64], dx: &[f64], max_lag: usize) -> Result<(usize, Option<f64>)> {
        match self.autolag {
            Autolag::Fixed => Ok((max_lag, None)),
            Autolag::Aic | Autolag::Bic => {
                let mut best: Option<(usize, f64)> = None;
                for lag in 0..=max_lag {
                    let fit = match adf_regression(x, dx, lag, max_lag) {
                        Ok(fit) => fit,
                        Err(ForecastError::Computation(_)) => continue,
                        Err(e) => return Err(e),
                    };
                    let ic = if self.autolag == Autolag::Aic {
                        fit.aic()
                    } else {
                        fit.bic()
                    };
                    if best.map_or(true, |(_, b)| ic < b) {
                        best = Some((lag, ic));
                    }
                }
                let (lag, ic) = best.ok_or_else(|| {
                    ForecastError::Computation(
                        "No lag length produced a solvable ADF regression".to_string(),
                    )
                })?;
                Ok((lag, Some(ic)))
            }
            Autolag::TStat => {
                let mut selected = (0, None);
                for lag in (0..=max_lag).rev() {
                    let fit = adf_regression(x, dx, lag, max_lag)?;
                    // last augmentation lag, or the level when there is none
                    let t = fit.t_value(lag).abs();
                    selected = (lag, Some(t));
                    if t >= TSTAT_STOP {
                        break;
                    }
                }
                Ok(selected)
            }
        }
    }
}

impl UnitRootTest for AdfTest {
    fn test(&self, series: &TimeSeries) -> Result<StationarityResult> {
        let x = series.values();
        let nobs = x.len();

        if x.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::InvalidSeries(
                "ADF test requires a series without missing values".to_string(),
            ));
        }
        if nobs < 4 {
            return Err(ForecastError::insufficient("ADF test", 4, nobs));
        }
        if series.is_constant() {
            return Err(ForecastError::ConstantSeries {
                len: nobs,
                value: x[0],
            });
        }

        let max_lag = self.resolve_max_lag(nobs)?;
        let dx: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();

        let (used_lag, information_criterion) = self.select_lag(x, &dx, max_lag)?;

        // rerun on the full sample available at the chosen lag
        let fit = adf_regression(x, &dx, used_lag, used_lag)?;
        let test_statistic = fit.t_value(0);
        if !test_statistic.is_finite() {
            return Err(ForecastError::Computation(format!(
                "ADF regression produced a non-finite statistic ({} observations)",
                fit.nobs
            )));
        }

        Ok(StationarityResult {
            test_statistic,
            p_value: mackinnon_p_value(test_statistic)?,
            used_lag,
            n_obs: fit.nobs,
            critical_values: mackinnon_critical_values(fit.nobs),
            information_criterion,
        })
    }
}

/// Regress `Δy_t` on `[y_{t-1}, Δy_{t-1}, …, Δy_{t-lag}, 1]` starting at `start`
fn adf_regression(x: &[f64], dx: &[f64], lag: usize, start: usize) -> Result<OlsFit> {
    let rows: Vec<Vec<f64>> = (start..dx.len())
        .map(|t| {
            let mut row = Vec::with_capacity(lag + 2);
            row.push(x[t]);
            row.extend((1..=lag).map(|i| dx[t - i]));
            row.push(1.0);
            row
        })
        .collect();

    ols(&dx[start..], &rows)
}

/// Approximate p-value of an ADF statistic (MacKinnon 1994)
pub fn mackinnon_p_value(stat: f64) -> Result<f64> {
    if stat > TAU_MAX_C {
        return Ok(1.0);
    }
    if stat < TAU_MIN_C {
        return Ok(0.0);
    }

    let coefficients: &[f64] = if stat <= TAU_STAR_C {
        &TAU_C_SMALLP
    } else {
        &TAU_C_LARGEP
    };
    let z = coefficients
        .iter()
        .rev()
        .fold(0.0, |acc, c| acc * stat + c);

    let normal = Normal::new(0.0, 1.0)
        .map_err(|e| ForecastError::Computation(format!("Normal distribution: {}", e)))?;
    Ok(normal.cdf(z))
}

/// Finite-sample critical values (MacKinnon 2010)
pub fn mackinnon_critical_values(nobs: usize) -> BTreeMap<String, f64> {
    let n = nobs as f64;
    TAU_C_2010
        .iter()
        .map(|(label, b)| {
            let value = b[0] + b[1] / n + b[2] / n.powi(2) + b[3] / n.powi(3);
            (label.to_string(), value)
        })
        .collect()
}
