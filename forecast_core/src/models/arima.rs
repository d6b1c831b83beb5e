//! ARIMA models for time series forecasting
//!
//! Estimation differences the training series `d` times, starts the ARMA
//! coefficients from a Hannan-Rissanen regression and refines them by
//! minimising the conditional sum of squares (CSS) with a Nelder-Mead simplex.

use crate::error::{ForecastError, Result};
use crate::models::{ForecastModel, TrainedForecastModel};
use crate::optimize::{nelder_mead, NelderMeadConfig};
use crate::order::ModelOrder;
use crate::regression::ols;
use crate::series::{Frequency, TimeSeries};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::fmt::Write as _;

/// Simplex restarts after the first Nelder-Mead run
const RESTARTS: usize = 3;

/// Estimation settings for [`ArimaModel`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FitOptions {
    /// Restrict AR coefficients to the stationary region
    pub enforce_stationarity: bool,
    /// Restrict MA coefficients to the invertible region
    pub enforce_invertibility: bool,
    /// Estimate a mean for the differenced series (a drift when `d > 0`)
    pub include_mean: bool,
    /// Optimiser iteration cap
    pub max_iterations: usize,
    /// Relative tolerance on the objective
    pub tolerance: f64,
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            enforce_stationarity: false,
            enforce_invertibility: false,
            include_mean: true,
            max_iterations: 5000,
            tolerance: 1e-10,
        }
    }
}

/// ARIMA model (AutoRegressive Integrated Moving Average)
#[derive(Debug, Clone)]
pub struct ArimaModel {
    /// Name of the model
    name: String,
    /// Model order
    order: ModelOrder,
    /// Estimation settings
    options: FitOptions,
}

impl ArimaModel {
    /// Create a new ARIMA model
    pub fn new(order: ModelOrder) -> Self {
        Self {
            name: order.to_string(),
            order,
            options: FitOptions::default(),
        }
    }

    /// Replace the estimation settings
    pub fn with_options(mut self, options: FitOptions) -> Self {
        self.options = options;
        self
    }

    /// Model order
    pub fn order(&self) -> ModelOrder {
        self.order
    }

    /// Estimation settings
    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Smallest training length this order can be estimated from
    pub fn min_observations(&self) -> usize {
        let ModelOrder { p, d, .. } = self.order;
        let layout = ParamLayout::new(self.order, &self.options);
        // CSS keeps n - d - p residuals, which must exceed the parameter count
        (d + p + layout.len() + 1).max(d + 2)
    }

    fn fit_error(&self, n_obs: usize, reason: impl Into<String>) -> ForecastError {
        ForecastError::ModelFit {
            order: self.order,
            n_obs,
            reason: reason.into(),
        }
    }
}

impl ForecastModel for ArimaModel {
    type Trained = FittedArima;

    fn train(&self, data: &TimeSeries) -> Result<Self::Trained> {
        let n = data.len();
        let ModelOrder { p, d, q } = self.order;

        if data.values().iter().any(|v| !v.is_finite()) {
            return Err(self.fit_error(n, "training series contains missing or non-finite values"));
        }

        let needed = self.min_observations();
        if n < needed {
            return Err(self.fit_error(
                n,
                format!("order needs at least {} observations", needed),
            ));
        }

        let frequency = data
            .frequency()
            .map_err(|e| self.fit_error(n, e.to_string()))?;
        let last_timestamp = data
            .last_timestamp()
            .ok_or_else(|| self.fit_error(n, "training series is empty"))?;

        // last value at every differencing level, used to integrate forecasts
        let mut tails = Vec::with_capacity(d);
        let mut level = data.values().to_vec();
        for _ in 0..d {
            tails.push(*level.last().unwrap_or(&0.0));
            level = level.windows(2).map(|w| w[1] - w[0]).collect();
        }
        let w = level;

        let layout = ParamLayout::new(self.order, &self.options);
        let mu0 = if self.options.include_mean {
            w.iter().sum::<f64>() / w.len() as f64
        } else {
            0.0
        };
        let centered: Vec<f64> = w.iter().map(|v| v - mu0).collect();

        // start values, falling back to zeros outside the admissible region
        let (mut phi0, mut theta0) =
            hannan_rissanen(&centered, p, q).unwrap_or_else(|| (vec![0.0; p], vec![0.0; q]));
        if !is_stationary(&phi0) {
            phi0 = vec![0.0; p];
        }
        if !is_invertible(&theta0) {
            theta0 = vec![0.0; q];
        }

        let start = layout
            .pack(mu0, &phi0, &theta0)
            .ok_or_else(|| self.fit_error(n, "could not build starting parameters"))?;

        let objective = |x: &[f64]| {
            let (mu, phi, theta) = layout.unpack(x);
            // CSS residuals explode outside the invertible region
            if !is_invertible(&theta) {
                return f64::INFINITY;
            }
            let ssr = conditional_ssr(&w, mu, &phi, &theta);
            let value = ssr / (w.len() - p) as f64;
            if value.is_finite() {
                value
            } else {
                f64::INFINITY
            }
        };

        let config = NelderMeadConfig {
            max_iter: self.options.max_iterations,
            f_tolerance: self.options.tolerance,
            ..NelderMeadConfig::default()
        };

        let mut result = nelder_mead(&objective, &start, &config);
        let mut iterations = result.iterations;
        if !start.is_empty() {
            // a fresh simplex around the best point resumes a stalled or collapsed search
            for _ in 0..RESTARTS {
                let restart = nelder_mead(&objective, &result.optimal_point, &config);
                iterations += restart.iterations;
                let settled = result.converged && restart.converged;
                let converged = result.converged || restart.converged;
                if restart.optimal_value <= result.optimal_value {
                    result = restart;
                }
                result.converged = converged;
                if settled {
                    break;
                }
            }
        }

        if !result.optimal_value.is_finite() {
            return Err(self.fit_error(n, "conditional sum of squares is not finite"));
        }
        if !result.converged {
            return Err(self.fit_error(
                n,
                format!("optimizer did not converge after {} iterations", iterations),
            ));
        }

        let (mean, ar, ma) = layout.unpack(&result.optimal_point);
        let residuals = css_residuals(&w, mean, &ar, &ma);
        let n_eff = (w.len() - p) as f64;
        let ssr: f64 = residuals[p..].iter().map(|e| e * e).sum();
        let sigma2 = ssr / n_eff;
        let log_likelihood = -n_eff / 2.0 * ((2.0 * PI * sigma2).ln() + 1.0);
        let k = (layout.len() + 1) as f64;

        Ok(FittedArima {
            name: self.name.clone(),
            series_name: data.name().to_string(),
            order: self.order,
            mean,
            ar,
            ma,
            sigma2,
            log_likelihood,
            aic: -2.0 * log_likelihood + 2.0 * k,
            bic: -2.0 * log_likelihood + k * n_eff.ln(),
            iterations,
            n_obs: n,
            differenced: w,
            residuals,
            tails,
            frequency,
            last_timestamp,
        })
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Trained ARIMA model
#[derive(Debug, Clone)]
pub struct FittedArima {
    name: String,
    series_name: String,
    order: ModelOrder,
    /// Mean of the differenced series
    mean: f64,
    ar: Vec<f64>,
    ma: Vec<f64>,
    /// Innovation variance
    sigma2: f64,
    log_likelihood: f64,
    aic: f64,
    bic: f64,
    iterations: usize,
    n_obs: usize,
    /// Training series differenced `d` times
    differenced: Vec<f64>,
    /// CSS residuals aligned with `differenced`, zero for the first `p`
    residuals: Vec<f64>,
    tails: Vec<f64>,
    frequency: Frequency,
    last_timestamp: DateTime<Utc>,
}

impl FittedArima {
    /// Model order
    pub fn order(&self) -> ModelOrder {
        self.order
    }

    /// Estimated mean of the differenced series
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// AR coefficients `φ_1..φ_p`
    pub fn ar_coefficients(&self) -> &[f64] {
        &self.ar
    }

    /// MA coefficients `θ_1..θ_q`
    pub fn ma_coefficients(&self) -> &[f64] {
        &self.ma
    }

    /// Innovation variance
    pub fn sigma2(&self) -> f64 {
        self.sigma2
    }

    /// Conditional log-likelihood
    pub fn log_likelihood(&self) -> f64 {
        self.log_likelihood
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        self.aic
    }

    /// Bayesian information criterion
    pub fn bic(&self) -> f64 {
        self.bic
    }

    /// Optimiser iterations used
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Length of the training series
    pub fn n_obs(&self) -> usize {
        self.n_obs
    }

    /// Sampling frequency inferred from the training series
    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Last timestamp of the training series
    pub fn last_timestamp(&self) -> DateTime<Utc> {
        self.last_timestamp
    }

    /// Human-readable coefficient table
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{} on {} ({} observations)", self.name, self.series_name, self.n_obs);
        let _ = writeln!(out, "{}", "-".repeat(48));
        let _ = writeln!(out, "{:<12} {:>14}", "mean", format!("{:.6}", self.mean));
        for (i, phi) in self.ar.iter().enumerate() {
            let _ = writeln!(out, "{:<12} {:>14}", format!("ar.L{}", i + 1), format!("{:.6}", phi));
        }
        for (i, theta) in self.ma.iter().enumerate() {
            let _ = writeln!(out, "{:<12} {:>14}", format!("ma.L{}", i + 1), format!("{:.6}", theta));
        }
        let _ = writeln!(out, "{:<12} {:>14}", "sigma2", format!("{:.6}", self.sigma2));
        let _ = writeln!(out, "{}", "-".repeat(48));
        let _ = writeln!(
            out,
            "log-lik {:.3}  AIC {:.3}  BIC {:.3}  iterations {}",
            self.log_likelihood, self.aic, self.bic, self.iterations
        );
        out
    }
}

impl TrainedForecastModel for FittedArima {
    fn forecast(&self, steps: usize) -> Result<TimeSeries> {
        let p = self.ar.len();
        let q = self.ma.len();

        let mut x: Vec<f64> = self.differenced.iter().map(|v| v - self.mean).collect();
        let mut e = self.residuals.clone();
        let mut values = Vec::with_capacity(steps);

        for _ in 0..steps {
            let t = x.len();
            let mut next = 0.0;
            for i in 1..=p.min(t) {
                next += self.ar[i - 1] * x[t - i];
            }
            for j in 1..=q.min(t) {
                next += self.ma[j - 1] * e[t - j];
            }
            x.push(next);
            e.push(0.0);
            values.push(next + self.mean);
        }

        // undo differencing, innermost level first
        for tail in self.tails.iter().rev() {
            let mut acc = *tail;
            values = values
                .into_iter()
                .map(|v| {
                    acc += v;
                    acc
                })
                .collect();
        }

        if values.iter().any(|v| !v.is_finite()) {
            return Err(ForecastError::Computation(format!(
                "{} produced a non-finite forecast",
                self.name
            )));
        }

        let timestamps = self.frequency.future_timestamps(self.last_timestamp, steps);
        TimeSeries::new(format!("{}_forecast", self.series_name), timestamps, values)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Where each parameter lives in the optimiser's vector
#[derive(Debug, Clone, Copy)]
struct ParamLayout {
    include_mean: bool,
    p: usize,
    q: usize,
    enforce_stationarity: bool,
    enforce_invertibility: bool,
}

impl ParamLayout {
    fn new(order: ModelOrder, options: &FitOptions) -> Self {
        Self {
            include_mean: options.include_mean,
            p: order.p,
            q: order.q,
            enforce_stationarity: options.enforce_stationarity,
            enforce_invertibility: options.enforce_invertibility,
        }
    }

    fn len(&self) -> usize {
        self.include_mean as usize + self.p + self.q
    }

    fn unpack(&self, x: &[f64]) -> (f64, Vec<f64>, Vec<f64>) {
        let offset = self.include_mean as usize;
        let mu = if self.include_mean { x[0] } else { 0.0 };
        let ar_raw = &x[offset..offset + self.p];
        let ma_raw = &x[offset + self.p..offset + self.p + self.q];

        let phi = if self.enforce_stationarity {
            constrain_stationary(ar_raw)
        } else {
            ar_raw.to_vec()
        };
        let theta = if self.enforce_invertibility {
            constrain_invertible(ma_raw)
        } else {
            ma_raw.to_vec()
        };
        (mu, phi, theta)
    }

    fn pack(&self, mu: f64, phi: &[f64], theta: &[f64]) -> Option<Vec<f64>> {
        let mut x = Vec::with_capacity(self.len());
        if self.include_mean {
            x.push(mu);
        }
        if self.enforce_stationarity {
            x.extend(unconstrain_stationary(phi)?);
        } else {
            x.extend_from_slice(phi);
        }
        if self.enforce_invertibility {
            x.extend(unconstrain_invertible(theta)?);
        } else {
            x.extend_from_slice(theta);
        }
        Some(x)
    }
}

/// CSS residuals `e_t = x_t - Σφ_i x_{t-i} - Σθ_j e_{t-j}` with `x = w - μ`,
/// conditioning on the first `p` observations (their residuals are zero)
fn css_residuals(w: &[f64], mu: f64, phi: &[f64], theta: &[f64]) -> Vec<f64> {
    let p = phi.len();
    let x: Vec<f64> = w.iter().map(|v| v - mu).collect();
    let mut e = vec![0.0; x.len()];

    for t in p..x.len() {
        let mut prediction = 0.0;
        for (i, coef) in phi.iter().enumerate() {
            prediction += coef * x[t - i - 1];
        }
        for (j, coef) in theta.iter().enumerate() {
            if t > j {
                prediction += coef * e[t - j - 1];
            }
        }
        e[t] = x[t] - prediction;
    }

    e
}

fn conditional_ssr(w: &[f64], mu: f64, phi: &[f64], theta: &[f64]) -> f64 {
    css_residuals(w, mu, phi, theta)[phi.len()..]
        .iter()
        .map(|e| e * e)
        .sum()
}

/// Two-stage Hannan-Rissanen estimate on a centred series
fn hannan_rissanen(x: &[f64], p: usize, q: usize) -> Option<(Vec<f64>, Vec<f64>)> {
    let n = x.len();
    if p == 0 && q == 0 {
        return Some((Vec::new(), Vec::new()));
    }

    let lagged = |t: usize, k: usize| (1..=k).map(move |i| x[t - i]);

    if q == 0 {
        let rows: Vec<Vec<f64>> = (p..n).map(|t| lagged(t, p).collect()).collect();
        let fit = ols(&x[p..], &rows).ok()?;
        return Some((fit.coefficients, Vec::new()));
    }

    // long autoregression for proxy innovations
    let long = (p + q).max(10).min(n / 4);
    if long == 0 {
        return None;
    }
    let rows: Vec<Vec<f64>> = (long..n).map(|t| lagged(t, long).collect()).collect();
    let long_fit = ols(&x[long..], &rows).ok()?;
    let mut innovations = vec![0.0; n];
    innovations[long..].copy_from_slice(&long_fit.residuals);

    let start = (long + q).max(p);
    if start >= n {
        return None;
    }
    let rows: Vec<Vec<f64>> = (start..n)
        .map(|t| {
            lagged(t, p)
                .chain((1..=q).map(|j| innovations[t - j]))
                .collect()
        })
        .collect();
    let fit = ols(&x[start..], &rows).ok()?;
    if fit.coefficients.iter().any(|c| !c.is_finite()) {
        return None;
    }

    let (phi, theta) = fit.coefficients.split_at(p);
    Some((phi.to_vec(), theta.to_vec()))
}

/// Map unconstrained values to a stationary AR polynomial through partial
/// autocorrelations in (-1, 1)
pub fn constrain_stationary(unconstrained: &[f64]) -> Vec<f64> {
    let mut phi: Vec<f64> = Vec::with_capacity(unconstrained.len());
    for (k, r) in unconstrained.iter().enumerate() {
        let pacf = r / (1.0 + r * r).sqrt();
        let previous = phi.clone();
        for j in 0..k {
            phi[j] = previous[j] - pacf * previous[k - 1 - j];
        }
        phi.push(pacf);
    }
    phi
}

/// Inverse of [`constrain_stationary`]; `None` outside the stationary region
pub fn unconstrain_stationary(phi: &[f64]) -> Option<Vec<f64>> {
    let p = phi.len();
    let mut current = phi.to_vec();
    let mut unconstrained = vec![0.0; p];

    for k in (0..p).rev() {
        let pacf = current[k];
        if !pacf.is_finite() || pacf.abs() >= 1.0 {
            return None;
        }
        unconstrained[k] = pacf / (1.0 - pacf * pacf).sqrt();
        let denom = 1.0 - pacf * pacf;
        current = (0..k)
            .map(|j| (current[j] + pacf * current[k - 1 - j]) / denom)
            .collect();
    }

    Some(unconstrained)
}

/// Map unconstrained values to an invertible MA polynomial
pub fn constrain_invertible(unconstrained: &[f64]) -> Vec<f64> {
    constrain_stationary(unconstrained)
        .into_iter()
        .map(|c| -c)
        .collect()
}

/// Inverse of [`constrain_invertible`]; `None` outside the invertible region
pub fn unconstrain_invertible(theta: &[f64]) -> Option<Vec<f64>> {
    let negated: Vec<f64> = theta.iter().map(|c| -c).collect();
    unconstrain_stationary(&negated)
}

/// Whether `x_t = Σφ_i x_{t-i} + e_t` is stationary
pub fn is_stationary(phi: &[f64]) -> bool {
    unconstrain_stationary(phi).is_some()
}

/// Whether `x_t = e_t + Σθ_j e_{t-j}` is invertible
pub fn is_invertible(theta: &[f64]) -> bool {
    unconstrain_invertible(theta).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::parse_timestamp;
    use approx::assert_abs_diff_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal};

    fn business_series(values: Vec<f64>) -> TimeSeries {
        TimeSeries::from_values(
            "y",
            parse_timestamp("2024-01-01").unwrap(),
            Frequency::BusinessDay,
            values,
        )
        .unwrap()
    }

    fn ar1(n: usize, phi: f64, seed: u64) -> Vec<f64> {
        let mut rng = StdRng::seed_from_u64(seed);
        let normal = Normal::new(0.0, 1.0).unwrap();
        let mut x = vec![0.0; n];
        for t in 1..n {
            x[t] = phi * x[t - 1] + normal.sample(&mut rng);
        }
        x
    }

    #[test]
    fn stationary_transform_round_trips() {
        let phi = vec![0.5, -0.2, 0.1];
        let raw = unconstrain_stationary(&phi).unwrap();
        let back = constrain_stationary(&raw);
        for (a, b) in phi.iter().zip(&back) {
            assert_abs_diff_eq!(a, b, epsilon = 1e-12);
        }
    }

    #[test]
    fn constrained_values_are_admissible() {
        assert!(is_stationary(&constrain_stationary(&[5.0, -3.0])));
        assert!(is_invertible(&constrain_invertible(&[-4.0])));
        assert!(!is_stationary(&[1.2]));
        assert!(!is_invertible(&[-1.0]));
    }

    #[test]
    fn recovers_ar_coefficient() {
        let model = ArimaModel::new(ModelOrder::new(1, 0, 0));
        let fitted = model.train(&business_series(ar1(600, 0.6, 7))).unwrap();

        assert_abs_diff_eq!(fitted.ar_coefficients()[0], 0.6, epsilon = 0.1);
        assert_abs_diff_eq!(fitted.sigma2(), 1.0, epsilon = 0.2);
    }

    #[test]
    fn enforced_fit_stays_in_region() {
        let options = FitOptions {
            enforce_stationarity: true,
            enforce_invertibility: true,
            ..FitOptions::default()
        };
        let model = ArimaModel::new(ModelOrder::new(1, 0, 1)).with_options(options);
        let fitted = model.train(&business_series(ar1(300, 0.8, 11))).unwrap();

        assert!(is_stationary(fitted.ar_coefficients()));
        assert!(is_invertible(fitted.ma_coefficients()));
    }

    #[test]
    fn forecast_continues_timestamps_and_integrates() {
        let values: Vec<f64> = (0..60).map(|i| 10.0 + 2.0 * i as f64).collect();
        let series = business_series(values);
        let model = ArimaModel::new(ModelOrder::new(0, 1, 0));
        let fitted = model.train(&series).unwrap();

        let forecast = fitted.forecast(3).unwrap();
        assert_eq!(forecast.len(), 3);
        assert_abs_diff_eq!(forecast.values()[0], 130.0, epsilon = 1e-6);
        assert_abs_diff_eq!(forecast.values()[2], 134.0, epsilon = 1e-6);
        assert_eq!(
            forecast.timestamps()[0],
            Frequency::BusinessDay.step(series.last_timestamp().unwrap())
        );
    }

    #[test]
    fn rejects_short_series() {
        let model = ArimaModel::new(ModelOrder::new(2, 1, 2));
        let result = model.train(&business_series(vec![1.0, 2.0, 3.0, 2.0]));

        match result {
            Err(ForecastError::ModelFit { order, n_obs, .. }) => {
                assert_eq!(order, ModelOrder::new(2, 1, 2));
                assert_eq!(n_obs, 4);
            }
            other => panic!("expected ModelFit, got {:?}", other),
        }
    }

    #[test]
    fn rejects_missing_values() {
        let mut values = ar1(50, 0.3, 3);
        values[10] = f64::NAN;
        let result = ArimaModel::new(ModelOrder::new(1, 0, 0)).train(&business_series(values));
        assert!(matches!(result, Err(ForecastError::ModelFit { .. })));
    }

    #[test]
    fn summary_lists_coefficients() {
        let fitted = ArimaModel::new(ModelOrder::new(1, 0, 1))
            .train(&business_series(ar1(200, 0.5, 5)))
            .unwrap();
        let summary = fitted.summary();
        assert!(summary.contains("ARIMA(1,0,1)"));
        assert!(summary.contains("ar.L1"));
        assert!(summary.contains("ma.L1"));
    }
}
