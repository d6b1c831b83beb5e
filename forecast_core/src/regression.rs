//! Ordinary least squares used by the unit-root test and model initialisation

use crate::error::{ForecastError, Result};
use nalgebra::{DMatrix, DVector};
use std::f64::consts::PI;

/// Fitted OLS regression
#[derive(Debug, Clone)]
pub struct OlsFit {
    /// Estimated coefficients, one per design column
    pub coefficients: Vec<f64>,
    /// Standard errors of the coefficients
    pub std_errors: Vec<f64>,
    /// Residuals `y - Xβ`
    pub residuals: Vec<f64>,
    /// Sum of squared residuals
    pub ssr: f64,
    /// Number of observations (rows)
    pub nobs: usize,
}

impl OlsFit {
    /// Number of estimated coefficients
    pub fn num_params(&self) -> usize {
        self.coefficients.len()
    }

    /// t-statistic of the coefficient at `index`
    pub fn t_value(&self, index: usize) -> f64 {
        self.coefficients[index] / self.std_errors[index]
    }

    /// Gaussian log-likelihood at the OLS estimate
    pub fn log_likelihood(&self) -> f64 {
        let n = self.nobs as f64;
        -n / 2.0 * ((2.0 * PI).ln() + (self.ssr / n).ln() + 1.0)
    }

    /// Akaike information criterion
    pub fn aic(&self) -> f64 {
        -2.0 * self.log_likelihood() + 2.0 * self.num_params() as f64
    }

    /// Bayesian information criterion
    pub fn bic(&self) -> f64 {
        -2.0 * self.log_likelihood() + self.num_params() as f64 * (self.nobs as f64).ln()
    }
}

/// Fit `y = Xβ + ε` where `rows` holds the design matrix row by row
pub fn ols(y: &[f64], rows: &[Vec<f64>]) -> Result<OlsFit> {
    let n = y.len();
    if rows.len() != n {
        return Err(ForecastError::Computation(format!(
            "Design matrix has {} rows but response has {}",
            rows.len(),
            n
        )));
    }

    let k = rows.first().map(|r| r.len()).unwrap_or(0);
    if k == 0 || n <= k {
        return Err(ForecastError::insufficient("least squares regression", k + 1, n));
    }

    let x = DMatrix::from_fn(n, k, |i, j| rows[i][j]);
    let y_vec = DVector::from_column_slice(y);

    // OLS: β = (X'X)^(-1) X'y
    let xtx = x.transpose() * &x;
    let xtx_inv = xtx.try_inverse().ok_or_else(|| {
        ForecastError::Computation("Singular design matrix in least squares".to_string())
    })?;
    let beta = &xtx_inv * (x.transpose() * &y_vec);

    let residuals = &y_vec - &x * &beta;
    let ssr = residuals.iter().map(|r| r * r).sum::<f64>();
    let sigma2 = ssr / (n - k) as f64;

    let std_errors = (0..k).map(|j| (sigma2 * xtx_inv[(j, j)]).sqrt()).collect();

    Ok(OlsFit {
        coefficients: beta.iter().copied().collect(),
        std_errors,
        residuals: residuals.iter().copied().collect(),
        ssr,
        nobs: n,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn recovers_exact_line() {
        let y: Vec<f64> = (0..10).map(|i| 2.0 + 0.5 * i as f64).collect();
        let rows: Vec<Vec<f64>> = (0..10).map(|i| vec![1.0, i as f64]).collect();

        let fit = ols(&y, &rows).unwrap();
        assert_relative_eq!(fit.coefficients[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(fit.coefficients[1], 0.5, epsilon = 1e-9);
        assert!(fit.ssr < 1e-12);
    }

    #[test]
    fn rejects_underdetermined_system() {
        let rows = vec![vec![1.0, 0.0], vec![1.0, 1.0]];
        let result = ols(&[1.0, 2.0], &rows);
        assert!(matches!(
            result,
            Err(ForecastError::InsufficientData { .. })
        ));
    }

    #[test]
    fn rejects_collinear_columns() {
        let rows: Vec<Vec<f64>> = (0..6).map(|i| vec![i as f64, 2.0 * i as f64]).collect();
        let y = vec![1.0, 2.0, 3.0, 4.0, 5.0, 7.0];
        assert!(matches!(ols(&y, &rows), Err(ForecastError::Computation(_))));
    }
}
