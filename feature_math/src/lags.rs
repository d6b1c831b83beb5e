//! Lagged copies of a series

use crate::frame::{base_frame, put_column};
use crate::Result;
use forecast_core::TimeSeries;
use polars::prelude::DataFrame;

/// Shift `values` forward by `k` rows; the first `k` rows have no value
pub fn shift(values: &[f64], k: usize) -> Vec<Option<f64>> {
    let k = k.min(values.len());
    let mut out = vec![None; k];
    out.extend(values[..values.len() - k].iter().copied().map(Some));
    out
}

/// Frame with `Date`, `y` and one `lag_{k}` column per requested lag
pub fn create_lag_features(series: &TimeSeries, lags: &[usize]) -> Result<DataFrame> {
    let mut df = base_frame(series)?;
    for &k in lags {
        put_column(&mut df, &format!("lag_{}", k), shift(series.values(), k))?;
    }
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_leaves_leading_gaps() {
        assert_eq!(shift(&[1.0, 2.0, 3.0], 2), vec![None, None, Some(1.0)]);
    }

    #[test]
    fn shift_beyond_length_is_empty() {
        assert_eq!(shift(&[1.0, 2.0], 5), vec![None, None]);
    }

    #[test]
    fn shift_zero_is_identity() {
        assert_eq!(shift(&[1.0, 2.0], 0), vec![Some(1.0), Some(2.0)]);
    }
}
