//! ARIMA order selection

use crate::observer::{NoopObserver, PipelineEvent, PipelineObserver};
use crate::series::TimeSeries;
use crate::stationarity::{AdfTest, UnitRootTest};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The ARIMA order triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModelOrder {
    /// AR order
    pub p: usize,
    /// Differencing order
    pub d: usize,
    /// MA order
    pub q: usize,
}

impl ModelOrder {
    /// Create a new order
    pub fn new(p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q }
    }
}

impl From<(usize, usize, usize)> for ModelOrder {
    fn from((p, d, q): (usize, usize, usize)) -> Self {
        Self { p, d, q }
    }
}

impl fmt::Display for ModelOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ARIMA({},{},{})", self.p, self.d, self.q)
    }
}

/// Outcome of the stationarity probe used for order selection
#[derive(Debug, Clone, PartialEq)]
pub enum StationarityProbe {
    /// The test ran and produced a p-value
    Determined { p_value: f64 },
    /// The test could not run on this series
    Indeterminate { reason: String },
}

/// Chooses `(p, d, q)` with fixed `p`/`q` and `d` from one stationarity probe.
///
/// `max_p`, `max_d` and `max_q` bound a future search and are not enforced by
/// the current policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderSelector {
    /// Upper bound on p for a search
    pub max_p: usize,
    /// Upper bound on d for a search
    pub max_d: usize,
    /// Upper bound on q for a search
    pub max_q: usize,
    /// AR order returned by the policy
    pub default_p: usize,
    /// MA order returned by the policy
    pub default_q: usize,
    /// p-values at or above this level select d = 1
    pub alpha: f64,
    /// Test used for the probe
    pub test: AdfTest,
}

impl Default for OrderSelector {
    fn default() -> Self {
        Self {
            max_p: 3,
            max_d: 2,
            max_q: 3,
            default_p: 1,
            default_q: 1,
            alpha: 0.05,
            test: AdfTest::default(),
        }
    }
}

impl OrderSelector {
    /// Create a selector with the given search bounds
    pub fn new(max_p: usize, max_d: usize, max_q: usize) -> Self {
        Self {
            max_p,
            max_d,
            max_q,
            ..Self::default()
        }
    }

    /// Run the stationarity test, turning failures into an indeterminate probe
    pub fn probe(&self, series: &TimeSeries) -> StationarityProbe {
        match self.test.test(&series.drop_missing()) {
            Ok(result) => StationarityProbe::Determined {
                p_value: result.p_value,
            },
            Err(e) => StationarityProbe::Indeterminate {
                reason: e.to_string(),
            },
        }
    }

    /// Select an order for `series`; never fails
    pub fn select_order(
        &self,
        series: &TimeSeries,
        observer: &dyn PipelineObserver,
    ) -> (ModelOrder, StationarityProbe) {
        let probe = self.probe(series);
        let d = match &probe {
            StationarityProbe::Determined { p_value } if *p_value < self.alpha => 0,
            StationarityProbe::Determined { .. } => 1,
            StationarityProbe::Indeterminate { .. } => 1,
        };

        let order = ModelOrder::new(self.default_p, d, self.default_q);
        observer.notify(&PipelineEvent::OrderSelected {
            order,
            probe: probe.clone(),
        });
        (order, probe)
    }
}

/// Select an order with the default policy
pub fn select_order(series: &TimeSeries, max_p: usize, max_d: usize, max_q: usize) -> ModelOrder {
    OrderSelector::new(max_p, max_d, max_q)
        .select_order(series, &NoopObserver)
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::series::{parse_timestamp, Frequency};

    fn series(values: Vec<f64>) -> TimeSeries {
        TimeSeries::from_values(
            "x",
            parse_timestamp("2024-01-01").unwrap(),
            Frequency::daily(),
            values,
        )
        .unwrap()
    }

    #[test]
    fn falls_back_to_one_difference_on_short_series() {
        let selector = OrderSelector::default();
        let (order, probe) = selector.select_order(&series(vec![1.0, 2.0]), &NoopObserver);

        assert_eq!(order, ModelOrder::new(1, 1, 1));
        assert!(matches!(probe, StationarityProbe::Indeterminate { .. }));
    }

    #[test]
    fn falls_back_on_constant_series() {
        assert_eq!(
            select_order(&series(vec![5.0; 50]), 3, 2, 3),
            ModelOrder::new(1, 1, 1)
        );
    }

    #[test]
    fn bounds_do_not_constrain_policy() {
        let selector = OrderSelector::new(0, 0, 0);
        let (order, _) = selector.select_order(&series(vec![1.0]), &NoopObserver);
        assert_eq!(order, ModelOrder::new(1, 1, 1));
    }

    #[test]
    fn displays_order() {
        assert_eq!(ModelOrder::from((2, 1, 0)).to_string(), "ARIMA(2,1,0)");
    }
}
