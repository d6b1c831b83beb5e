//! Differencing until the unit-root test rejects

use crate::error::{ForecastError, Result};
use crate::observer::{NoopObserver, PipelineEvent, PipelineObserver};
use crate::series::TimeSeries;
use crate::stationarity::{AdfTest, StationarityResult, UnitRootTest};
use serde::{Deserialize, Serialize};

/// Limits for the differencing loop
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifferencingConfig {
    /// Maximum number of first differences to apply
    pub max_diff: usize,
    /// Significance level at which the unit root is rejected
    pub alpha: f64,
}

impl Default for DifferencingConfig {
    fn default() -> Self {
        Self {
            max_diff: 2,
            alpha: 0.05,
        }
    }
}

impl DifferencingConfig {
    /// Validate the significance level
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(ForecastError::Configuration(format!(
                "alpha must be between 0 and 1, got {}",
                self.alpha
            )));
        }
        Ok(())
    }
}

/// Result of [`Differencer::make_stationary`]
#[derive(Debug, Clone, PartialEq)]
pub struct DifferencingOutcome {
    /// The (possibly) differenced series
    pub series: TimeSeries,
    /// How many first differences were applied
    pub order: usize,
    /// Whether the last test rejected the unit root
    pub stationary: bool,
    /// The last test that ran
    pub last_test: Option<StationarityResult>,
}

/// Applies first differences until the series tests stationary
#[derive(Debug, Clone)]
pub struct Differencer<T = AdfTest> {
    tester: T,
    config: DifferencingConfig,
}

impl Differencer<AdfTest> {
    /// Create a differencer backed by the default ADF test
    pub fn new(config: DifferencingConfig) -> Self {
        Self {
            tester: AdfTest::default(),
            config,
        }
    }
}

impl<T: UnitRootTest> Differencer<T> {
    /// Create a differencer backed by a custom unit-root test
    pub fn with_tester(tester: T, config: DifferencingConfig) -> Self {
        Self { tester, config }
    }

    /// The configured limits
    pub fn config(&self) -> &DifferencingConfig {
        &self.config
    }

    /// Difference `series` until the test rejects the unit root at `alpha`.
    ///
    /// Reaching `max_diff` without rejection is not an error: the series at
    /// that order is returned with `stationary == false`. Test failures
    /// (too short, constant) propagate.
    pub fn make_stationary(
        &self,
        series: &TimeSeries,
        observer: &dyn PipelineObserver,
    ) -> Result<DifferencingOutcome> {
        self.config.validate()?;

        let mut current = series.drop_missing();
        let mut order = 0;

        loop {
            current = current.drop_missing();
            let result = self.tester.test(&current)?;
            observer.notify(&PipelineEvent::StationarityTested {
                order,
                result: result.clone(),
            });

            if result.rejects_unit_root(self.config.alpha) {
                return Ok(DifferencingOutcome {
                    series: current,
                    order,
                    stationary: true,
                    last_test: Some(result),
                });
            }

            if order >= self.config.max_diff {
                observer.notify(&PipelineEvent::NonStationary {
                    order,
                    p_value: result.p_value,
                });
                return Ok(DifferencingOutcome {
                    series: current,
                    order,
                    stationary: false,
                    last_test: Some(result),
                });
            }

            // one more difference would leave nothing to test
            if current.len() < 3 {
                observer.notify(&PipelineEvent::DifferencingHalted {
                    order,
                    len: current.len(),
                });
                return Ok(DifferencingOutcome {
                    series: current,
                    order,
                    stationary: false,
                    last_test: Some(result),
                });
            }

            current = current.diff();
            order += 1;
            observer.notify(&PipelineEvent::Differenced {
                order,
                len: current.len(),
            });
        }
    }
}

/// Difference with the default ADF test and no observer
pub fn make_stationary(
    series: &TimeSeries,
    max_diff: usize,
    alpha: f64,
) -> Result<DifferencingOutcome> {
    Differencer::new(DifferencingConfig { max_diff, alpha }).make_stationary(series, &NoopObserver)
}
