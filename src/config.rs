//! Run configuration

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use feature_math::RollingStat;
use forecast_core::PipelineSettings;
use price_data::{DEFAULT_TICKER, DEFAULT_YEARS};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Everything a run needs, loadable from JSON with every field optional
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Instrument to download
    pub ticker: String,
    /// Years of history when no explicit range is given
    pub years: u32,
    /// First date, inclusive
    pub start: Option<NaiveDate>,
    /// Last date, exclusive
    pub end: Option<NaiveDate>,
    /// Price column to model
    pub column: String,
    /// Root of the `raw/` download directory
    pub data_dir: PathBuf,
    /// Saved CSV to read instead of downloading
    pub input: Option<PathBuf>,
    pub lags: Vec<usize>,
    pub windows: Vec<usize>,
    pub stats: Vec<RollingStat>,
    /// Core component settings
    pub pipeline: PipelineSettings,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            ticker: DEFAULT_TICKER.to_string(),
            years: DEFAULT_YEARS,
            start: None,
            end: None,
            column: "Adj Close".to_string(),
            data_dir: PathBuf::from("data"),
            input: None,
            lags: vec![1, 2, 3],
            windows: vec![5, 10],
            stats: RollingStat::DEFAULT.to_vec(),
            pipeline: PipelineSettings::default(),
        }
    }
}

impl PipelineConfig {
    /// Reject settings the pipeline would fail on later
    pub fn validate(&self) -> Result<()> {
        if self.ticker.trim().is_empty() {
            bail!("ticker must not be empty");
        }
        if self.years == 0 && self.start.is_none() {
            bail!("years must be at least 1 when no start date is given");
        }
        if let (Some(start), Some(end)) = (self.start, self.end) {
            if start >= end {
                bail!("start {} must be before end {}", start, end);
            }
        }
        if self.windows.contains(&0) {
            bail!("rolling windows must be greater than zero");
        }

        self.pipeline.differencing.validate()?;
        let alpha = self.pipeline.order.alpha;
        if !(alpha > 0.0 && alpha < 1.0) {
            bail!("order selection alpha must be between 0 and 1, got {}", alpha);
        }
        if let forecast_core::TestSize::Fraction(fraction) = self.pipeline.test_size {
            if !(0.0..1.0).contains(&fraction) {
                bail!("test_size fraction must be in [0, 1), got {}", fraction);
            }
        }
        Ok(())
    }
}

/// Read a JSON config file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<PipelineConfig> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config: PipelineConfig = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse config {}", path.display()))?;
    config.validate()?;
    Ok(config)
}
