//! One end-to-end run: load, featurise, model, score

use crate::config::PipelineConfig;
use anyhow::{Context, Result};
use feature_math::{create_lag_features, create_rolling_features, DataFrame};
use forecast_core::metrics::{forecast_accuracy, ForecastAccuracy};
use forecast_core::{Pipeline, PipelineObserver, PipelineReport, TimeSeries};
use price_data::loader::{raw_path, trailing_range};
use price_data::{load_price_data, load_prices, PriceProvider};
use std::path::PathBuf;
use tracing::info;

/// Where the modelled series came from
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesSource {
    /// Downloaded and saved to this file
    Downloaded(PathBuf),
    /// Read from a saved CSV
    File(PathBuf),
    /// Generated in memory
    Synthetic,
}

/// Outputs of a full run
#[derive(Debug, Clone)]
pub struct AppRun {
    /// Pipeline stages and forecast
    pub report: PipelineReport,
    /// `Date`, `y` and `lag_k` columns over the stationary series
    pub lag_features: DataFrame,
    /// `Date`, `y` and `roll_{w}_{stat}` columns over the stationary series
    pub rolling_features: DataFrame,
    /// Accuracy summary against the held-out segment
    pub accuracy: Option<ForecastAccuracy>,
}

/// Resolve the configured price column, reading `input` or downloading
pub fn load_series(
    config: &PipelineConfig,
    provider: &dyn PriceProvider,
) -> Result<(TimeSeries, SeriesSource)> {
    let (table, source) = match &config.input {
        Some(path) => {
            let mut table = load_prices(path)
                .with_context(|| format!("Failed to load prices from {}", path.display()))?;
            if config.start.is_some() || config.end.is_some() {
                let (default_start, default_end) = trailing_range(config.years);
                table = table.between(
                    config.start.unwrap_or(default_start),
                    config.end.unwrap_or(default_end),
                )?;
            }
            (table, SeriesSource::File(path.clone()))
        }
        None => {
            let (default_start, default_end) = trailing_range(config.years);
            let start = config.start.unwrap_or(default_start);
            let end = config.end.unwrap_or(default_end);
            let path = raw_path(&config.data_dir, &config.ticker);

            let table = load_price_data(provider, &config.ticker, start, end, Some(path.as_path()))
                .with_context(|| format!("Failed to pull {}", config.ticker))?;
            (table, SeriesSource::Downloaded(path))
        }
    };

    let series = table
        .series(&config.column)
        .with_context(|| format!("Column {} is not available", config.column))?;
    info!("Loaded {} points of {}", series.len(), series.name());
    Ok((series, source))
}

/// Run features and the forecasting pipeline on `series`
pub fn run_on_series(
    config: &PipelineConfig,
    series: &TimeSeries,
    observer: &dyn PipelineObserver,
) -> Result<AppRun> {
    let report = Pipeline::new(config.pipeline.clone()).run(series, observer)?;

    let stationary = &report.differencing.series;
    info!(
        "Applied differencing order d={}, resulting length {}",
        report.differencing.order,
        stationary.len()
    );
    let lag_features = create_lag_features(stationary, &config.lags)?;
    let rolling_features = create_rolling_features(stationary, &config.windows, &config.stats)?;

    let accuracy = if report.test.is_empty() {
        None
    } else {
        let forecast = report.result.forecast.values();
        let actual = &report.test.values()[..forecast.len()];
        Some(forecast_accuracy(forecast, actual)?)
    };

    if let Some(rmse) = report.result.rmse {
        info!("Forecast RMSE: {:.6}, MAPE: {:?}", rmse, report.result.mape);
    }

    Ok(AppRun {
        report,
        lag_features,
        rolling_features,
        accuracy,
    })
}
