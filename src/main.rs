use anyhow::{Context, Result};
use arima_pipeline::{load_config, load_series, run_on_series, AppRun, PipelineConfig, SeriesSource};
use chrono::NaiveDate;
use clap::Parser;
use feature_math::RollingStat;
use forecast_core::synthetic::linear_trend_with_noise;
use forecast_core::{Autolag, TestSize, TracingObserver};
use price_data::YahooProvider;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Download a price history, make it stationary, fit ARIMA and score the forecast
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// JSON config file; flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Instrument to download
    #[arg(short, long)]
    ticker: Option<String>,

    /// Years of history to pull
    #[arg(long)]
    years: Option<u32>,

    /// First date (YYYY-MM-DD), inclusive
    #[arg(long)]
    start: Option<NaiveDate>,

    /// Last date (YYYY-MM-DD), exclusive
    #[arg(long)]
    end: Option<NaiveDate>,

    /// Price column to model
    #[arg(long)]
    column: Option<String>,

    /// Directory for downloaded data
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Read prices from a saved CSV instead of downloading
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Model a seeded synthetic trend instead of market data
    #[arg(long)]
    synthetic: bool,

    /// Seed for --synthetic
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Length of the --synthetic series
    #[arg(long, default_value_t = 500)]
    length: usize,

    /// Maximum differencing order
    #[arg(long)]
    max_diff: Option<usize>,

    /// Significance level for the unit-root test
    #[arg(long)]
    alpha: Option<f64>,

    /// Lag selection for the ADF test (aic, bic, t-stat, fixed)
    #[arg(long)]
    autolag: Option<Autolag>,

    /// Held-out size: a fraction below 1 or a point count
    #[arg(long)]
    test_size: Option<f64>,

    /// AR order
    #[arg(short = 'p', long)]
    ar_order: Option<usize>,

    /// MA order
    #[arg(short = 'q', long)]
    ma_order: Option<usize>,

    /// Upper bounds for an order search, as p,d,q
    #[arg(long, value_delimiter = ',', num_args = 3)]
    max_order: Option<Vec<usize>>,

    /// Keep AR coefficients in the stationary region
    #[arg(long)]
    enforce_stationarity: bool,

    /// Keep MA coefficients in the invertible region
    #[arg(long)]
    enforce_invertibility: bool,

    /// Optimiser iteration cap
    #[arg(long)]
    max_iterations: Option<usize>,

    /// Lag feature offsets
    #[arg(long, value_delimiter = ',')]
    lags: Option<Vec<usize>>,

    /// Rolling feature windows
    #[arg(long, value_delimiter = ',')]
    windows: Option<Vec<usize>>,

    /// Rolling statistics (mean, std, min, max)
    #[arg(long, value_delimiter = ',')]
    stats: Option<Vec<RollingStat>>,

    /// Print the forecast result as JSON
    #[arg(long)]
    json: bool,
}

impl Args {
    fn apply(&self, config: &mut PipelineConfig) -> Result<()> {
        if let Some(ticker) = &self.ticker {
            config.ticker = ticker.clone();
        }
        if let Some(years) = self.years {
            config.years = years;
        }
        if self.start.is_some() {
            config.start = self.start;
        }
        if self.end.is_some() {
            config.end = self.end;
        }
        if let Some(column) = &self.column {
            config.column = column.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
        }
        if self.input.is_some() {
            config.input = self.input.clone();
        }

        let settings = &mut config.pipeline;
        if let Some(max_diff) = self.max_diff {
            settings.differencing.max_diff = max_diff;
        }
        if let Some(alpha) = self.alpha {
            settings.differencing.alpha = alpha;
            settings.order.alpha = alpha;
        }
        if let Some(autolag) = self.autolag {
            settings.adf.autolag = autolag;
            settings.order.test.autolag = autolag;
        }
        if let Some(test_size) = self.test_size {
            settings.test_size = TestSize::try_from(test_size)?;
        }
        if let Some(p) = self.ar_order {
            settings.order.default_p = p;
        }
        if let Some(q) = self.ma_order {
            settings.order.default_q = q;
        }
        if let Some([max_p, max_d, max_q]) = self.max_order.as_deref() {
            settings.order.max_p = *max_p;
            settings.order.max_d = *max_d;
            settings.order.max_q = *max_q;
        }
        settings.fit.enforce_stationarity |= self.enforce_stationarity;
        settings.fit.enforce_invertibility |= self.enforce_invertibility;
        if let Some(max_iterations) = self.max_iterations {
            settings.fit.max_iterations = max_iterations;
        }

        if let Some(lags) = &self.lags {
            config.lags = lags.clone();
        }
        if let Some(windows) = &self.windows {
            config.windows = windows.clone();
        }
        if let Some(stats) = &self.stats {
            config.stats = stats.clone();
        }

        config.validate()
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn print_run(run: &AppRun, json: bool) -> Result<()> {
    let report = &run.report;

    if json {
        println!("{}", report.result.to_json()?);
        return Ok(());
    }

    println!("Differencing order: {}", report.differencing.order);
    println!("Selected order: {}", report.order);
    let lags = run.lag_features.drop_nulls::<String>(None)?;
    let rolling = run.rolling_features.drop_nulls::<String>(None)?;
    println!("\nLag features (head):\n{}", lags.head(Some(5)));
    println!("Rolling features (head):\n{}", rolling.head(Some(5)));
    println!("{}", report.model.summary());
    println!("{}", report.result);

    if let Some(baseline) = report.baseline_rmse {
        println!("Naive baseline RMSE: {:.4}", baseline);
    }
    if let Some(accuracy) = &run.accuracy {
        println!("\n{}", accuracy);
    }
    Ok(())
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => PipelineConfig::default(),
    };
    args.apply(&mut config)?;

    let (series, source) = if args.synthetic {
        let series = linear_trend_with_noise(args.length, 100.0, 0.5, 1.0, args.seed)?;
        (series, SeriesSource::Synthetic)
    } else {
        let provider = YahooProvider::new().context("Failed to build HTTP client")?;
        load_series(&config, &provider)?
    };

    match &source {
        SeriesSource::Downloaded(path) => tracing::info!("Saved raw prices to {}", path.display()),
        SeriesSource::File(path) => tracing::info!("Read prices from {}", path.display()),
        SeriesSource::Synthetic => tracing::info!("Using synthetic series (seed {})", args.seed),
    }

    let run = run_on_series(&config, &series, &TracingObserver)
        .with_context(|| format!("Pipeline failed for {}", series.name()))?;
    print_run(&run, args.json)
}
