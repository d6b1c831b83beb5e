//! # Price Data
//!
//! Daily OHLCV history for the forecasting pipeline.
//!
//! ## Features
//!
//! - Yahoo Finance chart download over a blocking HTTP client
//! - CSV-backed provider for offline runs
//! - Polars-backed `PriceTable` with loose column lookup
//! - CSV save/load helpers
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use price_data::{default_pull_and_save, YahooProvider, DEFAULT_TICKER, DEFAULT_YEARS};
//! use std::path::Path;
//!
//! let provider = YahooProvider::new()?;
//! let (table, path) =
//!     default_pull_and_save(&provider, DEFAULT_TICKER, DEFAULT_YEARS, Path::new("data"))?;
//! let series = table.series("Adj Close")?;
//! println!("{} rows saved to {}", series.len(), path.display());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod bar;
pub mod error;
pub mod loader;
pub mod provider;
pub mod store;
pub mod table;
pub mod yahoo;

// Re-export commonly used types
pub use crate::bar::{PriceBar, PriceField, DATE_COLUMN};
pub use crate::error::{DataError, Result};
pub use crate::loader::{default_pull_and_save, load_price_data, DEFAULT_TICKER, DEFAULT_YEARS};
pub use crate::provider::{CsvProvider, PriceProvider};
pub use crate::store::{ensure_dir, load_prices, load_table_csv, save_prices, save_table_csv};
pub use crate::table::PriceTable;
pub use crate::yahoo::YahooProvider;
