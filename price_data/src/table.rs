//! Polars-backed OHLCV table

use crate::bar::{normalize_column, PriceBar, PriceField, DATE_COLUMN};
use crate::error::{DataError, Result};
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use forecast_core::TimeSeries;
use polars::prelude::*;
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Ordered daily price table with a `Date` column followed by numeric columns
#[derive(Debug, Clone)]
pub struct PriceTable {
    df: DataFrame,
}

impl PriceTable {
    /// Build a table from bars, sorting by date and keeping the last bar per day
    pub fn from_bars(bars: &[PriceBar]) -> Result<Self> {
        let mut bars = bars.to_vec();
        bars.sort_by_key(|b| b.date);
        // keep the last bar seen for each date
        let mut deduped: Vec<PriceBar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }

        let dates: Vec<String> = deduped
            .iter()
            .map(|b| b.date.format(DATE_FORMAT).to_string())
            .collect();
        let mut columns = vec![Series::new(DATE_COLUMN, dates)];
        for field in PriceField::ALL {
            let values: Vec<f64> = deduped.iter().map(|b| field.value(b)).collect();
            columns.push(Series::new(field.column_name(), values));
        }

        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    /// Wrap an existing frame, which must carry a `Date` column
    pub fn from_dataframe(df: DataFrame) -> Result<Self> {
        let table = Self { df };
        table.dates()?;
        Ok(table)
    }

    /// Mutable frame, for writers that need it
    pub fn dataframe_mut(&mut self) -> &mut DataFrame {
        &mut self.df
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.df.height()
    }

    /// Check if the table is empty
    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    /// Column labels in order
    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    /// Row dates parsed from the `Date` column
    pub fn dates(&self) -> Result<Vec<NaiveDate>> {
        let column = self
            .df
            .column(DATE_COLUMN)
            .map_err(|_| DataError::MissingColumn(DATE_COLUMN.to_string()))?
            .cast(&DataType::Utf8)?;

        column
            .utf8()?
            .into_iter()
            .map(|value| {
                let text = value.ok_or_else(|| DataError::Parse("Empty date".to_string()))?;
                // stored dates may carry a time part
                let day = text.get(..10).unwrap_or(text);
                NaiveDate::parse_from_str(day, DATE_FORMAT)
                    .map_err(|e| DataError::Parse(format!("Invalid date {}: {}", text, e)))
            })
            .collect()
    }

    /// Row timestamps at midnight UTC
    pub fn timestamps(&self) -> Result<Vec<DateTime<Utc>>> {
        self.dates()?
            .into_iter()
            .map(|date| {
                date.and_hms_opt(0, 0, 0)
                    .map(|naive| Utc.from_utc_datetime(&naive))
                    .ok_or_else(|| DataError::Parse(format!("Invalid date {}", date)))
            })
            .collect()
    }

    /// Resolve a column label, ignoring case, spaces and punctuation
    pub fn resolve_column(&self, requested: &str) -> Result<String> {
        let wanted = normalize_column(requested);
        self.df
            .get_column_names()
            .iter()
            .find(|name| normalize_column(name) == wanted)
            .map(|name| name.to_string())
            .ok_or_else(|| DataError::MissingColumn(requested.to_string()))
    }

    /// Numeric column values, nulls as `NaN`
    pub fn column_values(&self, requested: &str) -> Result<Vec<f64>> {
        let name = self.resolve_column(requested)?;
        let column = self.df.column(&name)?.cast(&DataType::Float64)?;
        Ok(column
            .f64()?
            .into_iter()
            .map(|v| v.unwrap_or(f64::NAN))
            .collect())
    }

    /// One column as a time series named after the column
    pub fn series(&self, requested: &str) -> Result<TimeSeries> {
        let name = self.resolve_column(requested)?;
        let values = self.column_values(&name)?;
        Ok(TimeSeries::new(name, self.timestamps()?, values)?)
    }

    /// Rows as bars; columns that are absent read as `NaN`
    pub fn to_bars(&self) -> Result<Vec<PriceBar>> {
        let dates = self.dates()?;
        let mut columns = Vec::with_capacity(PriceField::ALL.len());
        for field in PriceField::ALL {
            let values = match self.column_values(field.column_name()) {
                Ok(values) => values,
                Err(DataError::MissingColumn(_)) => vec![f64::NAN; dates.len()],
                Err(e) => return Err(e),
            };
            columns.push(values);
        }

        Ok(dates
            .into_iter()
            .enumerate()
            .map(|(i, date)| PriceBar {
                date,
                open: columns[0][i],
                high: columns[1][i],
                low: columns[2][i],
                close: columns[3][i],
                adj_close: columns[4][i],
                volume: columns[5][i],
            })
            .collect())
    }

    /// Rows with `start <= date < end`
    pub fn between(&self, start: NaiveDate, end: NaiveDate) -> Result<Self> {
        let bars: Vec<PriceBar> = self
            .to_bars()?
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect();
        Self::from_bars(&bars)
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Self {
        Self {
            df: self.df.head(Some(n)),
        }
    }
}

impl fmt::Display for PriceTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.df)
    }
}
