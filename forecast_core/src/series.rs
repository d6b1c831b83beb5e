//! Time series values with their timestamps
//!
//! [`TimeSeries`] is an immutable value: differencing, slicing and forecasting
//! all return new series. Missing observations are stored as `NaN` and removed
//! with [`TimeSeries::drop_missing`].

use crate::error::{ForecastError, Result};
use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc, Weekday};
use serde::Serialize;
use std::collections::HashMap;

/// Ordered sequence of (timestamp, value) pairs
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeries {
    /// Name of the series (usually the source column)
    name: String,
    /// Strictly increasing timestamps
    timestamps: Vec<DateTime<Utc>>,
    /// Observed values, `NaN` for missing
    values: Vec<f64>,
}

impl TimeSeries {
    /// Create a new series, validating ordering and lengths
    pub fn new(
        name: impl Into<String>,
        timestamps: Vec<DateTime<Utc>>,
        values: Vec<f64>,
    ) -> Result<Self> {
        if timestamps.len() != values.len() {
            return Err(ForecastError::InvalidSeries(format!(
                "Timestamps length ({}) doesn't match values length ({})",
                timestamps.len(),
                values.len()
            )));
        }

        if let Some(pos) = timestamps.windows(2).position(|w| w[1] <= w[0]) {
            return Err(ForecastError::InvalidSeries(format!(
                "Timestamps must be strictly increasing: {} is followed by {}",
                timestamps[pos],
                timestamps[pos + 1]
            )));
        }

        Ok(Self {
            name: name.into(),
            timestamps,
            values,
        })
    }

    /// Create a series whose timestamps start at `start` and advance by `frequency`
    pub fn from_values(
        name: impl Into<String>,
        start: DateTime<Utc>,
        frequency: Frequency,
        values: Vec<f64>,
    ) -> Result<Self> {
        let mut timestamps = Vec::with_capacity(values.len());
        let mut current = frequency.align(start);
        for _ in 0..values.len() {
            timestamps.push(current);
            current = frequency.step(current);
        }
        Self::new(name, timestamps, values)
    }

    /// Name of the series
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Timestamps of the observations
    pub fn timestamps(&self) -> &[DateTime<Utc>] {
        &self.timestamps
    }

    /// Observed values
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of observations
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// First timestamp, if any
    pub fn first_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.first().copied()
    }

    /// Last timestamp, if any
    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamps.last().copied()
    }

    /// Last observed value, if any
    pub fn last_value(&self) -> Option<f64> {
        self.values.last().copied()
    }

    /// Whether any value is missing
    pub fn has_missing(&self) -> bool {
        self.values.iter().any(|v| v.is_nan())
    }

    /// Remove missing observations
    pub fn drop_missing(&self) -> Self {
        let (timestamps, values) = self
            .timestamps
            .iter()
            .zip(self.values.iter())
            .filter(|(_, v)| !v.is_nan())
            .map(|(t, v)| (*t, *v))
            .unzip();

        Self {
            name: self.name.clone(),
            timestamps,
            values,
        }
    }

    /// First-order difference; the first point is undefined and dropped
    pub fn diff(&self) -> Self {
        if self.len() < 2 {
            return Self {
                name: self.name.clone(),
                timestamps: Vec::new(),
                values: Vec::new(),
            };
        }

        Self {
            name: self.name.clone(),
            timestamps: self.timestamps[1..].to_vec(),
            values: self.values.windows(2).map(|w| w[1] - w[0]).collect(),
        }
    }

    /// Apply first-order differencing `order` times
    pub fn difference(&self, order: usize) -> Self {
        (0..order).fold(self.clone(), |series, _| series.diff())
    }

    /// Get a slice of the series from `start` (inclusive) to `end` (exclusive)
    pub fn slice(&self, start: usize, end: usize) -> Result<Self> {
        if start > end || end > self.len() {
            return Err(ForecastError::Configuration(format!(
                "Slice {}..{} is out of bounds for a series of length {}",
                start,
                end,
                self.len()
            )));
        }

        Ok(Self {
            name: self.name.clone(),
            timestamps: self.timestamps[start..end].to_vec(),
            values: self.values[start..end].to_vec(),
        })
    }

    /// First `n` observations (or fewer)
    pub fn head(&self, n: usize) -> Self {
        let end = n.min(self.len());
        Self {
            name: self.name.clone(),
            timestamps: self.timestamps[..end].to_vec(),
            values: self.values[..end].to_vec(),
        }
    }

    /// Whether every value equals the first one
    pub fn is_constant(&self) -> bool {
        match self.values.first() {
            Some(first) => self.values.iter().all(|v| v == first),
            None => true,
        }
    }

    /// Infer the sampling frequency from the timestamps
    pub fn frequency(&self) -> Result<Frequency> {
        Frequency::infer(&self.timestamps)
    }
}

/// Spacing between consecutive observations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    /// Monday to Friday, skipping weekends
    BusinessDay,
    /// Constant spacing
    Fixed(Duration),
}

impl Frequency {
    /// Daily spacing
    pub fn daily() -> Self {
        Frequency::Fixed(Duration::days(1))
    }

    /// Infer the frequency of ordered timestamps.
    ///
    /// Weekday-only data whose most common gap is one day is treated as
    /// business-daily; anything else uses the most common gap.
    pub fn infer(timestamps: &[DateTime<Utc>]) -> Result<Self> {
        if timestamps.len() < 2 {
            return Err(ForecastError::insufficient(
                "frequency inference",
                2,
                timestamps.len(),
            ));
        }

        let mut counts: HashMap<i64, usize> = HashMap::new();
        for w in timestamps.windows(2) {
            *counts.entry((w[1] - w[0]).num_seconds()).or_insert(0) += 1;
        }

        // most frequent gap, smallest on ties
        let (gap_secs, _) = counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then(b.0.cmp(&a.0)))
            .ok_or_else(|| ForecastError::insufficient("frequency inference", 2, 0))?;

        if gap_secs <= 0 {
            return Err(ForecastError::InvalidSeries(
                "Timestamps must be strictly increasing".to_string(),
            ));
        }

        let gap = Duration::seconds(gap_secs);
        if gap == Duration::days(1) && timestamps.iter().all(|t| !is_weekend(t)) {
            return Ok(Frequency::BusinessDay);
        }

        Ok(Frequency::Fixed(gap))
    }

    /// Move a start timestamp onto a valid observation time
    fn align(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Frequency::BusinessDay => {
                let mut current = start;
                while is_weekend(&current) {
                    current = current + Duration::days(1);
                }
                current
            }
            Frequency::Fixed(_) => start,
        }
    }

    /// Timestamp of the observation following `from`
    pub fn step(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Frequency::BusinessDay => {
                let mut next = from + Duration::days(1);
                while is_weekend(&next) {
                    next = next + Duration::days(1);
                }
                next
            }
            Frequency::Fixed(gap) => from + *gap,
        }
    }

    /// Create `horizon` timestamps following `last_timestamp`
    pub fn future_timestamps(
        &self,
        last_timestamp: DateTime<Utc>,
        horizon: usize,
    ) -> Vec<DateTime<Utc>> {
        let mut timestamps = Vec::with_capacity(horizon);
        let mut current = last_timestamp;

        for _ in 0..horizon {
            current = self.step(current);
            timestamps.push(current);
        }

        timestamps
    }
}

fn is_weekend(timestamp: &DateTime<Utc>) -> bool {
    matches!(timestamp.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Parse a timestamp written as RFC 3339, `YYYY-MM-DD HH:MM:SS` or `YYYY-MM-DD`
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>> {
    let text = text.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(dt.with_timezone(&Utc));
    }

    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%d %H:%M:%S") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| ForecastError::InvalidSeries(format!("Unparseable timestamp: {}", text)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        parse_timestamp(&format!("{:04}-{:02}-{:02}", y, m, d)).unwrap()
    }

    #[test]
    fn rejects_unordered_timestamps() {
        let result = TimeSeries::new(
            "x",
            vec![day(2024, 1, 2), day(2024, 1, 1)],
            vec![1.0, 2.0],
        );
        assert!(matches!(result, Err(ForecastError::InvalidSeries(_))));

        let duplicate = TimeSeries::new(
            "x",
            vec![day(2024, 1, 1), day(2024, 1, 1)],
            vec![1.0, 2.0],
        );
        assert!(duplicate.is_err());
    }

    #[test]
    fn diff_drops_first_point() {
        let series = TimeSeries::from_values(
            "x",
            day(2024, 1, 1),
            Frequency::daily(),
            vec![1.0, 3.0, 6.0, 10.0, 15.0],
        )
        .unwrap();

        let diff = series.diff();
        assert_eq!(diff.values(), &[2.0, 3.0, 4.0, 5.0]);
        assert_eq!(diff.timestamps(), &series.timestamps()[1..]);

        let diff2 = series.difference(2);
        assert_eq!(diff2.values(), &[1.0, 1.0, 1.0]);
        assert!(series.head(1).diff().is_empty());
    }

    #[test]
    fn drop_missing_keeps_order() {
        let series = TimeSeries::from_values(
            "x",
            day(2024, 1, 1),
            Frequency::daily(),
            vec![1.0, f64::NAN, 3.0, f64::NAN],
        )
        .unwrap();

        assert!(series.has_missing());
        let clean = series.drop_missing();
        assert_eq!(clean.values(), &[1.0, 3.0]);
        assert_eq!(clean.timestamps()[1], day(2024, 1, 3));
    }

    #[test]
    fn infers_business_days() {
        // Thursday 2024-01-04 onwards, skipping the weekend
        let series = TimeSeries::from_values(
            "x",
            day(2024, 1, 4),
            Frequency::BusinessDay,
            vec![1.0; 6],
        )
        .unwrap();

        assert_eq!(series.timestamps()[2], day(2024, 1, 8));
        assert_eq!(series.frequency().unwrap(), Frequency::BusinessDay);

        let next = Frequency::BusinessDay.future_timestamps(day(2024, 1, 5), 2);
        assert_eq!(next, vec![day(2024, 1, 8), day(2024, 1, 9)]);
    }

    #[test]
    fn infers_fixed_spacing() {
        let hourly = Frequency::Fixed(Duration::hours(1));
        let series =
            TimeSeries::from_values("x", day(2024, 1, 6), hourly, vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(series.frequency().unwrap(), hourly);
    }

    #[test]
    fn parses_timestamp_formats() {
        assert_eq!(parse_timestamp("2024-03-01").unwrap(), day(2024, 3, 1));
        assert_eq!(
            parse_timestamp("2024-03-01T00:00:00Z").unwrap(),
            day(2024, 3, 1)
        );
        assert_eq!(
            parse_timestamp("2024-03-01 00:00:00").unwrap(),
            day(2024, 3, 1)
        );
        assert!(parse_timestamp("yesterday").is_err());
    }
}
