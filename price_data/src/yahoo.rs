//! Yahoo Finance chart endpoint

use crate::bar::PriceBar;
use crate::error::{DataError, Result};
use crate::provider::PriceProvider;
use crate::table::PriceTable;
use chrono::{NaiveDate, TimeZone, Utc};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{info, warn};

const BASE_URL: &str = "https://query1.finance.yahoo.com";
const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) price_data/0.1";

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Vec<Option<f64>>,
}

/// Daily bars from the Yahoo Finance chart API
#[derive(Debug, Clone)]
pub struct YahooProvider {
    client: Client,
    base_url: String,
}

impl YahooProvider {
    /// Create a provider with a 30 second timeout
    pub fn new() -> Result<Self> {
        Self::with_base_url(BASE_URL)
    }

    /// Create a provider against another host (a mirror or a local stub)
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

impl PriceProvider for YahooProvider {
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<PriceTable> {
        info!("Downloading {} from {} to {}", ticker, start, end);

        let period = |date: NaiveDate| {
            date.and_hms_opt(0, 0, 0)
                .map(|naive| Utc.from_utc_datetime(&naive).timestamp())
                .ok_or_else(|| DataError::Parse(format!("Invalid date {}", date)))
        };
        let url = format!("{}/v8/finance/chart/{}", self.base_url, ticker);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("period1", period(start)?.to_string()),
                ("period2", period(end)?.to_string()),
                ("interval", "1d".to_string()),
                ("events", "div,splits".to_string()),
            ])
            .send()?;

        if !response.status().is_success() {
            return Err(DataError::Provider(format!(
                "Request for {} failed: {}",
                ticker,
                response.status()
            )));
        }

        let body = response.text()?;
        let bars: Vec<PriceBar> = parse_chart(&body)?
            .into_iter()
            .filter(|b| b.date >= start && b.date < end)
            .collect();

        if bars.is_empty() {
            return Err(DataError::Empty {
                ticker: ticker.to_string(),
                start: start.to_string(),
                end: end.to_string(),
            });
        }
        info!("Downloaded {} rows for {}", bars.len(), ticker);
        PriceTable::from_bars(&bars)
    }
}

/// Turn a chart API payload into bars, skipping days without a close
pub fn parse_chart(body: &str) -> Result<Vec<PriceBar>> {
    let response: ChartResponse = serde_json::from_str(body)
        .map_err(|e| DataError::Provider(format!("Malformed chart payload: {}", e)))?;

    if let Some(error) = response.chart.error {
        return Err(DataError::Provider(format!(
            "{}: {}",
            error.code, error.description
        )));
    }

    let result = response
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .ok_or_else(|| DataError::Provider("Chart payload has no result".to_string()))?;

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let adjclose = result
        .indicators
        .adjclose
        .into_iter()
        .next()
        .map(|a| a.adjclose)
        .unwrap_or_default();

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();

    let mut bars = Vec::with_capacity(result.timestamp.len());
    let mut skipped = 0;
    for (i, ts) in result.timestamp.iter().enumerate() {
        let close = match at(&quote.close, i) {
            Some(close) => close,
            None => {
                skipped += 1;
                continue;
            }
        };
        let date = Utc
            .timestamp_opt(*ts, 0)
            .single()
            .ok_or_else(|| DataError::Parse(format!("Invalid timestamp {}", ts)))?
            .date_naive();

        bars.push(PriceBar {
            date,
            open: at(&quote.open, i).unwrap_or(f64::NAN),
            high: at(&quote.high, i).unwrap_or(f64::NAN),
            low: at(&quote.low, i).unwrap_or(f64::NAN),
            close,
            adj_close: at(&adjclose, i).unwrap_or(close),
            volume: at(&quote.volume, i).unwrap_or(f64::NAN),
        });
    }

    if skipped > 0 {
        warn!("Skipped {} rows without a close price", skipped);
    }
    Ok(bars)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAYLOAD: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1704205800, 1704292200, 1704378600],
                "indicators": {
                    "quote": [{
                        "open": [472.1, 470.4, null],
                        "high": [473.6, 471.2, null],
                        "low": [470.5, 468.1, null],
                        "close": [472.6, 468.8, null],
                        "volume": [123000, 98000, null]
                    }],
                    "adjclose": [{"adjclose": [468.0, 464.2, null]}]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn parses_chart_payload() {
        let bars = parse_chart(PAYLOAD).unwrap();

        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[1].close, 468.8);
        assert_eq!(bars[1].adj_close, 464.2);
        assert_eq!(bars[0].volume, 123000.0);
    }

    #[test]
    fn surfaces_api_errors() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found"}}}"#;
        let err = parse_chart(body).unwrap_err();
        assert!(err.to_string().contains("No data found"));
    }

    #[test]
    fn rejects_malformed_payload() {
        assert!(matches!(parse_chart("<html>"), Err(DataError::Provider(_))));
    }
}
