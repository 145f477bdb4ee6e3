//! CSV-backed bar source.
//!
//! Reads provider data from `{root}/{SYMBOL}.csv`, one file per symbol.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use csv::ReaderBuilder;
use pipeline_core::{Bar, DataError, RawSeries, TimeWindow};
use serde::Deserialize;
use std::path::PathBuf;

use crate::source::BarSource;

/// CSV record format with common header spellings.
#[derive(Debug, Deserialize)]
struct CsvRecord {
    #[serde(alias = "Date", alias = "date", alias = "timestamp", alias = "Timestamp")]
    date: String,
    #[serde(alias = "Open", alias = "open")]
    open: f64,
    #[serde(alias = "High", alias = "high")]
    high: f64,
    #[serde(alias = "Low", alias = "low")]
    low: f64,
    #[serde(alias = "Close", alias = "close", alias = "Adj Close")]
    close: f64,
    #[serde(alias = "Volume", alias = "volume", default)]
    volume: f64,
}

/// Bar source reading per-symbol CSV files from a provider directory.
pub struct CsvBarSource {
    root: PathBuf,
}

impl CsvBarSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn load(&self, symbol: &str, window: &TimeWindow) -> Result<Vec<Bar>, DataError> {
        let path = self.root.join(format!("{}.csv", symbol));
        if !path.exists() {
            return Err(DataError::SymbolNotFound(symbol.to_string()));
        }

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(&path)
            .map_err(|e| DataError::ParseError(e.to_string()))?;

        let mut bars = Vec::new();
        for result in reader.deserialize() {
            let record: CsvRecord = result.map_err(|e| DataError::ParseError(e.to_string()))?;
            let timestamp = parse_timestamp(&record.date)?;
            bars.push(Bar::new(
                timestamp,
                record.open,
                record.high,
                record.low,
                record.close,
                record.volume,
            ));
        }

        let series = RawSeries::from_bars(symbol, bars).within(window);
        if series.is_empty() {
            return Err(DataError::NoDataAvailable);
        }
        Ok(series.bars().to_vec())
    }
}

#[async_trait]
impl BarSource for CsvBarSource {
    async fn fetch_bars(&self, symbol: &str, window: &TimeWindow) -> Result<Vec<Bar>, DataError> {
        self.load(symbol, window)
    }

    fn name(&self) -> &str {
        "csv"
    }
}

/// Parse various timestamp formats to Unix milliseconds.
fn parse_timestamp(date_str: &str) -> Result<i64, DataError> {
    let formats = ["%Y-%m-%d", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d", "%m/%d/%Y"];

    for format in formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(date_str, format) {
            return Ok(dt.and_utc().timestamp_millis());
        }
        if let Ok(d) = NaiveDate::parse_from_str(date_str, format) {
            let dt = d.and_hms_opt(0, 0, 0).unwrap();
            return Ok(dt.and_utc().timestamp_millis());
        }
    }

    // Unix timestamp fallback; assume milliseconds if > 10 digits
    if let Ok(ts) = date_str.parse::<i64>() {
        if ts > 10_000_000_000 {
            return Ok(ts);
        } else {
            return Ok(ts * 1000);
        }
    }

    Err(DataError::ParseError(format!(
        "Could not parse date: {}",
        date_str
    )))
}
