//! Calendar time window for data collection.

use crate::error::{PipelineError, PipelineResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Half-open calendar window `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    start: NaiveDate,
    end: NaiveDate,
}

impl TimeWindow {
    /// Create a window. `start` must be strictly before `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> PipelineResult<Self> {
        if start >= end {
            return Err(PipelineError::Config(format!(
                "invalid time window: start {} must be before end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Parse a window from `YYYY-MM-DD` strings.
    pub fn parse(start: &str, end: &str) -> PipelineResult<Self> {
        let start = parse_date(start)?;
        let end = parse_date(end)?;
        Self::new(start, end)
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Check whether a date falls inside the half-open window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date < self.end
    }

    /// Check whether a Unix millisecond timestamp falls inside the window.
    pub fn contains_ts(&self, ts_millis: i64) -> bool {
        let start_ms = self
            .start
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or(i64::MIN);
        let end_ms = self
            .end
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc().timestamp_millis())
            .unwrap_or(i64::MAX);
        ts_millis >= start_ms && ts_millis < end_ms
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start, self.end)
    }
}

fn parse_date(input: &str) -> PipelineResult<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), DATE_FORMAT)
        .map_err(|_| PipelineError::Config(format!("could not parse date '{}': expected YYYY-MM-DD", input)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_window() {
        let window = TimeWindow::parse("2022-01-01", "2023-10-01").unwrap();
        assert_eq!(window.start(), NaiveDate::from_ymd_opt(2022, 1, 1).unwrap());
        assert_eq!(window.end(), NaiveDate::from_ymd_opt(2023, 10, 1).unwrap());
    }

    #[test]
    fn test_empty_window_is_config_error() {
        let err = TimeWindow::parse("2023-01-01", "2023-01-01").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_reversed_window_is_config_error() {
        assert!(TimeWindow::parse("2023-10-01", "2022-01-01").is_err());
    }

    #[test]
    fn test_malformed_date_is_config_error() {
        let err = TimeWindow::parse("01/02/2023", "2023-10-01").unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_half_open_contains() {
        let window = TimeWindow::parse("2023-01-01", "2023-02-01").unwrap();
        assert!(window.contains(NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()));
        assert!(window.contains(NaiveDate::from_ymd_opt(2023, 1, 31).unwrap()));
        assert!(!window.contains(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()));
    }
}
