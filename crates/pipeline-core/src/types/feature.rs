//! Feature vector ("DNA") derived from one chunk.

use serde::{Deserialize, Serialize};

/// Fixed-width numeric signature of one chunk, tagged with its source
/// symbol and the chunk's start timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub symbol: String,
    pub start_ts: i64,
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn new(symbol: impl Into<String>, start_ts: i64, values: Vec<f64>) -> Self {
        Self {
            symbol: symbol.into(),
            start_ts,
            values,
        }
    }

    pub fn width(&self) -> usize {
        self.values.len()
    }
}
