//! Fixed-length chunks of a raw series and the chunk manifest artifact.

use super::{Bar, RawSeries};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Fixed-length contiguous window of one symbol's series.
///
/// All chunks produced in one run share the same length. The partial
/// tail of a series is dropped, never emitted short.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub symbol: String,
    /// Timestamp of the first bar in the chunk
    pub start_ts: i64,
    pub bars: Vec<Bar>,
}

impl Chunk {
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

/// Split a series into chunks of exactly `chunk_size` bars.
///
/// The trailing partial chunk is dropped.
pub fn split_into_chunks(series: &RawSeries, chunk_size: usize) -> Vec<Chunk> {
    if chunk_size == 0 {
        return Vec::new();
    }
    series
        .bars()
        .chunks_exact(chunk_size)
        .map(|bars| Chunk {
            symbol: series.symbol.clone(),
            start_ts: bars[0].timestamp,
            bars: bars.to_vec(),
        })
        .collect()
}

/// Manifest written by the preprocessor recording the chunk parameters
/// used for a run. This is the cross-invocation carrier of `chunk_size`:
/// the feature extractor reads it rather than guessing a default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkManifest {
    pub chunk_size: usize,
    /// Chunk count per symbol, sorted by symbol
    pub chunk_counts: BTreeMap<String, usize>,
}

impl ChunkManifest {
    pub fn symbols(&self) -> impl Iterator<Item = &String> {
        self.chunk_counts.keys()
    }

    pub fn total_chunks(&self) -> usize {
        self.chunk_counts.values().sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(n: i64) -> RawSeries {
        let bars = (0..n)
            .map(|i| Bar::new(i * 1000, 1.0, 2.0, 0.5, 1.5, 100.0))
            .collect();
        RawSeries::from_bars("AAPL", bars)
    }

    #[test]
    fn test_uniform_chunk_length() {
        let chunks = split_into_chunks(&series(10), 3);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.len() == 3));
    }

    #[test]
    fn test_tail_dropped() {
        let chunks = split_into_chunks(&series(7), 4);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].len(), 4);
    }

    #[test]
    fn test_start_ts_matches_first_bar() {
        let chunks = split_into_chunks(&series(6), 3);
        assert_eq!(chunks[0].start_ts, 0);
        assert_eq!(chunks[1].start_ts, 3000);
    }

    #[test]
    fn test_zero_chunk_size_yields_nothing() {
        assert!(split_into_chunks(&series(5), 0).is_empty());
    }
}
