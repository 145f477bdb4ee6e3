//! Typed CSV/JSON readers and writers for stage artifacts.
//!
//! Every writer creates parent directories and overwrites in place;
//! writes are deterministic so re-running a stage on identical inputs
//! reproduces the artifact byte for byte.

use csv::{ReaderBuilder, WriterBuilder};
use pipeline_core::{
    Bar, Chunk, ChunkManifest, FeatureVector, PipelineError, PipelineResult, RawSeries, SymbolSet,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn ensure_parent(path: &Path) -> PipelineResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn parse_err(e: impl std::fmt::Display) -> PipelineError {
    PipelineError::Data(pipeline_core::DataError::ParseError(e.to_string()))
}

// ---------------------------------------------------------------------------
// Symbol lists

/// Read raw symbol tokens from a reference file: first column of each
/// row, skipping a `symbol` header when present.
pub fn read_symbol_tokens(path: &Path) -> PipelineResult<Vec<String>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(parse_err)?;

    let mut tokens = Vec::new();
    for result in reader.records() {
        let record = result.map_err(parse_err)?;
        if let Some(field) = record.get(0) {
            if field.eq_ignore_ascii_case("symbol") {
                continue;
            }
            tokens.push(field.to_string());
        }
    }
    Ok(tokens)
}

/// Write a verified symbol set, one symbol per row under a header.
pub fn write_symbols(path: &Path, symbols: &SymbolSet) -> PipelineResult<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new().from_path(path).map_err(parse_err)?;
    writer.write_record(["symbol"]).map_err(parse_err)?;
    for symbol in symbols.iter() {
        writer.write_record([symbol]).map_err(parse_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read a previously verified symbol set.
pub fn read_symbols(path: &Path) -> PipelineResult<SymbolSet> {
    let tokens = read_symbol_tokens(path)?;
    let (set, _) = SymbolSet::from_raw(tokens);
    Ok(set)
}

// ---------------------------------------------------------------------------
// Raw series

/// Write one symbol's raw series.
pub fn write_series(path: &Path, series: &RawSeries) -> PipelineResult<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new().from_path(path).map_err(parse_err)?;
    for bar in series.bars() {
        writer.serialize(bar).map_err(parse_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read one symbol's raw series.
pub fn read_series(path: &Path, symbol: &str) -> PipelineResult<RawSeries> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(parse_err)?;

    let mut bars = Vec::new();
    for result in reader.deserialize() {
        let bar: Bar = result.map_err(parse_err)?;
        bars.push(bar);
    }
    Ok(RawSeries::from_bars(symbol, bars))
}

// ---------------------------------------------------------------------------
// Chunks

/// Flattened chunk row; rows of one chunk share a chunk index.
#[derive(Debug, Serialize, Deserialize)]
struct ChunkRow {
    chunk_index: usize,
    timestamp: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Write one symbol's chunks as flattened rows.
pub fn write_chunks(path: &Path, chunks: &[Chunk]) -> PipelineResult<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new().from_path(path).map_err(parse_err)?;
    for (chunk_index, chunk) in chunks.iter().enumerate() {
        for bar in &chunk.bars {
            writer
                .serialize(ChunkRow {
                    chunk_index,
                    timestamp: bar.timestamp,
                    open: bar.open,
                    high: bar.high,
                    low: bar.low,
                    close: bar.close,
                    volume: bar.volume,
                })
                .map_err(parse_err)?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Read one symbol's chunks, grouping rows by chunk index in order.
pub fn read_chunks(path: &Path, symbol: &str) -> PipelineResult<Vec<Chunk>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(parse_err)?;

    let mut chunks: Vec<Chunk> = Vec::new();
    for result in reader.deserialize() {
        let row: ChunkRow = result.map_err(parse_err)?;
        let bar = Bar::new(row.timestamp, row.open, row.high, row.low, row.close, row.volume);
        if chunks.len() == row.chunk_index + 1 {
            if let Some(chunk) = chunks.last_mut() {
                chunk.bars.push(bar);
            }
        } else {
            chunks.push(Chunk {
                symbol: symbol.to_string(),
                start_ts: bar.timestamp,
                bars: vec![bar],
            });
        }
    }
    Ok(chunks)
}

// ---------------------------------------------------------------------------
// Chunk manifest

/// Write the chunk manifest (pretty JSON, key order stable).
pub fn write_manifest(path: &Path, manifest: &ChunkManifest) -> PipelineResult<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|e| PipelineError::Serialization(e.to_string()))?;
    fs::write(path, json)?;
    Ok(())
}

/// Read the chunk manifest.
pub fn read_manifest(path: &Path) -> PipelineResult<ChunkManifest> {
    let json = fs::read_to_string(path)?;
    serde_json::from_str(&json).map_err(|e| PipelineError::Serialization(e.to_string()))
}

// ---------------------------------------------------------------------------
// Feature vectors

/// Write feature vectors. Header width follows the first vector.
pub fn write_features(path: &Path, features: &[FeatureVector]) -> PipelineResult<()> {
    ensure_parent(path)?;
    let mut writer = WriterBuilder::new().from_path(path).map_err(parse_err)?;

    let width = features.first().map(|f| f.width()).unwrap_or(0);
    let mut header = vec!["symbol".to_string(), "start_ts".to_string()];
    header.extend((1..=width).map(|i| format!("f{}", i)));
    writer.write_record(&header).map_err(parse_err)?;

    for feature in features {
        let mut record = vec![feature.symbol.clone(), feature.start_ts.to_string()];
        record.extend(feature.values.iter().map(|v| v.to_string()));
        writer.write_record(&record).map_err(parse_err)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read feature vectors.
pub fn read_features(path: &Path) -> PipelineResult<Vec<FeatureVector>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .map_err(parse_err)?;

    let mut features = Vec::new();
    for result in reader.records() {
        let record = result.map_err(parse_err)?;
        if record.len() < 2 {
            return Err(parse_err("feature row needs symbol and start_ts"));
        }
        let symbol = record[0].to_string();
        let start_ts: i64 = record[1].parse().map_err(parse_err)?;
        let values = record
            .iter()
            .skip(2)
            .map(|v| v.parse::<f64>().map_err(parse_err))
            .collect::<PipelineResult<Vec<f64>>>()?;
        features.push(FeatureVector::new(symbol, start_ts, values));
    }
    Ok(features)
}
