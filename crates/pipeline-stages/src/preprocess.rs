//! Preprocessing stage: raw series into fixed-size chunks.

use async_trait::async_trait;
use pipeline_core::{
    split_into_chunks, ChunkManifest, PipelineConfig, PipelineError, PipelineResult, Stage,
    StageId, StageResult,
};
use pipeline_data::artifacts;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Splits each collected raw series into chunks of `config.chunk_size`
/// bars and records the chunk parameters in the manifest.
///
/// The manifest is the authoritative carrier of `chunk_size` for later
/// stages; partial tail chunks are dropped.
pub struct Preprocess;

impl Preprocess {
    /// Symbols with a raw artifact, sorted for deterministic traversal.
    fn raw_symbols(raw_dir: &Path) -> PipelineResult<Vec<String>> {
        let mut symbols = Vec::new();
        for entry in std::fs::read_dir(raw_dir)? {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "csv") {
                if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                    symbols.push(stem.to_string());
                }
            }
        }
        symbols.sort();
        Ok(symbols)
    }
}

#[async_trait]
impl Stage for Preprocess {
    fn id(&self) -> StageId {
        StageId::Preprocess
    }

    fn dependencies(&self) -> &'static [StageId] {
        &[StageId::DataCollection]
    }

    async fn run(&self, config: &PipelineConfig) -> PipelineResult<StageResult> {
        if config.chunk_size == 0 {
            return Err(PipelineError::Config(
                "chunk_size must be positive".to_string(),
            ));
        }

        let raw_dir = config.raw_dir();
        if !raw_dir.exists() {
            return Err(PipelineError::dependency_missing(
                self.id().as_str(),
                &raw_dir,
            ));
        }

        let symbols = Self::raw_symbols(&raw_dir)?;
        if symbols.is_empty() {
            return Err(PipelineError::dependency_missing(
                self.id().as_str(),
                &raw_dir,
            ));
        }

        let mut chunk_counts: BTreeMap<String, usize> = BTreeMap::new();
        for symbol in &symbols {
            let series = artifacts::read_series(&config.raw_path(symbol), symbol)?;
            let chunks = split_into_chunks(&series, config.chunk_size);
            artifacts::write_chunks(&config.chunk_path(symbol), &chunks)?;
            chunk_counts.insert(symbol.clone(), chunks.len());
        }

        let manifest = ChunkManifest {
            chunk_size: config.chunk_size,
            chunk_counts,
        };
        let manifest_path = config.chunk_manifest_path();
        artifacts::write_manifest(&manifest_path, &manifest)?;

        info!(
            symbols = symbols.len(),
            chunks = manifest.total_chunks(),
            chunk_size = config.chunk_size,
            "preprocessing complete"
        );

        Ok(
            StageResult::success(format!(
                "chunked {} symbols into {} chunks of size {}",
                symbols.len(),
                manifest.total_chunks(),
                config.chunk_size
            ))
            .with_artifact(manifest_path),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_config;
    use pipeline_core::{Bar, RawSeries};

    fn write_raw(config: &PipelineConfig, symbol: &str, n: i64) {
        let bars = (0..n)
            .map(|i| Bar::new(i * 1000, 1.0, 2.0, 0.5, 1.5, 100.0))
            .collect();
        let series = RawSeries::from_bars(symbol, bars);
        artifacts::write_series(&config.raw_path(symbol), &series).unwrap();
    }

    #[tokio::test]
    async fn test_chunks_uniform_and_tail_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path()); // chunk_size = 3
        write_raw(&config, "AAPL", 7);
        write_raw(&config, "MSFT", 6);

        Preprocess.run(&config).await.unwrap();

        let manifest = artifacts::read_manifest(&config.chunk_manifest_path()).unwrap();
        assert_eq!(manifest.chunk_size, 3);
        assert_eq!(manifest.chunk_counts["AAPL"], 2); // tail bar dropped
        assert_eq!(manifest.chunk_counts["MSFT"], 2);

        let chunks = artifacts::read_chunks(&config.chunk_path("AAPL"), "AAPL").unwrap();
        assert!(chunks.iter().all(|c| c.len() == 3));
    }

    #[tokio::test]
    async fn test_missing_raw_dir_is_dependency_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let err = Preprocess.run(&config).await.unwrap_err();
        assert!(matches!(err, PipelineError::DependencyMissing { .. }));
    }

    #[tokio::test]
    async fn test_zero_chunk_size_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.chunk_size = 0;

        let err = Preprocess.run(&config).await.unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
