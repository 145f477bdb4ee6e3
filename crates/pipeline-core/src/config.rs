//! The immutable, invocation-scoped pipeline configuration.

use crate::types::TimeWindow;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Shared parameters threaded through every stage for one invocation.
///
/// Built once by the front door from settings plus CLI overrides and
/// never mutated afterwards; stages receive it by shared reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base symbol reference file consumed by symbol verification
    pub train_base_filename: PathBuf,
    /// Verified symbol list: written by symbol verification, read by collection
    pub train_filename: PathBuf,
    /// Collection window
    pub window: TimeWindow,
    /// Bars per chunk, consumed by the preprocessor
    pub chunk_size: usize,
    /// Directory the bar source reads provider data from
    pub provider_dir: PathBuf,
    /// Root directory for stage artifacts
    pub data_dir: PathBuf,
    /// Per-symbol fetch timeout in seconds
    pub fetch_timeout_secs: u64,
    /// Per-symbol fetch retry budget
    pub fetch_retries: u32,
    /// Bounded fetch concurrency
    pub fetch_concurrency: usize,
    /// Model project name, used to derive the trained-model handle
    pub model_project: String,
}

impl PipelineConfig {
    /// Directory of per-symbol raw series artifacts.
    pub fn raw_dir(&self) -> PathBuf {
        self.data_dir.join("raw")
    }

    /// Per-symbol raw series artifact path.
    pub fn raw_path(&self, symbol: &str) -> PathBuf {
        self.raw_dir().join(format!("{}.csv", symbol))
    }

    /// Directory of per-symbol chunk artifacts.
    pub fn chunks_dir(&self) -> PathBuf {
        self.data_dir.join("chunks")
    }

    /// Per-symbol chunk artifact path.
    pub fn chunk_path(&self, symbol: &str) -> PathBuf {
        self.chunks_dir().join(format!("{}.csv", symbol))
    }

    /// Chunk manifest path, the authoritative record of chunk_size.
    pub fn chunk_manifest_path(&self) -> PathBuf {
        self.chunks_dir().join("manifest.json")
    }

    /// Directory of per-symbol feature ("DNA") artifacts.
    pub fn dna_dir(&self) -> PathBuf {
        self.data_dir.join("dna")
    }

    /// Per-symbol feature artifact path.
    pub fn dna_path(&self, symbol: &str) -> PathBuf {
        self.dna_dir().join(format!("{}.csv", symbol))
    }

    /// The assembled training artifact.
    pub fn master_path(&self) -> PathBuf {
        self.data_dir.join("master_train_data.csv")
    }

    /// Model artifact directory.
    pub fn model_dir(&self) -> PathBuf {
        self.data_dir.join("model")
    }

    /// Trained-model handle path.
    pub fn model_handle_path(&self) -> PathBuf {
        self.model_dir().join("model.json")
    }

    /// Prediction output path.
    pub fn predictions_path(&self) -> PathBuf {
        self.model_dir().join("predictions.csv")
    }

    /// Resolve the verified symbol list path relative to the data dir
    /// unless it is already absolute.
    pub fn resolved_train_path(&self) -> PathBuf {
        resolve_under(&self.data_dir, &self.train_filename)
    }

    /// Resolve the base symbol reference path relative to the data dir
    /// unless it is already absolute.
    pub fn resolved_train_base_path(&self) -> PathBuf {
        resolve_under(&self.data_dir, &self.train_base_filename)
    }
}

fn resolve_under(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> PipelineConfig {
        PipelineConfig {
            train_base_filename: "train_base.csv".into(),
            train_filename: "train.csv".into(),
            window: TimeWindow::parse("2022-01-01", "2023-10-01").unwrap(),
            chunk_size: 30,
            provider_dir: "/provider".into(),
            data_dir: "/data".into(),
            fetch_timeout_secs: 10,
            fetch_retries: 3,
            fetch_concurrency: 4,
            model_project: "stockdna".into(),
        }
    }

    #[test]
    fn test_artifact_paths_scoped_per_stage() {
        let config = config();
        assert_eq!(config.raw_path("AAPL"), PathBuf::from("/data/raw/AAPL.csv"));
        assert_eq!(
            config.chunk_manifest_path(),
            PathBuf::from("/data/chunks/manifest.json")
        );
        assert_eq!(config.dna_path("MSFT"), PathBuf::from("/data/dna/MSFT.csv"));
        assert_eq!(
            config.master_path(),
            PathBuf::from("/data/master_train_data.csv")
        );
    }

    #[test]
    fn test_relative_symbol_files_resolve_under_data_dir() {
        let config = config();
        assert_eq!(config.resolved_train_path(), PathBuf::from("/data/train.csv"));
        assert_eq!(
            config.resolved_train_base_path(),
            PathBuf::from("/data/train_base.csv")
        );
    }

    #[test]
    fn test_absolute_symbol_files_kept() {
        let mut config = config();
        config.train_filename = "/elsewhere/train.csv".into();
        assert_eq!(
            config.resolved_train_path(),
            PathBuf::from("/elsewhere/train.csv")
        );
    }
}
