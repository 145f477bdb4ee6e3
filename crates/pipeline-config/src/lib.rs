//! Configuration management.

mod settings;

pub use settings::{CollectSettings, DataSettings, LoggingSettings, ModelSettings, Settings};

use config::{Config, Environment, File};
use pipeline_core::{PipelineConfig, PipelineError, PipelineResult, TimeWindow};
use std::path::{Path, PathBuf};

/// Load settings from an optional TOML file and environment overrides.
pub fn load_settings(path: &Path) -> PipelineResult<Settings> {
    let config = Config::builder()
        .add_source(File::from(path).required(false))
        .add_source(
            Environment::with_prefix("STOCKDNA")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| PipelineError::Config(e.to_string()))?;

    config
        .try_deserialize()
        .map_err(|e| PipelineError::Config(e.to_string()))
}

/// CLI-level overrides applied on top of settings.
#[derive(Debug, Clone)]
pub struct Overrides {
    pub train_base_filename: PathBuf,
    pub train_filename: PathBuf,
    pub start_time: String,
    pub end_time: String,
}

/// Build the immutable per-invocation pipeline config.
///
/// Date parsing happens here, before any stage runs; a malformed or
/// empty window is a configuration error.
pub fn build_pipeline_config(settings: &Settings, overrides: &Overrides) -> PipelineResult<PipelineConfig> {
    let window = TimeWindow::parse(&overrides.start_time, &overrides.end_time)?;

    Ok(PipelineConfig {
        train_base_filename: overrides.train_base_filename.clone(),
        train_filename: overrides.train_filename.clone(),
        window,
        chunk_size: settings.data.chunk_size,
        provider_dir: settings.data.provider_dir.clone(),
        data_dir: settings.data.data_dir.clone(),
        fetch_timeout_secs: settings.collect.timeout_secs,
        fetch_retries: settings.collect.max_retries,
        fetch_concurrency: settings.collect.concurrency,
        model_project: settings.model.project_name.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overrides() -> Overrides {
        Overrides {
            train_base_filename: "train_base.csv".into(),
            train_filename: "train.csv".into(),
            start_time: "2022-01-01".to_string(),
            end_time: "2023-10-01".to_string(),
        }
    }

    #[test]
    fn test_defaults_when_file_missing() {
        let settings = load_settings(Path::new("does/not/exist.toml")).unwrap();
        assert_eq!(settings.data.chunk_size, 30);
        assert_eq!(settings.collect.max_retries, 3);
    }

    #[test]
    fn test_build_config_from_defaults() {
        let settings = Settings::default();
        let config = build_pipeline_config(&settings, &overrides()).unwrap();
        assert_eq!(config.chunk_size, 30);
        assert_eq!(config.fetch_timeout_secs, 10);
    }

    #[test]
    fn test_equal_dates_rejected() {
        let settings = Settings::default();
        let mut bad = overrides();
        bad.end_time = bad.start_time.clone();
        let err = build_pipeline_config(&settings, &bad).unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_settings_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[data]\nchunk_size = 12\n").unwrap();

        let settings = load_settings(&path).unwrap();
        assert_eq!(settings.data.chunk_size, 12);
        // untouched sections keep defaults
        assert_eq!(settings.collect.timeout_secs, 10);
    }
}
