//! Settings structures.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Top-level settings loaded from file and environment.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub logging: LoggingSettings,
    #[serde(default)]
    pub data: DataSettings,
    #[serde(default)]
    pub collect: CollectSettings,
    #[serde(default)]
    pub model: ModelSettings,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// Data locations and chunking parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSettings {
    /// Directory the provider-backed bar source reads from
    pub provider_dir: PathBuf,
    /// Root directory for stage artifacts
    pub data_dir: PathBuf,
    /// Bars per chunk
    pub chunk_size: usize,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            provider_dir: PathBuf::from("provider"),
            data_dir: PathBuf::from("data"),
            chunk_size: 30,
        }
    }
}

/// Data collection fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CollectSettings {
    /// Per-symbol fetch timeout in seconds
    pub timeout_secs: u64,
    /// Per-symbol retry budget
    pub max_retries: u32,
    /// Bounded fetch concurrency
    pub concurrency: usize,
}

impl Default for CollectSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            max_retries: 3,
            concurrency: 4,
        }
    }
}

/// Model stage settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Project name used to derive the trained-model handle
    pub project_name: String,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            project_name: "stockdna".to_string(),
        }
    }
}
