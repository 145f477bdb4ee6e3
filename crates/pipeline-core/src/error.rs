//! Error types for the pipeline.

use thiserror::Error;

/// Top-level pipeline error.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Stage '{stage}' requires a missing upstream artifact: {artifact}")]
    DependencyMissing { stage: String, artifact: String },

    #[error("Stage '{stage}' failed: {reason}")]
    FatalStage { stage: String, reason: String },

    #[error("Data error: {0}")]
    Data(#[from] DataError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Data source and artifact errors.
#[derive(Error, Debug)]
pub enum DataError {
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    #[error("No data available for the requested range")]
    NoDataAvailable,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Fetch for {symbol} timed out after {secs} seconds")]
    Timeout { symbol: String, secs: u64 },

    #[error("Fetch for {symbol} exhausted retry budget of {attempts} attempts")]
    RetriesExhausted { symbol: String, attempts: u32 },

    #[error("Data source error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Shorthand for a missing-upstream-artifact error.
    pub fn dependency_missing(stage: &str, artifact: impl AsRef<std::path::Path>) -> Self {
        Self::DependencyMissing {
            stage: stage.to_string(),
            artifact: artifact.as_ref().display().to_string(),
        }
    }

    /// Shorthand for an unrecoverable stage failure.
    pub fn fatal(stage: &str, reason: impl Into<String>) -> Self {
        Self::FatalStage {
            stage: stage.to_string(),
            reason: reason.into(),
        }
    }
}

/// Result type alias for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
