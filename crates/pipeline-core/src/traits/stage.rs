//! The shared stage contract.

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Identifier for every stage the dispatcher can run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageId {
    SymbolVerification,
    DataCollection,
    Preprocess,
    Dna,
    TrainPreparation,
    Train,
    Predict,
}

impl StageId {
    /// Stable textual identifier, matching the CLI flag names.
    pub fn as_str(&self) -> &'static str {
        match self {
            StageId::SymbolVerification => "stock_symbol_verification",
            StageId::DataCollection => "collect_stock_data",
            StageId::Preprocess => "preprocess",
            StageId::Dna => "stock_dna",
            StageId::TrainPreparation => "train_preparation",
            StageId::Train => "train",
            StageId::Predict => "predict",
        }
    }

    /// All stages in canonical dependency order. The dispatcher sorts
    /// any requested subset by position in this sequence.
    pub fn all() -> &'static [StageId] {
        &[
            StageId::SymbolVerification,
            StageId::DataCollection,
            StageId::Preprocess,
            StageId::Dna,
            StageId::TrainPreparation,
            StageId::Train,
            StageId::Predict,
        ]
    }

    /// Position in the canonical order.
    pub fn ordinal(&self) -> usize {
        Self::all()
            .iter()
            .position(|id| id == self)
            .unwrap_or(usize::MAX)
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageId {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StageId::all()
            .iter()
            .copied()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| PipelineError::Config(format!("unknown stage identifier: '{}'", s)))
    }
}

/// Outcome of one stage invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StageStatus {
    Success,
    Skipped,
    Failed,
}

impl fmt::Display for StageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StageStatus::Success => "success",
            StageStatus::Skipped => "skipped",
            StageStatus::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Uniform result contract returned by every stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageResult {
    pub status: StageStatus,
    /// Primary artifact produced by the stage, if any
    pub artifact: Option<PathBuf>,
    /// Human-readable outcome summary, including partial-failure counts
    pub summary: String,
    /// Items that failed within an otherwise successful stage
    pub failed_items: usize,
}

impl StageResult {
    pub fn success(summary: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Success,
            artifact: None,
            summary: summary.into(),
            failed_items: 0,
        }
    }

    pub fn skipped(reason: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Skipped,
            artifact: None,
            summary: reason.into(),
            failed_items: 0,
        }
    }

    pub fn failed(reason: impl Into<String>) -> Self {
        Self {
            status: StageStatus::Failed,
            artifact: None,
            summary: reason.into(),
            failed_items: 0,
        }
    }

    pub fn with_artifact(mut self, path: PathBuf) -> Self {
        self.artifact = Some(path);
        self
    }

    pub fn with_failed_items(mut self, count: usize) -> Self {
        self.failed_items = count;
        self
    }
}

/// Core stage trait.
///
/// Every pipeline stage exposes the same contract: run against the
/// immutable config, read declared upstream artifacts from disk, write
/// its own artifact, and report a `StageResult`. Stages must be safely
/// re-runnable; artifacts are overwritten in place.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Identifier of this stage.
    fn id(&self) -> StageId;

    /// Upstream stages whose artifacts this stage reads.
    ///
    /// Declares the output *contract* a stage depends on, not that the
    /// upstream ran in this invocation; an artifact left by a prior run
    /// satisfies the dependency.
    fn dependencies(&self) -> &'static [StageId];

    /// Run the stage against the shared config.
    async fn run(&self, config: &PipelineConfig) -> PipelineResult<StageResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_id_round_trip() {
        for id in StageId::all() {
            assert_eq!(id.as_str().parse::<StageId>().unwrap(), *id);
        }
    }

    #[test]
    fn test_unknown_stage_is_config_error() {
        let err = "wibble".parse::<StageId>().unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }

    #[test]
    fn test_canonical_order() {
        assert!(StageId::SymbolVerification.ordinal() < StageId::DataCollection.ordinal());
        assert!(StageId::Preprocess.ordinal() < StageId::Dna.ordinal());
        assert!(StageId::Dna.ordinal() < StageId::TrainPreparation.ordinal());
    }
}
