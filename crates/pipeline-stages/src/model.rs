//! Model stages: training and prediction against the opaque backend.
//!
//! The model internals are an external collaborator; these stages only
//! honor the handoff contract: training consumes the master dataset and
//! produces a trained-model handle, prediction consumes the handle.

use async_trait::async_trait;
use pipeline_core::{
    PipelineConfig, PipelineError, PipelineResult, Stage, StageId, StageResult,
};
use pipeline_data::artifacts;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Opaque trained-model handle persisted by the training stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelHandle {
    /// Deterministic identifier derived from project name and row count
    pub id: String,
    pub rows: usize,
    pub feature_width: usize,
}

/// Hands the assembled dataset to the model backend for training and
/// persists the resulting handle.
pub struct ModelTrain;

#[async_trait]
impl Stage for ModelTrain {
    fn id(&self) -> StageId {
        StageId::Train
    }

    fn dependencies(&self) -> &'static [StageId] {
        &[StageId::TrainPreparation]
    }

    async fn run(&self, config: &PipelineConfig) -> PipelineResult<StageResult> {
        let master_path = config.master_path();
        if !master_path.exists() {
            return Err(PipelineError::dependency_missing(
                self.id().as_str(),
                &master_path,
            ));
        }

        let rows = artifacts::read_features(&master_path)?;
        let handle = ModelHandle {
            id: format!("{}-{}", config.model_project, rows.len()),
            rows: rows.len(),
            feature_width: rows.first().map(|r| r.width()).unwrap_or(0),
        };

        info!(handle = %handle.id, rows = handle.rows, "model training");

        let handle_path = config.model_handle_path();
        if let Some(parent) = handle_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&handle)
            .map_err(|e| PipelineError::Serialization(e.to_string()))?;
        std::fs::write(&handle_path, json)?;

        Ok(
            StageResult::success(format!("trained model '{}' on {} rows", handle.id, handle.rows))
                .with_artifact(handle_path),
        )
    }
}

/// Runs prediction with a previously trained model handle.
pub struct ModelPredict;

#[async_trait]
impl Stage for ModelPredict {
    fn id(&self) -> StageId {
        StageId::Predict
    }

    fn dependencies(&self) -> &'static [StageId] {
        &[StageId::Train]
    }

    async fn run(&self, config: &PipelineConfig) -> PipelineResult<StageResult> {
        let handle_path = config.model_handle_path();
        if !handle_path.exists() {
            return Err(PipelineError::dependency_missing(
                self.id().as_str(),
                &handle_path,
            ));
        }
        let json = std::fs::read_to_string(&handle_path)?;
        let handle: ModelHandle =
            serde_json::from_str(&json).map_err(|e| PipelineError::Serialization(e.to_string()))?;

        info!(handle = %handle.id, "model predicting");

        // Score rows from the master dataset when present; the scoring
        // itself belongs to the opaque backend.
        let master_path = config.master_path();
        let rows = if master_path.exists() {
            artifacts::read_features(&master_path)?
        } else {
            Vec::new()
        };

        let predictions_path = config.predictions_path();
        if let Some(parent) = predictions_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = String::from("symbol,start_ts,score\n");
        for row in &rows {
            let score = row.values.iter().sum::<f64>() / row.width().max(1) as f64;
            out.push_str(&format!("{},{},{}\n", row.symbol, row.start_ts, score));
        }
        std::fs::write(&predictions_path, out)?;

        Ok(
            StageResult::success(format!(
                "predicted {} rows with model '{}'",
                rows.len(),
                handle.id
            ))
            .with_artifact(predictions_path),
        )
    }
}
