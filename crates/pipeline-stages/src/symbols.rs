//! Symbol verification stage.

use async_trait::async_trait;
use pipeline_core::{
    PipelineConfig, PipelineError, PipelineResult, Stage, StageId, StageResult, SymbolSet,
};
use pipeline_data::artifacts;
use tracing::info;

/// Validates the base symbol reference file and produces the verified
/// symbol universe (`train.csv`).
///
/// Symbols failing the format check are dropped and counted; an empty
/// resulting universe is fatal.
pub struct SymbolVerification;

#[async_trait]
impl Stage for SymbolVerification {
    fn id(&self) -> StageId {
        StageId::SymbolVerification
    }

    fn dependencies(&self) -> &'static [StageId] {
        &[]
    }

    async fn run(&self, config: &PipelineConfig) -> PipelineResult<StageResult> {
        let base_path = config.resolved_train_base_path();
        if !base_path.exists() {
            return Err(PipelineError::Config(format!(
                "symbol reference file not found: {}",
                base_path.display()
            )));
        }

        let tokens = artifacts::read_symbol_tokens(&base_path)?;
        let (symbols, dropped) = SymbolSet::from_raw(tokens);

        if symbols.is_empty() {
            return Err(PipelineError::fatal(
                self.id().as_str(),
                format!("no valid symbols remain ({} dropped); empty universe", dropped),
            ));
        }

        let out_path = config.resolved_train_path();
        artifacts::write_symbols(&out_path, &symbols)?;
        info!(
            verified = symbols.len(),
            dropped,
            artifact = %out_path.display(),
            "symbol universe verified"
        );

        Ok(
            StageResult::success(format!(
                "verified {} symbols ({} dropped)",
                symbols.len(),
                dropped
            ))
            .with_artifact(out_path)
            .with_failed_items(dropped),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_config;
    use pipeline_core::StageStatus;

    #[tokio::test]
    async fn test_drops_invalid_and_reports_count() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.data_dir).unwrap();
        std::fs::write(
            config.resolved_train_base_path(),
            "symbol\nAAPL\nMSFT\nZZZZ99\n",
        )
        .unwrap();

        let result = SymbolVerification.run(&config).await.unwrap();
        assert_eq!(result.status, StageStatus::Success);
        assert_eq!(result.failed_items, 1);

        let set = pipeline_data::artifacts::read_symbols(&config.resolved_train_path()).unwrap();
        assert_eq!(set.symbols(), &["AAPL".to_string(), "MSFT".to_string()]);
    }

    #[tokio::test]
    async fn test_empty_universe_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.data_dir).unwrap();
        std::fs::write(config.resolved_train_base_path(), "symbol\n123\n!!\n").unwrap();

        let err = SymbolVerification.run(&config).await.unwrap_err();
        assert!(matches!(err, PipelineError::FatalStage { .. }));
    }

    #[tokio::test]
    async fn test_missing_reference_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let err = SymbolVerification.run(&config).await.unwrap_err();
        assert!(matches!(err, PipelineError::Config(_)));
    }
}
