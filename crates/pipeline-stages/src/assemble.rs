//! Train preparation stage: assemble the master training dataset.

use async_trait::async_trait;
use pipeline_core::{
    FeatureVector, PipelineConfig, PipelineError, PipelineResult, Stage, StageId, StageResult,
};
use pipeline_data::artifacts;
use tracing::info;

/// Merges per-symbol feature files into the single master training
/// artifact, deterministically ordered by (symbol, start timestamp).
///
/// Re-assembling from identical inputs yields a byte-identical file.
pub struct TrainPreparation;

#[async_trait]
impl Stage for TrainPreparation {
    fn id(&self) -> StageId {
        StageId::TrainPreparation
    }

    fn dependencies(&self) -> &'static [StageId] {
        &[StageId::Dna]
    }

    async fn run(&self, config: &PipelineConfig) -> PipelineResult<StageResult> {
        let dna_dir = config.dna_dir();
        if !dna_dir.exists() {
            return Err(PipelineError::dependency_missing(
                self.id().as_str(),
                &dna_dir,
            ));
        }

        let mut files: Vec<_> = std::fs::read_dir(&dna_dir)?
            .collect::<Result<Vec<_>, _>>()?
            .into_iter()
            .map(|entry| entry.path())
            .filter(|path| path.extension().is_some_and(|ext| ext == "csv"))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(PipelineError::dependency_missing(
                self.id().as_str(),
                &dna_dir,
            ));
        }

        let mut rows: Vec<FeatureVector> = Vec::new();
        for path in &files {
            rows.extend(artifacts::read_features(path)?);
        }
        rows.sort_by(|a, b| (&a.symbol, a.start_ts).cmp(&(&b.symbol, b.start_ts)));

        if rows.is_empty() {
            return Err(PipelineError::fatal(
                self.id().as_str(),
                "no feature rows found to assemble",
            ));
        }

        let master_path = config.master_path();
        artifacts::write_features(&master_path, &rows)?;

        info!(
            rows = rows.len(),
            files = files.len(),
            artifact = %master_path.display(),
            "master training dataset assembled"
        );

        Ok(
            StageResult::success(format!(
                "assembled {} rows from {} symbol files",
                rows.len(),
                files.len()
            ))
            .with_artifact(master_path),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_config;

    fn seed_dna(config: &PipelineConfig) {
        // written out of symbol order on purpose
        artifacts::write_features(
            &config.dna_path("MSFT"),
            &[
                FeatureVector::new("MSFT", 2000, vec![0.2, 0.2, 0.2, 0.2, 0.2]),
                FeatureVector::new("MSFT", 1000, vec![0.1, 0.1, 0.1, 0.1, 0.1]),
            ],
        )
        .unwrap();
        artifacts::write_features(
            &config.dna_path("AAPL"),
            &[FeatureVector::new("AAPL", 3000, vec![0.3, 0.3, 0.3, 0.3, 0.3])],
        )
        .unwrap();
    }

    #[tokio::test]
    async fn test_rows_ordered_by_symbol_then_timestamp() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed_dna(&config);

        TrainPreparation.run(&config).await.unwrap();

        let rows = artifacts::read_features(&config.master_path()).unwrap();
        let keys: Vec<(String, i64)> = rows
            .iter()
            .map(|r| (r.symbol.clone(), r.start_ts))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("AAPL".to_string(), 3000),
                ("MSFT".to_string(), 1000),
                ("MSFT".to_string(), 2000),
            ]
        );
    }

    #[tokio::test]
    async fn test_reassembly_is_byte_identical() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        seed_dna(&config);

        TrainPreparation.run(&config).await.unwrap();
        let first = std::fs::read(config.master_path()).unwrap();

        TrainPreparation.run(&config).await.unwrap();
        let second = std::fs::read(config.master_path()).unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_missing_dna_dir_is_dependency_missing() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let err = TrainPreparation.run(&config).await.unwrap_err();
        assert!(matches!(err, PipelineError::DependencyMissing { .. }));
    }
}
