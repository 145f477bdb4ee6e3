//! Stock DNA stage: one fixed-width feature vector per chunk.

use async_trait::async_trait;
use pipeline_core::{
    Chunk, FeatureVector, PipelineConfig, PipelineError, PipelineResult, Stage, StageId,
    StageResult,
};
use pipeline_data::artifacts;
use tracing::info;

/// Width of every extracted feature vector.
pub const FEATURE_WIDTH: usize = 5;

/// Derives a fixed-width feature vector ("DNA") from each chunk,
/// one-to-one and order-preserving.
///
/// The chunk manifest is a hard dependency: running without a prior
/// preprocessor artifact fails rather than guessing a chunk size.
pub struct StockDna;

/// Placeholder chunk statistics honoring only the shape contract.
fn extract(chunk: &Chunk) -> FeatureVector {
    let closes: Vec<f64> = chunk.bars.iter().map(|b| b.close).collect();
    let first_close = closes.first().copied().unwrap_or(0.0);
    let last_close = closes.last().copied().unwrap_or(0.0);

    let total_return = if first_close != 0.0 {
        (last_close - first_close) / first_close
    } else {
        0.0
    };

    let returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect();
    let mean_return = if returns.is_empty() {
        0.0
    } else {
        returns.iter().sum::<f64>() / returns.len() as f64
    };
    let volatility = if returns.len() < 2 {
        0.0
    } else {
        let variance = returns
            .iter()
            .map(|r| (r - mean_return).powi(2))
            .sum::<f64>()
            / (returns.len() - 1) as f64;
        variance.sqrt()
    };

    let mean_range = chunk
        .bars
        .iter()
        .filter(|b| b.close != 0.0)
        .map(|b| b.range() / b.close)
        .sum::<f64>()
        / chunk.len().max(1) as f64;

    let low = chunk.bars.iter().map(|b| b.low).fold(f64::MAX, f64::min);
    let high = chunk.bars.iter().map(|b| b.high).fold(f64::MIN, f64::max);
    let close_position = if high > low {
        (last_close - low) / (high - low)
    } else {
        0.0
    };

    FeatureVector::new(
        chunk.symbol.clone(),
        chunk.start_ts,
        vec![total_return, mean_return, volatility, mean_range, close_position],
    )
}

#[async_trait]
impl Stage for StockDna {
    fn id(&self) -> StageId {
        StageId::Dna
    }

    fn dependencies(&self) -> &'static [StageId] {
        &[StageId::Preprocess]
    }

    async fn run(&self, config: &PipelineConfig) -> PipelineResult<StageResult> {
        let manifest_path = config.chunk_manifest_path();
        if !manifest_path.exists() {
            return Err(PipelineError::dependency_missing(
                self.id().as_str(),
                &manifest_path,
            ));
        }
        let manifest = artifacts::read_manifest(&manifest_path)?;

        let mut total_vectors = 0;
        for symbol in manifest.symbols() {
            let chunk_path = config.chunk_path(symbol);
            if !chunk_path.exists() {
                return Err(PipelineError::dependency_missing(
                    self.id().as_str(),
                    &chunk_path,
                ));
            }
            let chunks = artifacts::read_chunks(&chunk_path, symbol)?;
            let features: Vec<FeatureVector> = chunks.iter().map(extract).collect();
            debug_assert!(features.len() == chunks.len());
            artifacts::write_features(&config.dna_path(symbol), &features)?;
            total_vectors += features.len();
        }

        info!(
            symbols = manifest.chunk_counts.len(),
            vectors = total_vectors,
            chunk_size = manifest.chunk_size,
            width = FEATURE_WIDTH,
            "DNA extraction complete"
        );

        Ok(
            StageResult::success(format!(
                "extracted {} vectors of width {} across {} symbols",
                total_vectors,
                FEATURE_WIDTH,
                manifest.chunk_counts.len()
            ))
            .with_artifact(config.dna_dir()),
        )
    }
}
