//! Stock data collection stage.

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use pipeline_core::{
    Bar, PipelineConfig, PipelineError, PipelineResult, RawSeries, Stage, StageId, StageResult,
};
use pipeline_data::{artifacts, BarSource, CsvBarSource, RetryPolicy, RetryingSource};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Fetches one raw series per verified symbol for the configured window.
///
/// Per-symbol fetches run under a bounded worker pool; results are
/// gathered into a BTreeMap so downstream ordering is stable regardless
/// of completion order. Individual fetch failures are partial failures;
/// only all symbols failing is fatal.
pub struct DataCollection {
    source: Arc<dyn BarSource>,
}

impl DataCollection {
    pub fn new(source: Arc<dyn BarSource>) -> Self {
        Self { source }
    }

    /// Provider-backed collector with the configured retry budget.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let policy = RetryPolicy {
            timeout_secs: config.fetch_timeout_secs,
            max_attempts: config.fetch_retries,
        };
        let source = CsvBarSource::new(config.provider_dir.clone());
        Self::new(Arc::new(RetryingSource::new(source, policy)))
    }
}

#[async_trait]
impl Stage for DataCollection {
    fn id(&self) -> StageId {
        StageId::DataCollection
    }

    fn dependencies(&self) -> &'static [StageId] {
        &[StageId::SymbolVerification]
    }

    async fn run(&self, config: &PipelineConfig) -> PipelineResult<StageResult> {
        let train_path = config.resolved_train_path();
        if !train_path.exists() {
            return Err(PipelineError::dependency_missing(
                self.id().as_str(),
                &train_path,
            ));
        }

        let symbols = artifacts::read_symbols(&train_path)?;
        if symbols.is_empty() {
            return Err(PipelineError::fatal(
                self.id().as_str(),
                "verified symbol list is empty",
            ));
        }

        let window = config.window;
        let concurrency = config.fetch_concurrency.max(1);
        let fetches = stream::iter(symbols.iter().cloned())
            .map(|symbol| {
                let source = Arc::clone(&self.source);
                async move {
                    let outcome = source.fetch_bars(&symbol, &window).await;
                    (symbol, outcome)
                }
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>()
            .await;

        let mut collected: BTreeMap<String, Vec<Bar>> = BTreeMap::new();
        let mut failed: Vec<String> = Vec::new();
        for (symbol, outcome) in fetches {
            match outcome {
                Ok(bars) => {
                    collected.insert(symbol, bars);
                }
                Err(err) => {
                    warn!(symbol = %symbol, error = %err, "symbol fetch failed");
                    failed.push(symbol);
                }
            }
        }
        failed.sort();

        if collected.is_empty() {
            return Err(PipelineError::fatal(
                self.id().as_str(),
                format!("all {} symbol fetches failed", symbols.len()),
            ));
        }

        for (symbol, bars) in &collected {
            let series = RawSeries::from_bars(symbol.clone(), bars.clone());
            artifacts::write_series(&config.raw_path(symbol), &series)?;
        }

        info!(
            collected = collected.len(),
            failed = failed.len(),
            window = %window,
            "stock data collected"
        );

        let summary = if failed.is_empty() {
            format!("collected {} series for {}", collected.len(), window)
        } else {
            format!(
                "collected {} series for {} ({} fetches failed: {})",
                collected.len(),
                window,
                failed.len(),
                failed.join(", ")
            )
        };

        Ok(StageResult::success(summary)
            .with_artifact(config.raw_dir())
            .with_failed_items(failed.len()))
    }
}
