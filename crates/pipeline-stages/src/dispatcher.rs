//! Stage dispatch: order resolution and failure propagation.

use crate::registry::StageRegistry;
use pipeline_core::{
    PipelineConfig, PipelineError, PipelineResult, StageId, StageResult, StageStatus,
};
use std::collections::HashSet;
use tracing::{error, info};

/// Orchestration entry point shared by the one-shot and interactive
/// front ends.
///
/// Resolves any requested stage subset into canonical dependency order
/// and runs each stage in sequence. A stage whose requested upstream
/// failed (directly or transitively) in this invocation is skipped;
/// independent stages still run. Artifacts left by prior invocations
/// satisfy dependencies on stages that were not requested.
pub struct Dispatcher {
    registry: StageRegistry,
}

impl Dispatcher {
    pub fn new(registry: StageRegistry) -> Self {
        Self { registry }
    }

    /// Run a batch of requested stages, returning one result per stage
    /// in execution order.
    pub async fn run_batch(
        &self,
        requested: &[StageId],
        config: &PipelineConfig,
    ) -> PipelineResult<Vec<(StageId, StageResult)>> {
        let order = self.resolve_order(requested)?;

        let mut blocked: HashSet<StageId> = HashSet::new();
        let mut results = Vec::with_capacity(order.len());

        for id in order {
            let stage = self
                .registry
                .get(id)
                .ok_or_else(|| PipelineError::Config(format!("unknown stage identifier: '{}'", id)))?;

            if let Some(dep) = stage.dependencies().iter().find(|dep| blocked.contains(*dep)) {
                info!(stage = %id, upstream = %dep, "skipping stage: upstream failed");
                blocked.insert(id);
                results.push((
                    id,
                    StageResult::skipped(format!(
                        "upstream stage '{}' failed in this invocation",
                        dep
                    )),
                ));
                continue;
            }

            info!(stage = %id, "running stage");
            match stage.run(config).await {
                Ok(result) => {
                    info!(stage = %id, status = %result.status, summary = %result.summary, "stage finished");
                    if result.status == StageStatus::Failed {
                        blocked.insert(id);
                    }
                    results.push((id, result));
                }
                Err(err) => {
                    error!(stage = %id, error = %err, "stage failed");
                    blocked.insert(id);
                    results.push((id, StageResult::failed(err.to_string())));
                }
            }
        }

        Ok(results)
    }

    /// Deduplicate the request and sort it into canonical dependency
    /// order. Unknown identifiers are a configuration error reported
    /// before anything runs.
    fn resolve_order(&self, requested: &[StageId]) -> PipelineResult<Vec<StageId>> {
        let mut seen = HashSet::new();
        let mut order: Vec<StageId> = requested
            .iter()
            .copied()
            .filter(|id| seen.insert(*id))
            .collect();
        order.sort_by_key(|id| id.ordinal());

        for id in &order {
            if !self.registry.contains(*id) {
                return Err(PipelineError::Config(format!(
                    "unknown stage identifier: '{}'",
                    id
                )));
            }
        }
        Ok(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::test_config;
    use async_trait::async_trait;
    use pipeline_core::Stage;
    use std::sync::{Arc, Mutex};

    /// Scripted stage recording its execution order.
    struct StubStage {
        id: StageId,
        deps: &'static [StageId],
        fail: bool,
        log: Arc<Mutex<Vec<StageId>>>,
    }

    #[async_trait]
    impl Stage for StubStage {
        fn id(&self) -> StageId {
            self.id
        }

        fn dependencies(&self) -> &'static [StageId] {
            self.deps
        }

        async fn run(&self, _config: &PipelineConfig) -> PipelineResult<StageResult> {
            self.log.lock().unwrap().push(self.id);
            if self.fail {
                Err(PipelineError::fatal(self.id.as_str(), "scripted failure"))
            } else {
                Ok(StageResult::success("ok"))
            }
        }
    }

    fn dispatcher_with(
        specs: &[(StageId, &'static [StageId], bool)],
    ) -> (Dispatcher, Arc<Mutex<Vec<StageId>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let stages: Vec<Arc<dyn Stage>> = specs
            .iter()
            .map(|&(id, deps, fail)| {
                Arc::new(StubStage {
                    id,
                    deps,
                    fail,
                    log: Arc::clone(&log),
                }) as Arc<dyn Stage>
            })
            .collect();
        (Dispatcher::new(StageRegistry::with_stages(stages)), log)
    }

    #[tokio::test]
    async fn test_requested_subset_runs_in_canonical_order() {
        let (dispatcher, log) = dispatcher_with(&[
            (StageId::Preprocess, &[], false),
            (StageId::Dna, &[], false),
            (StageId::SymbolVerification, &[], false),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        dispatcher
            .run_batch(
                &[StageId::Dna, StageId::SymbolVerification, StageId::Preprocess],
                &config,
            )
            .await
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![StageId::SymbolVerification, StageId::Preprocess, StageId::Dna]
        );
    }

    #[tokio::test]
    async fn test_failure_skips_dependents_transitively() {
        let (dispatcher, log) = dispatcher_with(&[
            (StageId::DataCollection, &[], true),
            (StageId::Preprocess, &[StageId::DataCollection], false),
            (StageId::Dna, &[StageId::Preprocess], false),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let results = dispatcher
            .run_batch(
                &[StageId::DataCollection, StageId::Preprocess, StageId::Dna],
                &config,
            )
            .await
            .unwrap();

        assert_eq!(results[0].1.status, StageStatus::Failed);
        assert_eq!(results[1].1.status, StageStatus::Skipped);
        assert_eq!(results[2].1.status, StageStatus::Skipped);
        // only the failing stage actually ran
        assert_eq!(*log.lock().unwrap(), vec![StageId::DataCollection]);
    }

    #[tokio::test]
    async fn test_independent_stage_still_runs_after_failure() {
        let (dispatcher, log) = dispatcher_with(&[
            (StageId::SymbolVerification, &[], false),
            (StageId::DataCollection, &[], true),
            (StageId::Train, &[], false),
        ]);
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let results = dispatcher
            .run_batch(
                &[StageId::DataCollection, StageId::Train, StageId::SymbolVerification],
                &config,
            )
            .await
            .unwrap();

        assert_eq!(results.len(), 3);
        assert!(log.lock().unwrap().contains(&StageId::Train));
        assert!(log.lock().unwrap().contains(&StageId::SymbolVerification));
    }

    #[tokio::test]
    async fn test_unknown_stage_reported_before_anything_runs() {
        let (dispatcher, log) =
            dispatcher_with(&[(StageId::SymbolVerification, &[], false)]);
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let err = dispatcher
            .run_batch(&[StageId::SymbolVerification, StageId::Dna], &config)
            .await
            .unwrap_err();

        assert!(matches!(err, PipelineError::Config(_)));
        assert!(log.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_requests_run_once() {
        let (dispatcher, log) = dispatcher_with(&[(StageId::Preprocess, &[], false)]);
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());

        let results = dispatcher
            .run_batch(&[StageId::Preprocess, StageId::Preprocess], &config)
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(log.lock().unwrap().len(), 1);
    }
}
