//! Declarative mapping from stage identifiers to stage implementations.

use crate::{
    DataCollection, ModelPredict, ModelTrain, Preprocess, StockDna, SymbolVerification,
    TrainPreparation,
};
use pipeline_core::{PipelineConfig, Stage, StageId};
use std::collections::HashMap;
use std::sync::Arc;

/// Registry of runnable stages keyed by identifier.
pub struct StageRegistry {
    stages: HashMap<StageId, Arc<dyn Stage>>,
}

impl StageRegistry {
    /// Build the full built-in stage set for a configured invocation.
    pub fn new(config: &PipelineConfig) -> Self {
        Self::with_stages(vec![
            Arc::new(SymbolVerification),
            Arc::new(DataCollection::from_config(config)),
            Arc::new(Preprocess),
            Arc::new(StockDna),
            Arc::new(TrainPreparation),
            Arc::new(ModelTrain),
            Arc::new(ModelPredict),
        ])
    }

    /// Build a registry from an explicit stage set.
    pub fn with_stages(stages: Vec<Arc<dyn Stage>>) -> Self {
        Self {
            stages: stages.into_iter().map(|s| (s.id(), s)).collect(),
        }
    }

    /// Look up a stage by identifier.
    pub fn get(&self, id: StageId) -> Option<&Arc<dyn Stage>> {
        self.stages.get(&id)
    }

    /// Check whether a stage is registered.
    pub fn contains(&self, id: StageId) -> bool {
        self.stages.contains_key(&id)
    }

    /// Registered identifiers in canonical order.
    pub fn ids(&self) -> Vec<StageId> {
        let mut ids: Vec<StageId> = self.stages.keys().copied().collect();
        ids.sort_by_key(|id| id.ordinal());
        ids
    }
}
