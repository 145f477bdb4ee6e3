//! Pipeline stage implementations and orchestration.
//!
//! One file per stage, each implementing the shared [`Stage`] contract
//! from `pipeline-core`, plus the declarative stage registry and the
//! dispatcher that resolves a requested subset into dependency order.

mod assemble;
mod collect;
mod dispatcher;
mod dna;
mod model;
mod preprocess;
mod registry;
mod symbols;

pub use assemble::TrainPreparation;
pub use collect::DataCollection;
pub use dispatcher::Dispatcher;
pub use dna::{StockDna, FEATURE_WIDTH};
pub use model::{ModelHandle, ModelPredict, ModelTrain};
pub use preprocess::Preprocess;
pub use registry::StageRegistry;
pub use symbols::SymbolVerification;

pub use pipeline_core::Stage;

#[cfg(test)]
pub(crate) mod test_support {
    use pipeline_core::{PipelineConfig, TimeWindow};
    use std::path::Path;

    /// Config rooted in a scratch directory for stage tests.
    pub fn test_config(root: &Path) -> PipelineConfig {
        PipelineConfig {
            train_base_filename: "train_base.csv".into(),
            train_filename: "train.csv".into(),
            window: TimeWindow::parse("2022-01-01", "2023-10-01").unwrap(),
            chunk_size: 3,
            provider_dir: root.join("provider"),
            data_dir: root.join("data"),
            fetch_timeout_secs: 2,
            fetch_retries: 2,
            fetch_concurrency: 2,
            model_project: "stockdna".into(),
        }
    }
}
