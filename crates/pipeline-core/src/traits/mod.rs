//! Core traits for the pipeline.

mod stage;

pub use stage::{Stage, StageId, StageResult, StageStatus};
