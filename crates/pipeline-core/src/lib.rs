//! Core types and traits for the stockdna pipeline.
//!
//! This crate provides the foundational building blocks including:
//! - Domain types (SymbolSet, TimeWindow, Bar, RawSeries, Chunk, FeatureVector)
//! - The shared stage contract (Stage, StageId, StageResult)
//! - The immutable per-invocation PipelineConfig
//! - The pipeline error taxonomy

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

pub use config::PipelineConfig;
pub use error::{DataError, PipelineError, PipelineResult};
pub use traits::*;
pub use types::*;
