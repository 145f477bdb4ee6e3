//! Data sources and artifact I/O for the pipeline.

pub mod artifacts;
mod csv_source;
mod source;

pub use csv_source::CsvBarSource;
pub use source::{BarSource, RetryPolicy, RetryingSource};
