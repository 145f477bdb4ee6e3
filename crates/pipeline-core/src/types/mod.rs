//! Domain types for the pipeline.

mod bar;
mod chunk;
mod feature;
mod symbol;
mod window;

pub use bar::{Bar, RawSeries};
pub use chunk::{split_into_chunks, Chunk, ChunkManifest};
pub use feature::FeatureVector;
pub use symbol::SymbolSet;
pub use window::TimeWindow;
