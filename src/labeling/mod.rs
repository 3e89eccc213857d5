//! Windowed sequence labeling for sentence boundary detection.
//!
//! The boundary model scores a bounded span of tokens at a time. A document
//! is flattened to its plain tokens, cut into overlapping windows, each window
//! is scored, and the per-window scores are stitched back into one label
//! distribution per token. Results are cached per token sequence, and a
//! request gets back only the tokens of the sentence it asked about.

mod cache;
mod distribution;
mod flatten;
mod splitter;
mod stitch;
mod target;
mod types;
mod window;

pub use cache::{CacheStats, CachedPredictions, PredictionCache, DEFAULT_CACHE_CAPACITY};
pub use distribution::{LabelDistribution, LabelPair};
pub use flatten::FlatSequence;
pub use splitter::{
    SentenceSplitter, SplitterOptions, DEFAULT_BATCH_SIZE, DEFAULT_MAX_CONCURRENT_CALLS,
    DEFAULT_MODEL_TIMEOUT,
};
pub use stitch::{candidate_sets, resolve, resolve_index};
pub use target::{locate, SentenceSelector, TargetRange};
pub use types::{Assignment, LabelingError};
pub use window::{Window, WindowConfig, WindowPlan, DEFAULT_SPAN_SIZE, DEFAULT_STRIDE_SIZE};
