//! Annotation services.
//!
//! Each service turns one sentence into per-token predictions by delegating
//! to a model backend. Sentence splitting lives in [`crate::labeling`] since
//! it works on whole documents.

pub mod dep;
pub mod random;
mod registry;
pub mod xpos;

pub use dep::{DependencyAnnotator, HeadPrediction};
pub use random::{random_head_probabilities, random_sentence_probabilities};
pub use registry::Services;
pub use xpos::XposTagger;
