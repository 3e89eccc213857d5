//! Shared types for the labeling pipeline.

use thiserror::Error;

use crate::backends::BackendError;
use crate::conllu::ConlluError;

/// Errors from sentence splitting and the other labeling services.
#[derive(Debug, Error)]
pub enum LabelingError {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invalid document: {0}")]
    Document(#[from] ConlluError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Sentence not found: {0}")]
    SentenceNotFound(String),

    #[error("Token {index} is not covered by any window")]
    Uncovered { index: usize },

    #[error("Range {begin}..{end} is outside a prediction sequence of {len} tokens")]
    OutOfRange { begin: usize, end: usize, len: usize },

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),
}

impl LabelingError {
    /// Whether the caller sent something unusable. Retrying the same input
    /// will fail the same way.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            Self::Document(_) | Self::InvalidInput(_) | Self::SentenceNotFound(_)
        )
    }

    /// Whether repeating the request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Backend(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// The window chosen for one flat token, and the token's position inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Assignment {
    pub sequence_number: usize,
    pub position: usize,
}
