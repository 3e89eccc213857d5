//! Model backend abstraction.
//!
//! Every model the services delegate to sits behind one of these traits:
//! - [`SequenceLabeler`]: scores token spans with a label per position
//!   (sentence boundary detection)
//! - [`TagScorer`]: raw per-label scores for each token (XPOS tagging)
//! - [`ArcScorer`]: a head, relation and head distribution per token
//!   (dependency parsing)
//!
//! Scores are carried as `f64` even though most models only produce 32-bit
//! precision.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from model backends.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Model call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Connection to model server failed: {0}")]
    Connection(String),

    #[error("Model server returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Malformed model output: {0}")]
    MalformedOutput(String),
}

impl BackendError {
    /// Whether repeating the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout(_) | Self::Connection(_) => true,
            Self::Api { status, .. } => *status >= 500,
            Self::MalformedOutput(_) => false,
        }
    }
}

/// One predicted label with its confidence in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabelScore {
    pub label: String,
    pub score: f64,
}

impl LabelScore {
    pub fn new(label: impl Into<String>, score: f64) -> Self {
        Self {
            label: label.into(),
            score,
        }
    }
}

/// Raw tagger output for one sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagScores {
    /// Label inventory; every row is indexed by it.
    pub labels: Vec<String>,
    /// One row of raw scores per token.
    pub scores: Vec<Vec<f64>>,
}

/// Parser output for one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArcScores {
    /// Predicted head (1-based token position, 0 for root).
    pub head: usize,
    pub deprel: String,
    /// Probability of each candidate head.
    pub probs: Vec<f64>,
}

/// A model that labels every position of every span in a batch.
#[async_trait]
pub trait SequenceLabeler: Send + Sync {
    /// Short name for logs and status output.
    fn name(&self) -> &str;

    /// Label a batch of token spans. The result holds one row per span and
    /// one score per token in that span.
    async fn predict(&self, batch: &[Vec<String>]) -> Result<Vec<Vec<LabelScore>>, BackendError>;
}

/// A part-of-speech tagger exposing its full score matrix.
#[async_trait]
pub trait TagScorer: Send + Sync {
    fn name(&self) -> &str;

    async fn score(&self, tokens: &[String]) -> Result<TagScores, BackendError>;
}

/// A dependency parser exposing head probabilities.
#[async_trait]
pub trait ArcScorer: Send + Sync {
    fn name(&self) -> &str;

    async fn parse(&self, tokens: &[String]) -> Result<Vec<ArcScores>, BackendError>;
}
