//! Dependency parsing with head confidence.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::backends::{ArcScorer, BackendError};
use crate::labeling::LabelingError;
use crate::models::{Sentence, TokenKind};

/// Predicted attachment for one token.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeadPrediction {
    /// 1-based position of the head token, 0 for the root.
    pub head: usize,
    pub deprel: String,
    /// Probability the parser gave its chosen head.
    pub probability: f64,
}

pub struct DependencyAnnotator {
    parser: Arc<dyn ArcScorer>,
}

impl DependencyAnnotator {
    pub fn new(parser: Arc<dyn ArcScorer>) -> Self {
        Self { parser }
    }

    pub fn backend_name(&self) -> &str {
        self.parser.name()
    }

    /// Parse the sentence afresh, ignoring any existing annotation. Multi-word
    /// tokens are not attachment targets and are left out.
    pub async fn parse(&self, sentence: &Sentence) -> Result<Vec<HeadPrediction>, LabelingError> {
        let forms: Vec<String> = sentence
            .tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Structural)
            .map(|t| t.form.clone())
            .collect();
        if forms.is_empty() {
            return Ok(Vec::new());
        }

        let arcs = self.parser.parse(&forms).await?;
        if arcs.len() != forms.len() {
            return Err(BackendError::MalformedOutput(format!(
                "parser returned {} arcs for {} tokens",
                arcs.len(),
                forms.len()
            ))
            .into());
        }

        arcs.into_iter()
            .map(|arc| -> Result<HeadPrediction, LabelingError> {
                let probability = arc.probs.iter().copied().fold(f64::NAN, f64::max);
                if probability.is_nan() {
                    return Err(BackendError::MalformedOutput(
                        "parser returned an empty head distribution".to_string(),
                    )
                    .into());
                }
                Ok(HeadPrediction {
                    head: arc.head,
                    deprel: arc.deprel,
                    probability,
                })
            })
            .collect()
    }
}
