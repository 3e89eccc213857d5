//! Random baselines for exercising the annotation tool without models.

use rand::Rng;

use crate::backends::random::draw_boundary_probability;
use crate::labeling::{LabelDistribution, LabelPair};
use crate::models::{Sentence, TokenKind};

/// Label for attaching a token to the root.
pub const ROOT_HEAD: &str = "root";

/// A random begin/outside distribution for every plain token of a sentence.
pub fn random_sentence_probabilities<R: Rng + ?Sized>(
    sentence: &Sentence,
    labels: &LabelPair,
    rng: &mut R,
) -> Vec<LabelDistribution> {
    sentence
        .plain_tokens()
        .map(|_| {
            let v = draw_boundary_probability(&mut *rng);
            let mut dist = LabelDistribution::new();
            dist.insert(labels.begin.as_str(), v);
            dist.insert(labels.outside.as_str(), 1.0 - v);
            dist
        })
        .collect()
}

/// A random head distribution for every non-multiword token. Candidate heads
/// are the root and every token kept, keyed by token id.
pub fn random_head_probabilities<R: Rng + ?Sized>(
    sentence: &Sentence,
    rng: &mut R,
) -> Vec<LabelDistribution> {
    let tokens: Vec<_> = sentence
        .tokens
        .iter()
        .filter(|t| t.kind != TokenKind::Structural)
        .collect();
    let heads: Vec<String> = std::iter::once(ROOT_HEAD.to_string())
        .chain(tokens.iter().map(|t| t.id.to_string()))
        .collect();

    tokens
        .iter()
        .map(|_| {
            let weights: Vec<f64> = heads.iter().map(|_| rng.gen::<f64>()).collect();
            let total: f64 = weights.iter().sum();
            heads
                .iter()
                .zip(weights)
                .map(|(head, w)| {
                    let p = if total > 0.0 {
                        w / total
                    } else {
                        1.0 / heads.len() as f64
                    };
                    (head.clone(), p)
                })
                .collect()
        })
        .collect()
}
