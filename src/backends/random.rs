//! Random baseline backends.
//!
//! Stand-ins for real models during development and UI testing. The boundary
//! draw is skewed heavily towards "not a boundary" so the output looks like a
//! plausible document.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use super::backend::{BackendError, LabelScore, SequenceLabeler};

/// Boundary probabilities to draw from: sixteen near-zero entries and four
/// confident ones.
pub const BOUNDARY_CHOICES: [f64; 20] = [
    0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01, 0.01,
    0.12, 0.98, 0.9, 0.88,
];

/// Draw the probability that a token begins a sentence.
pub fn draw_boundary_probability<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    *BOUNDARY_CHOICES.choose(rng).unwrap_or(&BOUNDARY_CHOICES[0])
}

/// A sequence labeler that assigns random boundary probabilities.
pub struct RandomBoundaryLabeler {
    label: String,
    rng: Mutex<StdRng>,
}

impl RandomBoundaryLabeler {
    pub fn new(label: impl Into<String>) -> Self {
        Self::from_rng(label, StdRng::from_entropy())
    }

    /// Deterministic labeler for tests.
    pub fn seeded(label: impl Into<String>, seed: u64) -> Self {
        Self::from_rng(label, StdRng::seed_from_u64(seed))
    }

    fn from_rng(label: impl Into<String>, rng: StdRng) -> Self {
        Self {
            label: label.into(),
            rng: Mutex::new(rng),
        }
    }
}

#[async_trait]
impl SequenceLabeler for RandomBoundaryLabeler {
    fn name(&self) -> &str {
        "random"
    }

    async fn predict(&self, batch: &[Vec<String>]) -> Result<Vec<Vec<LabelScore>>, BackendError> {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        Ok(batch
            .iter()
            .map(|span| {
                span.iter()
                    .map(|_| LabelScore::new(&self.label, draw_boundary_probability(&mut *rng)))
                    .collect()
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draw_comes_from_choices() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let p = draw_boundary_probability(&mut rng);
            assert!(BOUNDARY_CHOICES.contains(&p));
        }
    }

    #[tokio::test]
    async fn test_predict_shape_matches_batch() {
        let labeler = RandomBoundaryLabeler::seeded("B", 1);
        let batch = vec![vec!["a".to_string(); 3], vec!["b".to_string(); 5]];
        let out = labeler.predict(&batch).await.unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].len(), 3);
        assert_eq!(out[1].len(), 5);
        assert!(out.iter().flatten().all(|s| s.label == "B"));
    }

    #[tokio::test]
    async fn test_poisoned_lock_keeps_drawing() {
        let labeler = std::sync::Arc::new(RandomBoundaryLabeler::seeded("B", 2));
        let holder = std::sync::Arc::clone(&labeler);
        let _ = std::thread::spawn(move || {
            let _guard = holder.rng.lock().unwrap();
            panic!("holder panicked");
        })
        .join();
        assert!(labeler.rng.is_poisoned());

        let out = labeler.predict(&[vec!["a".to_string(); 4]]).await.unwrap();
        assert_eq!(out[0].len(), 4);
        assert!(out[0].iter().all(|s| BOUNDARY_CHOICES.contains(&s.score)));
    }

    #[tokio::test]
    async fn test_seeded_labelers_agree() {
        let batch = vec![vec!["x".to_string(); 8]];
        let a = RandomBoundaryLabeler::seeded("B", 42).predict(&batch).await.unwrap();
        let b = RandomBoundaryLabeler::seeded("B", 42).predict(&batch).await.unwrap();
        assert_eq!(a, b);
    }
}
