//! Part-of-speech tagging with per-label scores.

use std::sync::Arc;

use tracing::debug;

use crate::backends::{BackendError, TagScorer};
use crate::labeling::{LabelDistribution, LabelingError};
use crate::models::{Sentence, TokenKind};

/// Scores every XPOS label for each token of a sentence.
pub struct XposTagger {
    scorer: Arc<dyn TagScorer>,
}

impl XposTagger {
    pub fn new(scorer: Arc<dyn TagScorer>) -> Self {
        Self { scorer }
    }

    pub fn backend_name(&self) -> &str {
        self.scorer.name()
    }

    /// One `{label: score}` map per token, multi-word tokens excluded. Each
    /// token's scores are rescaled so its best label gets 1 and its worst 0.
    pub async fn tag(&self, sentence: &Sentence) -> Result<Vec<LabelDistribution>, LabelingError> {
        let forms: Vec<String> = sentence
            .tokens
            .iter()
            .filter(|t| t.kind != TokenKind::Structural)
            .map(|t| t.form.clone())
            .collect();
        if forms.is_empty() {
            return Ok(Vec::new());
        }

        let output = self.scorer.score(&forms).await?;
        if output.scores.len() != forms.len() {
            return Err(BackendError::MalformedOutput(format!(
                "tagger returned {} rows for {} tokens",
                output.scores.len(),
                forms.len()
            ))
            .into());
        }

        debug!(
            tokens = forms.len(),
            labels = output.labels.len(),
            "Tagged sentence"
        );

        output
            .scores
            .iter()
            .map(|row| -> Result<LabelDistribution, LabelingError> {
                if row.len() != output.labels.len() {
                    return Err(BackendError::MalformedOutput(format!(
                        "row has {} scores for {} labels",
                        row.len(),
                        output.labels.len()
                    ))
                    .into());
                }
                Ok(output
                    .labels
                    .iter()
                    .cloned()
                    .zip(min_max_scale(row))
                    .collect())
            })
            .collect()
    }
}

/// Linearly map a row onto `[0, 1]`. A row with no spread maps to all ones.
pub fn min_max_scale(row: &[f64]) -> Vec<f64> {
    let min = row.iter().copied().fold(f64::INFINITY, f64::min);
    let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let spread = max - min;
    if spread <= 0.0 || !spread.is_finite() {
        return vec![1.0; row.len()];
    }
    row.iter().map(|v| (v - min) / spread).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::TagScores;
    use crate::conllu::parse_sentence;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedTagger {
        seen: Mutex<Vec<String>>,
        rows: usize,
    }

    #[async_trait]
    impl TagScorer for FixedTagger {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn score(&self, tokens: &[String]) -> Result<TagScores, BackendError> {
            *self.seen.lock().unwrap() = tokens.to_vec();
            Ok(TagScores {
                labels: vec!["NN".into(), "VB".into(), "DT".into()],
                scores: (0..self.rows).map(|_| vec![-2.0, 6.0, 2.0]).collect(),
            })
        }
    }

    const SAMPLE: &str = "# sent_id = s1\n\
        1-2\tIts\t_\t_\t_\t_\t_\t_\t_\t_\n\
        1\tIt\tit\tPRON\tPRP\t_\t3\tnsubj\t_\t_\n\
        2\ts\tbe\tAUX\tVBZ\t_\t3\tcop\t_\t_\n\
        3\tfine\tfine\tADJ\tJJ\t_\t0\troot\t_\t_\n";

    #[test]
    fn test_min_max_scale() {
        assert_eq!(min_max_scale(&[-2.0, 6.0, 2.0]), vec![0.0, 1.0, 0.5]);
        assert_eq!(min_max_scale(&[3.0, 3.0]), vec![1.0, 1.0]);
        assert!(min_max_scale(&[]).is_empty());
    }

    #[tokio::test]
    async fn test_tag_skips_multiword_tokens() {
        let scorer = Arc::new(FixedTagger {
            seen: Mutex::new(Vec::new()),
            rows: 3,
        });
        let tagger = XposTagger::new(scorer.clone());
        let sentence = parse_sentence(SAMPLE).unwrap();

        let tags = tagger.tag(&sentence).await.unwrap();
        assert_eq!(*scorer.seen.lock().unwrap(), vec!["It", "s", "fine"]);
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[0].get("VB"), Some(1.0));
        assert_eq!(tags[0].get("NN"), Some(0.0));
        assert_eq!(tags[0].get("DT"), Some(0.5));
    }

    #[tokio::test]
    async fn test_row_count_mismatch_is_malformed() {
        let tagger = XposTagger::new(Arc::new(FixedTagger {
            seen: Mutex::new(Vec::new()),
            rows: 2,
        }));
        let sentence = parse_sentence(SAMPLE).unwrap();
        let err = tagger.tag(&sentence).await.unwrap_err();
        assert!(matches!(
            err,
            LabelingError::Backend(BackendError::MalformedOutput(_))
        ));
    }
}
