//! Sentence boundary prediction over whole documents.

use std::sync::Arc;
use std::time::Duration;

use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, warn};

use crate::backends::{BackendError, LabelScore, SequenceLabeler};
use crate::models::Document;

use super::cache::{CachedPredictions, PredictionCache};
use super::distribution::{LabelDistribution, LabelPair};
use super::flatten::FlatSequence;
use super::stitch;
use super::target::{locate, SentenceSelector};
use super::types::LabelingError;
use super::window::{WindowConfig, WindowPlan};

pub const DEFAULT_BATCH_SIZE: usize = 32;
pub const DEFAULT_MAX_CONCURRENT_CALLS: usize = 4;
pub const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(30);

/// Tuning for a [`SentenceSplitter`].
#[derive(Debug, Clone)]
pub struct SplitterOptions {
    pub window: WindowConfig,
    /// Windows sent to the model per call.
    pub batch_size: usize,
    /// Model calls in flight at once for one document.
    pub max_concurrent_calls: usize,
    /// Upper bound on all model calls for one document.
    pub timeout: Duration,
    pub labels: LabelPair,
}

impl Default for SplitterOptions {
    fn default() -> Self {
        Self {
            window: WindowConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_concurrent_calls: DEFAULT_MAX_CONCURRENT_CALLS,
            timeout: DEFAULT_MODEL_TIMEOUT,
            labels: LabelPair::default(),
        }
    }
}

/// Predicts a begin/outside distribution for every plain token of a document
/// by scoring overlapping windows and stitching the results.
pub struct SentenceSplitter {
    labeler: Arc<dyn SequenceLabeler>,
    cache: Arc<PredictionCache>,
    options: SplitterOptions,
}

impl SentenceSplitter {
    pub fn new(
        labeler: Arc<dyn SequenceLabeler>,
        cache: Arc<PredictionCache>,
        options: SplitterOptions,
    ) -> Self {
        Self {
            labeler,
            cache,
            options,
        }
    }

    pub fn options(&self) -> &SplitterOptions {
        &self.options
    }

    pub fn cache(&self) -> &Arc<PredictionCache> {
        &self.cache
    }

    pub fn labeler_name(&self) -> &str {
        self.labeler.name()
    }

    /// Distributions for the selected sentence, in token order.
    pub async fn split(
        &self,
        doc: &Document,
        selector: &SentenceSelector,
    ) -> Result<Vec<LabelDistribution>, LabelingError> {
        // Resolve the target first so a bad selector never costs a model call.
        let range = locate(doc, selector)?;
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let predictions = self.predict_document(doc).await?;
        Ok(range.slice(predictions.as_slice())?.to_vec())
    }

    /// Distributions for every plain token of the document, from the cache
    /// when this exact token sequence has been seen before.
    pub async fn predict_document(&self, doc: &Document) -> Result<CachedPredictions, LabelingError> {
        let flat = FlatSequence::from_document(doc);
        if flat.is_empty() {
            return Ok(Arc::new(Vec::new()));
        }

        let key = flat.cache_key();
        match self.cache.get(&key) {
            Some(hit) if hit.len() == flat.len() => {
                debug!(tokens = flat.len(), "Prediction cache hit");
                return Ok(hit);
            }
            Some(hit) => {
                warn!(
                    tokens = flat.len(),
                    cached = hit.len(),
                    "Cache key shared by a different token sequence, recomputing"
                );
            }
            None => {}
        }

        let plan = WindowPlan::generate(&flat.forms, self.options.window);
        debug!(
            tokens = flat.len(),
            windows = plan.len(),
            model = self.labeler.name(),
            "Prediction cache miss, scoring windows"
        );

        let rows = self.score_windows(&plan).await.inspect_err(|e| {
            warn!(model = self.labeler.name(), "Sentence model failed: {}", e);
        })?;

        let assignments = stitch::resolve(&plan.windows, flat.len())?;
        let predictions = assignments
            .iter()
            .map(|a| self.options.labels.distribution(&rows[a.sequence_number][a.position]))
            .collect::<Result<Vec<_>, _>>()?;

        let predictions = Arc::new(predictions);
        self.cache.insert(key, Arc::clone(&predictions));
        Ok(predictions)
    }

    /// Run every window through the model, in batches with a bounded number
    /// of calls in flight, and check that the output lines up with the input.
    async fn score_windows(&self, plan: &WindowPlan) -> Result<Vec<Vec<LabelScore>>, BackendError> {
        let batch_size = self.options.batch_size.max(1);
        let in_flight = self.options.max_concurrent_calls.max(1);
        let pending: Vec<_> = plan
            .spans
            .chunks(batch_size)
            .map(|batch| self.labeler.predict(batch))
            .collect();
        let calls = stream::iter(pending)
            .buffered(in_flight)
            .try_collect::<Vec<_>>();

        let timeout = self.options.timeout;
        let batches = tokio::time::timeout(timeout, calls)
            .await
            .map_err(|_| BackendError::Timeout(timeout))??;

        let rows: Vec<Vec<LabelScore>> = batches.into_iter().flatten().collect();
        if rows.len() != plan.len() {
            return Err(BackendError::MalformedOutput(format!(
                "expected {} prediction rows, got {}",
                plan.len(),
                rows.len()
            )));
        }
        for (seq, (row, span)) in rows.iter().zip(&plan.spans).enumerate() {
            if row.len() != span.len() {
                return Err(BackendError::MalformedOutput(format!(
                    "window {} has {} tokens but {} predictions",
                    seq,
                    span.len(),
                    row.len()
                )));
            }
        }
        Ok(rows)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::RandomBoundaryLabeler;
    use crate::models::{Sentence, Token, TokenId};
    use async_trait::async_trait;
    use std::num::NonZeroUsize;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Tracks the most model calls seen in flight at once.
    #[derive(Default)]
    struct InFlightTracker {
        active: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    /// Scores every position with "B" at `position / 100`, so the output
    /// shows which window position each token was read from.
    #[derive(Default)]
    struct PositionLabeler {
        calls: AtomicUsize,
        drop_row: bool,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl SequenceLabeler for PositionLabeler {
        fn name(&self) -> &str {
            "position"
        }

        async fn predict(
            &self,
            batch: &[Vec<String>],
        ) -> Result<Vec<Vec<LabelScore>>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let mut rows: Vec<Vec<LabelScore>> = batch
                .iter()
                .map(|span| {
                    (0..span.len())
                        .map(|p| LabelScore::new("B", p as f64 / 100.0))
                        .collect()
                })
                .collect();
            if self.drop_row {
                rows.pop();
            }
            Ok(rows)
        }
    }

    #[async_trait]
    impl SequenceLabeler for InFlightTracker {
        fn name(&self) -> &str {
            "concurrency"
        }

        async fn predict(
            &self,
            batch: &[Vec<String>],
        ) -> Result<Vec<Vec<LabelScore>>, BackendError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(5)).await;
            self.active.fetch_sub(1, Ordering::SeqCst);
            Ok(batch
                .iter()
                .map(|span| span.iter().map(|_| LabelScore::new("B", 0.5)).collect())
                .collect())
        }
    }

    fn sentence(id: &str, len: u32) -> Sentence {
        let tokens = (1..=len)
            .map(|i| Token::new(TokenId::Word(i), format!("{}-{}", id, i)))
            .collect();
        Sentence::new(tokens).with_meta("sent_id", id)
    }

    fn doc() -> Document {
        Document::new(vec![sentence("s1", 5), sentence("s2", 9)])
    }

    fn splitter(labeler: Arc<dyn SequenceLabeler>) -> SentenceSplitter {
        SentenceSplitter::new(
            labeler,
            Arc::new(PredictionCache::new(NonZeroUsize::new(8).unwrap())),
            SplitterOptions::default(),
        )
    }

    fn begin_scores(dists: &[LabelDistribution]) -> Vec<f64> {
        dists.iter().map(|d| d.get("B").unwrap()).collect()
    }

    #[tokio::test]
    async fn test_stitching_reads_from_centered_window() {
        let split = splitter(Arc::new(PositionLabeler::default()));
        let all = split.predict_document(&doc()).await.unwrap();

        // 14 tokens, windows [-10, 10) and [0, 20). Indices 0..=5 read from
        // the first window (5 is a tie), the rest from the second.
        let expected: Vec<f64> = (0..14)
            .map(|i: usize| {
                let position = if i <= 5 { i + 10 } else { i };
                position as f64 / 100.0
            })
            .collect();
        assert_eq!(begin_scores(&all), expected);
    }

    #[tokio::test]
    async fn test_split_returns_selected_sentence() {
        let split = splitter(Arc::new(PositionLabeler::default()));
        let second = split.split(&doc(), &SentenceSelector::Index(1)).await.unwrap();
        assert_eq!(second.len(), 9);

        let first = split
            .split(&doc(), &SentenceSelector::Id("s1".into()))
            .await
            .unwrap();
        assert_eq!(first.len(), 5);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_model() {
        let labeler = Arc::new(PositionLabeler::default());
        let split = splitter(labeler.clone());

        let miss = split.split(&doc(), &SentenceSelector::Index(0)).await.unwrap();
        assert_eq!(labeler.calls.load(Ordering::SeqCst), 1);

        let hit = split.split(&doc(), &SentenceSelector::Index(0)).await.unwrap();
        assert_eq!(labeler.calls.load(Ordering::SeqCst), 1);
        assert_eq!(miss, hit);

        let stats = split.cache().stats();
        assert_eq!((stats.hits, stats.misses, stats.entries), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_cleared_cache_recomputes_same_output() {
        let split = splitter(Arc::new(PositionLabeler::default()));
        let first = split.predict_document(&doc()).await.unwrap();
        split.cache().clear();
        let second = split.predict_document(&doc()).await.unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_every_distribution_is_a_label_pair() {
        let labeler = Arc::new(RandomBoundaryLabeler::seeded("B-SENT", 3));
        let split = splitter(labeler);
        let long = Document::new((0..6).map(|i| sentence(&format!("s{}", i), 11)).collect());

        let all = split.predict_document(&long).await.unwrap();
        assert_eq!(all.len(), 66);
        for dist in all.iter() {
            assert_eq!(dist.labels().collect::<Vec<_>>(), vec!["B", "O"]);
            assert!((dist.total() - 1.0).abs() < 1e-9);
        }
    }

    #[tokio::test]
    async fn test_batches_cover_all_windows() {
        let labeler = Arc::new(PositionLabeler::default());
        let options = SplitterOptions {
            window: WindowConfig::new(4, 2).unwrap(),
            batch_size: 3,
            ..Default::default()
        };
        let split = SentenceSplitter::new(labeler.clone(), Arc::new(PredictionCache::default()), options);

        // 14 tokens with stride 2 make 7 windows, so three calls.
        let all = split.predict_document(&doc()).await.unwrap();
        assert_eq!(all.len(), 14);
        assert_eq!(labeler.calls.load(Ordering::SeqCst), 3);
    }

    fn long() -> Document {
        Document::new((0..5).map(|i| sentence(&format!("s{}", i), 8)).collect())
    }

    #[tokio::test]
    async fn test_calls_in_flight_are_bounded() {
        let labeler = Arc::new(InFlightTracker::default());
        let options = SplitterOptions {
            window: WindowConfig::new(4, 2).unwrap(),
            batch_size: 1,
            max_concurrent_calls: 2,
            ..Default::default()
        };
        let windows = WindowPlan::generate(
            &FlatSequence::from_document(&long()).forms,
            options.window,
        )
        .len();
        let split = SentenceSplitter::new(labeler.clone(), Arc::new(PredictionCache::default()), options);

        let all = split.predict_document(&long()).await.unwrap();
        assert_eq!(all.len(), 40);
        assert!(windows > 2);
        assert_eq!(labeler.calls.load(Ordering::SeqCst), windows);
        assert!(labeler.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn test_shared_key_with_different_length_recomputes() {
        let labeler = Arc::new(PositionLabeler::default());
        let split = splitter(labeler.clone());
        let joined = Document::new(vec![Sentence::new(vec![
            Token::new(TokenId::Word(1), "New York"),
            Token::new(TokenId::Word(2), "is"),
        ])]);
        let separate = Document::new(vec![Sentence::new(vec![
            Token::new(TokenId::Word(1), "New"),
            Token::new(TokenId::Word(2), "York"),
            Token::new(TokenId::Word(3), "is"),
        ])]);

        assert_eq!(split.predict_document(&joined).await.unwrap().len(), 2);
        let out = split
            .split(&separate, &SentenceSelector::Index(0))
            .await
            .unwrap();
        assert_eq!(out.len(), 3);
        assert_eq!(labeler.calls.load(Ordering::SeqCst), 2);

        // The entry now holds the three-token result.
        assert_eq!(split.predict_document(&separate).await.unwrap().len(), 3);
        assert_eq!(labeler.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_sentence_fails_before_inference() {
        let labeler = Arc::new(PositionLabeler::default());
        let split = splitter(labeler.clone());
        let err = split
            .split(&doc(), &SentenceSelector::Id("s9".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, LabelingError::SentenceNotFound(_)));
        assert_eq!(labeler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_document_skips_model() {
        let labeler = Arc::new(PositionLabeler::default());
        let split = splitter(labeler.clone());
        let structural_only = Document::new(vec![Sentence::new(vec![Token::new(
            TokenId::Range(1, 2),
            "du",
        )])
        .with_meta("sent_id", "s1")]);

        let out = split
            .split(&structural_only, &SentenceSelector::Index(0))
            .await
            .unwrap();
        assert!(out.is_empty());
        assert!(split.predict_document(&Document::default()).await.unwrap().is_empty());
        assert_eq!(labeler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_short_model_output_is_malformed() {
        let labeler = Arc::new(PositionLabeler {
            drop_row: true,
            ..Default::default()
        });
        let split = splitter(labeler);
        let err = split.predict_document(&doc()).await.unwrap_err();
        assert!(matches!(
            err,
            LabelingError::Backend(BackendError::MalformedOutput(_))
        ));
        assert!(split.cache().is_empty());
    }

    #[tokio::test]
    async fn test_slow_model_times_out() {
        let labeler = Arc::new(PositionLabeler {
            delay: Some(Duration::from_secs(5)),
            ..Default::default()
        });
        let options = SplitterOptions {
            timeout: Duration::from_millis(20),
            ..Default::default()
        };
        let split = SentenceSplitter::new(labeler, Arc::new(PredictionCache::default()), options);

        let err = split.predict_document(&doc()).await.unwrap_err();
        assert!(matches!(err, LabelingError::Backend(BackendError::Timeout(_))));
        assert!(err.is_retryable());
    }
}
