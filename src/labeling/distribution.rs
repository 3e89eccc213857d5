//! Per-token label distributions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::backends::{BackendError, LabelScore};

/// Suffix some boundary models append to the begin label.
const SENT_SUFFIX: &str = "-SENT";

/// Probability per label for one token. Serializes as a plain JSON object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LabelDistribution(BTreeMap<String, f64>);

impl LabelDistribution {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, label: impl Into<String>, probability: f64) {
        self.0.insert(label.into(), probability);
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.0.get(label).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Sum of all probabilities.
    pub fn total(&self) -> f64 {
        self.0.values().sum()
    }
}

impl FromIterator<(String, f64)> for LabelDistribution {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// The two labels of a binary boundary model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelPair {
    /// Label for "this token begins a sentence".
    pub begin: String,
    /// Label for "this token does not begin a sentence".
    pub outside: String,
}

impl Default for LabelPair {
    fn default() -> Self {
        Self {
            begin: "B".to_string(),
            outside: "O".to_string(),
        }
    }
}

impl LabelPair {
    pub fn new(begin: impl Into<String>, outside: impl Into<String>) -> Self {
        Self {
            begin: begin.into(),
            outside: outside.into(),
        }
    }

    /// Expand a single predicted label into a two-way distribution, giving the
    /// other label the complement probability.
    pub fn distribution(&self, predicted: &LabelScore) -> Result<LabelDistribution, BackendError> {
        if !predicted.score.is_finite() || !(0.0..=1.0).contains(&predicted.score) {
            return Err(BackendError::MalformedOutput(format!(
                "score {} for label '{}' is not a probability",
                predicted.score, predicted.label
            )));
        }

        let (winner, other) = self.classify(&predicted.label).ok_or_else(|| {
            BackendError::MalformedOutput(format!("unexpected label '{}'", predicted.label))
        })?;

        let mut dist = LabelDistribution::new();
        dist.insert(winner, predicted.score);
        dist.insert(other, 1.0 - predicted.score);
        Ok(dist)
    }

    fn classify(&self, label: &str) -> Option<(&str, &str)> {
        let stripped = label.strip_suffix(SENT_SUFFIX);
        if label == self.begin || stripped == Some(self.begin.as_str()) {
            Some((self.begin.as_str(), self.outside.as_str()))
        } else if label == self.outside || stripped == Some(self.outside.as_str()) {
            Some((self.outside.as_str(), self.begin.as_str()))
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_label_complement() {
        let dist = LabelPair::default()
            .distribution(&LabelScore::new("B", 0.9))
            .unwrap();
        assert_eq!(dist.len(), 2);
        assert_eq!(dist.get("B"), Some(0.9));
        assert!((dist.get("O").unwrap() - 0.1).abs() < 1e-12);
        assert!((dist.total() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_outside_label_complement() {
        let dist = LabelPair::default()
            .distribution(&LabelScore::new("O", 0.7))
            .unwrap();
        assert_eq!(dist.get("O"), Some(0.7));
        assert!((dist.get("B").unwrap() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn test_sent_suffix_is_stripped() {
        let dist = LabelPair::default()
            .distribution(&LabelScore::new("B-SENT", 0.6))
            .unwrap();
        assert_eq!(dist.get("B"), Some(0.6));
        assert_eq!(dist.labels().collect::<Vec<_>>(), vec!["B", "O"]);
    }

    #[test]
    fn test_custom_pair_keeps_its_names() {
        let pair = LabelPair::new("B-SENT", "O");
        let dist = pair.distribution(&LabelScore::new("B-SENT", 0.25)).unwrap();
        assert_eq!(dist.get("B-SENT"), Some(0.25));
        assert_eq!(dist.get("O"), Some(0.75));
    }

    #[test]
    fn test_rejects_unknown_label_and_bad_score() {
        let pair = LabelPair::default();
        assert!(pair.distribution(&LabelScore::new("I", 0.5)).is_err());
        assert!(pair.distribution(&LabelScore::new("B", 1.5)).is_err());
        assert!(pair.distribution(&LabelScore::new("B", f64::NAN)).is_err());
    }

    #[test]
    fn test_serializes_as_object() {
        let dist = LabelPair::default()
            .distribution(&LabelScore::new("O", 0.5))
            .unwrap();
        let json = serde_json::to_value(&dist).unwrap();
        assert_eq!(json, serde_json::json!({"B": 0.5, "O": 0.5}));
    }
}
