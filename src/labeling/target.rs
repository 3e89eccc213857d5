//! Locating one sentence inside the flat token space.

use std::fmt;
use std::ops::Range;

use crate::models::Document;

use super::types::LabelingError;

/// Which sentence of a document a request is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentenceSelector {
    /// Zero-based position in the document.
    Index(usize),
    /// Value of the sentence's `sent_id` metadata.
    Id(String),
}

impl SentenceSelector {
    /// Build a selector from optional request fields. An ordinal wins over an
    /// identifier; negative ordinals count as absent.
    pub fn from_parts(index: Option<i64>, id: Option<&str>) -> Option<Self> {
        match (index, id) {
            (Some(i), _) if i >= 0 => Some(Self::Index(i as usize)),
            (_, Some(id)) => Some(Self::Id(id.to_string())),
            _ => None,
        }
    }
}

impl fmt::Display for SentenceSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Index(i) => write!(f, "index {}", i),
            Self::Id(id) => write!(f, "sent_id '{}'", id),
        }
    }
}

/// Half-open `[begin, end)` range over flat token indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetRange {
    pub begin: usize,
    pub end: usize,
}

impl TargetRange {
    pub fn len(&self) -> usize {
        self.end - self.begin
    }

    pub fn is_empty(&self) -> bool {
        self.begin == self.end
    }

    pub fn as_range(&self) -> Range<usize> {
        self.begin..self.end
    }

    /// The part of `items` this range covers.
    pub fn slice<'a, T>(&self, items: &'a [T]) -> Result<&'a [T], LabelingError> {
        items
            .get(self.as_range())
            .ok_or(LabelingError::OutOfRange {
                begin: self.begin,
                end: self.end,
                len: items.len(),
            })
    }
}

/// Find the flat range of the selected sentence. The first sentence that
/// matches wins.
pub fn locate(doc: &Document, selector: &SentenceSelector) -> Result<TargetRange, LabelingError> {
    let mut begin = 0;
    for (position, sentence) in doc.sentences.iter().enumerate() {
        let matched = match selector {
            SentenceSelector::Index(i) => position == *i,
            SentenceSelector::Id(id) => sentence.sent_id() == Some(id.as_str()),
        };
        let end = begin + sentence.plain_len();
        if matched {
            return Ok(TargetRange { begin, end });
        }
        begin = end;
    }
    Err(LabelingError::SentenceNotFound(selector.to_string()))
}
