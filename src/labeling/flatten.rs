//! Document flattening.
//!
//! The labeling pipeline works on one flat index space: the plain tokens of
//! every sentence in document order. Structural and elided tokens are skipped
//! without leaving gaps.

use crate::models::{Document, TokenId};

/// Separator between forms in a cache key.
pub const KEY_SEPARATOR: &str = " ";

/// Plain tokens of a document in order, with their source ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlatSequence {
    pub ids: Vec<TokenId>,
    pub forms: Vec<String>,
}

impl FlatSequence {
    pub fn from_document(doc: &Document) -> Self {
        let mut flat = Self::default();
        for token in doc.sentences.iter().flat_map(|s| s.plain_tokens()) {
            flat.ids.push(token.id.clone());
            flat.forms.push(token.form.clone());
        }
        flat
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    /// Exact-string cache key. Forms that themselves contain the separator
    /// can make two different sequences share a key, e.g. `["New York", "is"]`
    /// and `["New", "York", "is"]`. The splitter recomputes when a cached
    /// entry's length disagrees with the sequence; same-length collisions go
    /// undetected.
    pub fn cache_key(&self) -> String {
        self.forms.join(KEY_SEPARATOR)
    }
}
