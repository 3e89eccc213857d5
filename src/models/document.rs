//! Document and sentence models.
//!
//! Sentence order within a document and token order within a sentence are
//! significant: together they define the flat token index space used by the
//! labeling pipeline.

use serde::{Deserialize, Serialize};

use super::token::Token;

/// Metadata key holding a sentence's identifier.
pub const SENT_ID_KEY: &str = "sent_id";

/// One sentence: ordered tokens plus comment metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// `# key = value` annotations in source order.
    pub metadata: Vec<(String, String)>,
    pub tokens: Vec<Token>,
}

impl Sentence {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self {
            metadata: Vec::new(),
            tokens,
        }
    }

    /// Look up a metadata value by key. The first occurrence wins.
    pub fn meta(&self, key: &str) -> Option<&str> {
        self.metadata
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// The `sent_id` annotation, if present.
    pub fn sent_id(&self) -> Option<&str> {
        self.meta(SENT_ID_KEY)
    }

    /// Tokens that take part in labeling.
    pub fn plain_tokens(&self) -> impl Iterator<Item = &Token> {
        self.tokens.iter().filter(|t| t.is_plain())
    }

    pub fn plain_len(&self) -> usize {
        self.plain_tokens().count()
    }

    /// Builder-style metadata setter.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.push((key.into(), value.into()));
        self
    }
}

/// An ordered sequence of sentences.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub sentences: Vec<Sentence>,
}

impl Document {
    pub fn new(sentences: Vec<Sentence>) -> Self {
        Self { sentences }
    }
}
