//! Token models.
//!
//! A token's kind is fixed when it is read, from the shape of its id:
//! `3` is a plain word, `1-2` a multi-word grouping, `8.1` an empty node.

use serde::{Deserialize, Serialize};

/// Role of a token within its sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// An ordinary syntactic word.
    Plain,
    /// A multi-word token spanning several plain tokens.
    Structural,
    /// An empty node inserted for elided material.
    Elided,
}

/// Identifier of a token as written in its source format.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenId {
    /// `n`
    Word(u32),
    /// `n-m`
    Range(u32, u32),
    /// `n.m`
    Empty(u32, u32),
    /// Opaque identifier from an external tool (e.g. a UUID).
    Opaque(String),
}

impl TokenId {
    /// Parse a CoNLL-U id column.
    pub fn parse(s: &str) -> Option<Self> {
        if let Some((a, b)) = s.split_once('-') {
            return Some(Self::Range(a.parse().ok()?, b.parse().ok()?));
        }
        if let Some((a, b)) = s.split_once('.') {
            return Some(Self::Empty(a.parse().ok()?, b.parse().ok()?));
        }
        s.parse().ok().map(Self::Word)
    }

    /// Kind implied by the id shape. Opaque ids carry no shape and count as plain.
    pub fn kind(&self) -> TokenKind {
        match self {
            Self::Word(_) | Self::Opaque(_) => TokenKind::Plain,
            Self::Range(..) => TokenKind::Structural,
            Self::Empty(..) => TokenKind::Elided,
        }
    }
}

impl std::fmt::Display for TokenId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Word(n) => write!(f, "{}", n),
            Self::Range(a, b) => write!(f, "{}-{}", a, b),
            Self::Empty(a, b) => write!(f, "{}.{}", a, b),
            Self::Opaque(s) => f.write_str(s),
        }
    }
}

/// A single token of a sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub id: TokenId,
    pub form: String,
    pub kind: TokenKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lemma: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xpos: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub head: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deprel: Option<String>,
}

impl Token {
    /// Create a token whose kind follows from its id.
    pub fn new(id: TokenId, form: impl Into<String>) -> Self {
        let kind = id.kind();
        Self::with_kind(id, form, kind)
    }

    /// Create a token with an explicit kind.
    pub fn with_kind(id: TokenId, form: impl Into<String>, kind: TokenKind) -> Self {
        Self {
            id,
            form: form.into(),
            kind,
            lemma: None,
            upos: None,
            xpos: None,
            head: None,
            deprel: None,
        }
    }

    pub fn is_plain(&self) -> bool {
        self.kind == TokenKind::Plain
    }
}
