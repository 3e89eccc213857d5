//! Midas JSON sentence format.
//!
//! The annotation tool sends sentences as namespaced JSON objects
//! (`sentence/tokens`, `token/form`, ...). Only the fields needed to rebuild a
//! [`Sentence`] are read; everything else is ignored.

use serde::{Deserialize, Serialize};

use crate::models::{Sentence, Token, TokenId, TokenKind};

/// One sentence as exchanged with the annotation tool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidasSentence {
    #[serde(rename = "sentence/id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "sentence/conllu-metadata", default)]
    pub metadata: Vec<MidasMetadata>,
    #[serde(rename = "sentence/tokens")]
    pub tokens: Vec<MidasToken>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidasMetadata {
    #[serde(rename = "conllu-metadata/key")]
    pub key: String,
    #[serde(rename = "conllu-metadata/value", default)]
    pub value: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidasToken {
    #[serde(rename = "token/id")]
    pub id: String,
    /// `token`, `super` or `empty`.
    #[serde(rename = "token/token-type")]
    pub token_type: String,
    #[serde(rename = "token/form")]
    pub form: MidasForm,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MidasForm {
    #[serde(rename = "form/value")]
    pub value: String,
}

impl MidasToken {
    pub fn kind(&self) -> TokenKind {
        match self.token_type.as_str() {
            "super" => TokenKind::Structural,
            "empty" => TokenKind::Elided,
            _ => TokenKind::Plain,
        }
    }
}

impl From<&MidasSentence> for Sentence {
    fn from(sentence: &MidasSentence) -> Self {
        let tokens = sentence
            .tokens
            .iter()
            .map(|t| Token::with_kind(TokenId::Opaque(t.id.clone()), &t.form.value, t.kind()))
            .collect();
        let metadata = sentence
            .metadata
            .iter()
            .map(|m| (m.key.clone(), m.value.clone().unwrap_or_default()))
            .collect();
        Sentence { metadata, tokens }
    }
}
