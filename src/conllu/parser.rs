use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::models::{Document, Sentence, Token, TokenId};

/// Number of columns on a token line.
const COLUMNS: usize = 10;

/// Fallback column separator for hand-typed samples without tabs.
static WIDE_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s{2,}").expect("valid column regex"));

/// Errors from reading CoNLL-U input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConlluError {
    #[error("line {line}: expected 10 columns, found {found}")]
    ColumnCount { line: usize, found: usize },

    #[error("line {line}: invalid token id '{id}'")]
    InvalidId { line: usize, id: String },

    #[error("line {line}: empty form")]
    EmptyForm { line: usize },

    #[error("no sentence found in input")]
    NoSentence,
}

/// Parse a whole CoNLL-U document.
pub fn parse(input: &str) -> Result<Document, ConlluError> {
    let mut sentences = Vec::new();
    let mut current = Sentence::default();
    let mut started = false;

    for (idx, raw) in input.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim_end_matches('\r');

        if line.trim().is_empty() {
            if started {
                sentences.push(std::mem::take(&mut current));
                started = false;
            }
            continue;
        }

        started = true;
        if let Some(comment) = line.strip_prefix('#') {
            current.metadata.push(parse_comment(comment));
        } else {
            current.tokens.push(parse_token(line, line_no)?);
        }
    }

    if started {
        sentences.push(current);
    }

    Ok(Document::new(sentences))
}

/// Parse input expected to hold a single sentence and return the first one.
pub fn parse_sentence(input: &str) -> Result<Sentence, ConlluError> {
    parse(input)?
        .sentences
        .into_iter()
        .next()
        .ok_or(ConlluError::NoSentence)
}

fn parse_comment(comment: &str) -> (String, String) {
    match comment.split_once('=') {
        Some((key, value)) => (key.trim().to_string(), value.trim().to_string()),
        None => (comment.trim().to_string(), String::new()),
    }
}

fn parse_token(line: &str, line_no: usize) -> Result<Token, ConlluError> {
    let fields: Vec<&str> = if line.contains('\t') {
        line.split('\t').collect()
    } else {
        WIDE_SPACE.split(line.trim()).collect()
    };

    if fields.len() != COLUMNS {
        return Err(ConlluError::ColumnCount {
            line: line_no,
            found: fields.len(),
        });
    }

    let id = TokenId::parse(fields[0].trim()).ok_or_else(|| ConlluError::InvalidId {
        line: line_no,
        id: fields[0].to_string(),
    })?;

    let form = fields[1];
    if form.is_empty() {
        return Err(ConlluError::EmptyForm { line: line_no });
    }

    let mut token = Token::new(id, form);
    token.lemma = optional(fields[2]);
    token.upos = optional(fields[3]);
    token.xpos = optional(fields[4]);
    token.head = optional(fields[6]);
    token.deprel = optional(fields[7]);
    Ok(token)
}

fn optional(field: &str) -> Option<String> {
    match field.trim() {
        "" | "_" => None,
        s => Some(s.to_string()),
    }
}
