//! Data models for annotated documents.

mod document;
mod token;

pub use document::{Document, Sentence};
pub use token::{Token, TokenId, TokenKind};
