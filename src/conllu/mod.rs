//! CoNLL-U reader.
//!
//! Reads the tab-separated token exchange format into
//! [`Document`](crate::models::Document)s. Only the pieces the annotation
//! services need are interpreted (id, form and the morphosyntactic columns);
//! the rest of each line is validated for shape.

mod parser;

pub use parser::{parse, parse_sentence, ConlluError};
