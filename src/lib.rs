//! Midas annotation services.
//!
//! Small HTTP services that annotate tokenized sentences for the Midas
//! annotation tool: sentence boundary probabilities, XPOS tag scores and
//! dependency heads. Models run elsewhere and are reached through the
//! [`backends`] traits.
//!
//! Sentence splitting is the involved part. The boundary model sees a
//! bounded span of tokens, so whole documents are scored in overlapping
//! windows and stitched back together; see [`labeling`].

pub mod backends;
pub mod cli;
pub mod config;
pub mod conllu;
pub mod labeling;
pub mod midas;
pub mod models;
pub mod server;
pub mod services;
