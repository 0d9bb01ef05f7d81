//! Narrow, fallible top-level operations. Ordinary mismatches flow through
//! [`crate::result::Outcome::Error`] as data; this type is reserved for
//! conditions a caller driving the engine from outside a grammar needs to
//! handle structurally (a caller misusing the API, not a caller's input
//! failing to parse).

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("no result was produced for the given input")]
    NoResult,

    #[error("parsing did not consume the entire input; {remaining} byte(s) left starting at offset {offset}")]
    TrailingInput { offset: u64, remaining: usize },
}
