//! # gll-streams
//!
//! A generalized LL (GLL) parser combinator engine. Unlike a conventional
//! recursive-descent combinator library, grammars built here may be
//! ambiguous and may recurse on themselves without consuming input first —
//! both are explored fully rather than causing an infinite loop or a commit
//! to the first alternative that matches.
//!
//! The engine achieves this with two ideas working together:
//!
//! - Every parser activation publishes its results into a [`stream::ResultStream`]:
//!   a lazy, append-only queue that more than one dependent can subscribe to.
//!   Sharing one queue across every interested party is what lets an
//!   ambiguous grammar explore every branch without re-running the same
//!   sub-parse twice.
//! - [`memo::Memoizer`] caches the stream for a given parser node at a given
//!   input position, and additionally drives same-position left recursion
//!   through bounded retry rounds (see [`combinators::reentrant`]).
//!
//! ## Building a grammar
//!
//! Grammars are graphs of [`parser::Parser`] implementations, most commonly
//! built through the combinators in [`combinators`] and the [`sugar::ParserSugar`]
//! extension trait:
//!
//! ```ignore
//! use gll_streams::combinators::Literal;
//! use gll_streams::parser::heap_alloc;
//! use gll_streams::sugar::ParserSugar;
//!
//! let greeting = heap_alloc(Literal::new("hello "))
//!     .then(heap_alloc(Literal::new("world")));
//! ```
//!
//! Self-referential rules (left recursion included) are built with
//! [`parser::recursive`] for an ordinary forward reference, or
//! [`combinators::reentrant`] when the self-reference may occur at the same
//! input position without having consumed anything first.
//!
//! ## Running a grammar
//!
//! [`run`] drives a grammar over a complete input and surfaces the furthest
//! successful parse, or an [`error::EngineError`] if nothing matched or input
//! was left over.

pub mod combinators;
pub mod context;
pub mod error;
pub mod identity;
pub mod memo;
pub mod parser;
pub mod pos;
pub mod result;
pub mod stream;
pub mod sugar;

pub use context::Context;
pub use error::EngineError;
pub use memo::Memoizer;
pub use parser::{heap_alloc, recursive, Parser, ParserRef};
pub use result::{Outcome, ParseResult};

/// Parse all of `input` with `grammar`, returning every distinct value
/// reachable from a full parse — the input must be entirely consumed.
///
/// Ambiguous grammars can legitimately produce more than one value; this
/// returns all of them rather than picking one.
pub fn run<V: Clone + 'static>(grammar: &ParserRef<V>, input: &[u8]) -> Result<Vec<V>, EngineError> {
    let memoizer = Memoizer::new();
    let ctx = Context::root(&memoizer, input, grammar.node_name(memoizer.node_names()));
    grammar.parse(&ctx);

    let fallback = ParseResult::error(0, result::EMPTY_LANGUAGE);
    let results: Vec<_> = ctx.results.subscribe(fallback).collect();

    let full_matches: Vec<V> = results
        .iter()
        .filter(|r| r.offset as usize == input.len())
        .filter_map(|r| r.as_value().cloned())
        .collect();

    if !full_matches.is_empty() {
        return Ok(full_matches);
    }

    match results.iter().filter(|r| r.is_value()).map(|r| r.offset).max() {
        Some(offset) => Err(EngineError::TrailingInput { offset, remaining: input.len() - offset as usize }),
        None => Err(EngineError::NoResult),
    }
}
