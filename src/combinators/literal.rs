//! Leaf parsers: [`Literal`] and [`Always`].

use crate::context::Context;
use crate::identity::{hash_bytes, tag, NodeNameCache};
use crate::parser::{combine_child_names, Parser};
use crate::pos::NodeName;
use crate::result::ParseResult;

/// Matches a fixed byte sequence at the current offset.
pub struct Literal {
    bytes: Vec<u8>,
}

impl Literal {
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Literal { bytes: bytes.into() }
    }
}

impl Parser<()> for Literal {
    fn parse(&self, ctx: &Context<'_, ()>) {
        let remaining = &ctx.input[ctx.offset as usize..];
        if remaining.starts_with(&self.bytes[..]) {
            ctx.results.add(ParseResult::value(ctx.offset + self.bytes.len() as u64, ()));
        } else {
            ctx.results.add(ParseResult::error(ctx.offset, format!("expected {:?}", String::from_utf8_lossy(&self.bytes))));
        }
        ctx.results.close();
    }

    fn node_name(&self, _cache: &NodeNameCache) -> NodeName {
        combine_child_names(tag::LITERAL, &[hash_bytes(&self.bytes)])
    }
}

/// Ignores the input and emits a fixed value once. Used to lift constants
/// into a parser, e.g. as the base case of an `Optional` chain or to hand a
/// DSL-level literal value through the combinator graph.
pub struct Always<V> {
    value: V,
}

impl<V> Always<V> {
    pub fn new(value: V) -> Self {
        Always { value }
    }
}

impl<V: Clone + 'static> Parser<V> for Always<V> {
    fn parse(&self, ctx: &Context<'_, V>) {
        ctx.results.add(ParseResult::value(ctx.offset, self.value.clone()));
        ctx.results.close();
    }

    fn node_name(&self, _cache: &NodeNameCache) -> NodeName {
        // Always's identity is its position in the grammar, not its payload
        // (the payload type need not be Hash); a fresh tag per instance
        // keeps two distinct `Always` nodes from colliding in the memo
        // table while letting the common case (one `Always` node reused at
        // many positions) still dedupe correctly.
        combine_child_names(tag::ALWAYS, &[self as *const _ as u64])
    }
}
