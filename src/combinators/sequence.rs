//! Ordered composition of two parsers: [`Sequence`] (first value wins) and
//! [`SequenceAmbiguous`] (keeps every combination as an [`AmbiguousNode`] tree).

use std::rc::Rc;

use crate::context::Context;
use crate::identity::{tag, NodeNameCache};
use crate::parser::{combine_child_names, Parser, ParserRef};
use crate::pos::NodeName;
use crate::result::ParseResult;

/// Runs `first`, takes only its first result, and — if that was a value —
/// runs `second` starting at that value's offset and takes only its first
/// result too, pairing the two into a tuple. Either side's first result
/// being an error is forwarded as-is at its own offset and ends the
/// sequence there; every other result either child stream produces is
/// ignored. Grammars that need every combination use [`SequenceAmbiguous`].
pub struct Sequence<A, B> {
    first: ParserRef<A>,
    second: ParserRef<B>,
}

impl<A, B> Sequence<A, B> {
    pub fn new(first: ParserRef<A>, second: ParserRef<B>) -> Self {
        Sequence { first, second }
    }
}

impl<A: Clone + 'static, B: Clone + 'static> Parser<(A, B)> for Sequence<A, B> {
    fn parse(&self, ctx: &Context<'_, (A, B)>) {
        let first_name = self.first.node_name(ctx.memoizer.node_names());
        let first_ctx: Context<'_, A> = ctx.init_child(first_name, ctx.offset, None);
        if !first_ctx.existing_results {
            self.first.parse(&first_ctx);
        }
        let cyclic = ParseResult::error(ctx.offset, crate::result::EMPTY_LANGUAGE);

        if let Some(first_result) = first_ctx.results.subscribe(cyclic).next() {
            let first_value = match first_result.as_value() {
                Some(v) => v.clone(),
                None => {
                    ctx.results.add(first_result.map(|_| unreachable!()));
                    ctx.results.close();
                    return;
                }
            };

            let second_name = self.second.node_name(ctx.memoizer.node_names());
            let second_ctx: Context<'_, B> = ctx.init_child(second_name, first_result.offset, None);
            if !second_ctx.existing_results {
                self.second.parse(&second_ctx);
            }
            let second_cyclic = ParseResult::error(first_result.offset, crate::result::EMPTY_LANGUAGE);

            if let Some(second_result) = second_ctx.results.subscribe(second_cyclic).next() {
                match second_result.outcome {
                    crate::result::Outcome::Value(b) => {
                        ctx.results.add(ParseResult::value(second_result.offset, (first_value, b)));
                    }
                    crate::result::Outcome::Error(e) => {
                        ctx.results.add(ParseResult::error(second_result.offset, e));
                    }
                }
            }
        }
        ctx.results.close();
    }

    fn node_name(&self, cache: &NodeNameCache) -> NodeName {
        combine_child_names(tag::SEQUENCE, &[self.first.node_name(cache), self.second.node_name(cache)])
    }
}

/// A node in the ambiguity tree built by [`SequenceAmbiguous`]: one value from
/// the first parser paired with a lazily-shared stream of everything the
/// second parser produced from that value's offset onward.
pub struct AmbiguousNode<A, B> {
    pub node: A,
    pub next: Rc<crate::stream::ResultStream<ParseResult<B>>>,
}

impl<A: Clone, B> Clone for AmbiguousNode<A, B> {
    fn clone(&self) -> Self {
        AmbiguousNode { node: self.node.clone(), next: self.next.clone() }
    }
}

/// Like [`Sequence`] but keeps every `(first, second)` combination reachable
/// instead of collapsing them into flat tuples, so a caller can explore the
/// full ambiguity without the engine committing to one shape up front.
pub struct SequenceAmbiguous<A, B> {
    first: ParserRef<A>,
    second: ParserRef<B>,
}

impl<A, B> SequenceAmbiguous<A, B> {
    pub fn new(first: ParserRef<A>, second: ParserRef<B>) -> Self {
        SequenceAmbiguous { first, second }
    }
}

impl<A: Clone + 'static, B: Clone + 'static> Parser<AmbiguousNode<A, B>> for SequenceAmbiguous<A, B> {
    fn parse(&self, ctx: &Context<'_, AmbiguousNode<A, B>>) {
        let first_name = self.first.node_name(ctx.memoizer.node_names());
        let first_ctx: Context<'_, A> = ctx.init_child(first_name, ctx.offset, None);
        if !first_ctx.existing_results {
            self.first.parse(&first_ctx);
        }
        let cyclic = ParseResult::error(ctx.offset, crate::result::EMPTY_LANGUAGE);

        for first_result in first_ctx.results.subscribe(cyclic) {
            match first_result.outcome {
                crate::result::Outcome::Error(e) => {
                    ctx.results.add(ParseResult::error(first_result.offset, e));
                }
                crate::result::Outcome::Value(a) => {
                    let second_name = self.second.node_name(ctx.memoizer.node_names());
                    let second_ctx: Context<'_, B> = ctx.init_child(second_name, first_result.offset, None);
                    if !second_ctx.existing_results {
                        self.second.parse(&second_ctx);
                    }
                    ctx.results.add(ParseResult::value(
                        first_result.offset,
                        AmbiguousNode { node: a, next: second_ctx.results },
                    ));
                }
            }
        }
        ctx.results.close();
    }

    fn node_name(&self, cache: &NodeNameCache) -> NodeName {
        combine_child_names(tag::SEQUENCE_AMBIGUOUS, &[self.first.node_name(cache), self.second.node_name(cache)])
    }
}

/// Eagerly walk an `AmbiguousNode<A, B>` tree into the flat `(A, B)` pairs it
/// represents. The engine is fully synchronous and single-threaded, so there
/// is no benefit to a lazy iterator here over materializing a `Vec`.
pub fn flatten<A: Clone, B: Clone>(node: &AmbiguousNode<A, B>) -> Vec<(A, B)> {
    let fallback = ParseResult::error(0, crate::result::EMPTY_LANGUAGE);
    node.next
        .subscribe(fallback)
        .filter_map(|r| r.as_value().map(|b| (node.node.clone(), b.clone())))
        .collect()
}
