//! Zero-or-bounded repetition: [`Repeated`] (flat `Vec`, first shape wins per
//! count) and [`RepeatedAmbiguous`] (keeps every shape as a [`RepNode`] tree).

use std::rc::Rc;

use crate::context::Context;
use crate::identity::{tag, NodeNameCache};
use crate::parser::{combine_child_names, Parser, ParserRef};
use crate::pos::NodeName;
use crate::result::{Outcome, ParseResult};
use crate::stream::ResultStream;

/// Applies `inner` between `min` and `max` (inclusive; `None` means
/// unbounded) times, emitting one result per distinct repetition count that
/// is reachable and satisfies `min`. A repetition that consumes no input is
/// accepted once but never repeated, since repeating it again would revisit
/// the same offset forever.
pub struct Repeated<T> {
    inner: ParserRef<T>,
    min: u32,
    max: Option<u32>,
}

impl<T> Repeated<T> {
    pub fn new(inner: ParserRef<T>, min: u32, max: Option<u32>) -> Self {
        Repeated { inner, min, max }
    }
}

impl<T: Clone + 'static> Parser<Vec<T>> for Repeated<T> {
    fn parse(&self, ctx: &Context<'_, Vec<T>>) {
        if self.max == Some(0) {
            ctx.results.close();
            return;
        }
        let mut state = ExpandState { emitted_any: false, furthest: ctx.offset };
        expand(ctx, &self.inner, ctx.offset, 0, Vec::new(), self.min, self.max, &mut state);
        if !state.emitted_any {
            ctx.results.add(ParseResult::error(state.furthest, "expected more"));
        }
        ctx.results.close();
    }

    fn node_name(&self, cache: &NodeNameCache) -> NodeName {
        combine_child_names(
            tag::REPEATED,
            &[self.inner.node_name(cache), self.min as u64, self.max.map(|m| m as u64 + 1).unwrap_or(0)],
        )
    }
}

/// Tracks whether any count reaching `min` was ever emitted, and the
/// furthest offset any repetition count actually reached, across the whole
/// (possibly branching) expansion — needed to report a single error at the
/// right place when `min` is never satisfied.
struct ExpandState {
    emitted_any: bool,
    furthest: u64,
}

fn expand<T: Clone + 'static>(
    ctx: &Context<'_, Vec<T>>,
    inner: &ParserRef<T>,
    offset: u64,
    count: u32,
    acc: Vec<T>,
    min: u32,
    max: Option<u32>,
    state: &mut ExpandState,
) {
    if offset > state.furthest {
        state.furthest = offset;
    }
    if count >= min {
        state.emitted_any = true;
        ctx.results.add(ParseResult::value(offset, acc.clone()));
    }
    if max.map_or(false, |m| count >= m) {
        return;
    }

    let inner_name = inner.node_name(ctx.memoizer.node_names());
    let child_ctx: Context<'_, T> = ctx.init_child(inner_name, offset, None);
    if !child_ctx.existing_results {
        inner.parse(&child_ctx);
    }
    let cyclic = ParseResult::error(offset, crate::result::EMPTY_LANGUAGE);

    for result in child_ctx.results.subscribe(cyclic) {
        if let Outcome::Value(v) = result.outcome {
            if result.offset == offset {
                // Zero-width match: count it once, but recursing again would
                // retry `inner` at the same offset and loop forever.
                let mut extended = acc.clone();
                extended.push(v);
                if count + 1 >= min {
                    state.emitted_any = true;
                    ctx.results.add(ParseResult::value(offset, extended));
                }
                continue;
            }
            let mut extended = acc.clone();
            extended.push(v);
            expand(ctx, inner, result.offset, count + 1, extended, min, max, state);
        }
    }
}

/// A node in the ambiguity tree built by [`RepeatedAmbiguous`]: one match of
/// `inner`, plus a lazily-shared stream of every way the repetition can
/// continue past it. An empty `next` stream means this node is a valid place
/// to stop.
pub struct RepNode<T> {
    pub node: T,
    pub next: Rc<ResultStream<ParseResult<RepNode<T>>>>,
}

impl<T: Clone> Clone for RepNode<T> {
    fn clone(&self) -> Self {
        RepNode { node: self.node.clone(), next: self.next.clone() }
    }
}

/// Applies `inner` one or more times, keeping every possible repetition shape
/// reachable through the [`RepNode`] chain rather than collapsing to a flat
/// `Vec`. A zero-or-more reading is obtained by wrapping this in
/// [`crate::combinators::optional::Optional`].
pub struct RepeatedAmbiguous<T> {
    inner: ParserRef<T>,
    max: Option<u32>,
}

impl<T> RepeatedAmbiguous<T> {
    pub fn new(inner: ParserRef<T>, max: Option<u32>) -> Self {
        RepeatedAmbiguous { inner, max }
    }
}

impl<T: Clone + 'static> Parser<RepNode<T>> for RepeatedAmbiguous<T> {
    fn parse(&self, ctx: &Context<'_, RepNode<T>>) {
        self.expand(ctx, 0);
        ctx.results.close();
    }

    fn node_name(&self, cache: &NodeNameCache) -> NodeName {
        combine_child_names(tag::REPEATED_AMBIGUOUS, &[self.inner.node_name(cache), self.max.map(|m| m as u64 + 1).unwrap_or(0)])
    }
}

impl<T: Clone + 'static> RepeatedAmbiguous<T> {
    fn expand(&self, ctx: &Context<'_, RepNode<T>>, depth: u32) {
        if self.max.map_or(false, |m| depth >= m) {
            return;
        }
        let inner_name = self.inner.node_name(ctx.memoizer.node_names());
        let child_ctx: Context<'_, T> = ctx.init_child(inner_name, ctx.offset, None);
        if !child_ctx.existing_results {
            self.inner.parse(&child_ctx);
        }
        let cyclic = ParseResult::error(ctx.offset, crate::result::EMPTY_LANGUAGE);

        for result in child_ctx.results.subscribe(cyclic) {
            if let Outcome::Value(v) = result.outcome {
                let rest: Rc<ResultStream<ParseResult<RepNode<T>>>> = if result.offset == ctx.offset {
                    let terminal = Rc::new(ResultStream::new(ctx.key));
                    terminal.close();
                    terminal
                } else {
                    let rest_ctx: Context<'_, RepNode<T>> = ctx.init_child(ctx.key.node, result.offset, None);
                    if !rest_ctx.existing_results {
                        self.expand(&rest_ctx, depth + 1);
                        rest_ctx.results.close();
                    }
                    rest_ctx.results
                };
                ctx.results.add(ParseResult::value(result.offset, RepNode { node: v, next: rest }));
            }
        }
    }
}

/// Eagerly walk every path through a [`RepNode`] tree into the flat `Vec<T>`
/// readings it represents.
pub fn flatten_repeated<T: Clone>(node: &RepNode<T>) -> Vec<Vec<T>> {
    let fallback = ParseResult::error(0, crate::result::EMPTY_LANGUAGE);
    let continuations: Vec<_> = node.next.subscribe(fallback).filter_map(|r| r.as_value().cloned()).collect();
    if continuations.is_empty() {
        return vec![vec![node.node.clone()]];
    }
    continuations
        .iter()
        .flat_map(|tail| {
            flatten_repeated(tail).into_iter().map(|mut rest| {
                rest.insert(0, node.node.clone());
                rest
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::literal::Literal;
    use crate::memo::Memoizer;
    use crate::parser::heap_alloc;

    #[test]
    fn repeated_emits_one_result_per_reachable_count() {
        let memo = Memoizer::new();
        let input = b"aaab";
        let rep = Repeated::new(heap_alloc(Literal::new("a")), 0, None);
        let ctx = Context::<Vec<()>>::root(&memo, input, rep.node_name(memo.node_names()));
        rep.parse(&ctx);
        let results: Vec<_> = ctx.results.subscribe(ParseResult::error(0, "unused")).collect();
        let counts: Vec<usize> = results.iter().filter_map(|r| r.as_value()).map(Vec::len).collect();
        assert_eq!(counts, vec![0, 1, 2, 3]);
    }

    #[test]
    fn repeated_respects_min() {
        let memo = Memoizer::new();
        let input = b"b";
        let rep = Repeated::new(heap_alloc(Literal::new("a")), 1, None);
        let ctx = Context::<Vec<()>>::root(&memo, input, rep.node_name(memo.node_names()));
        rep.parse(&ctx);
        let results: Vec<_> = ctx.results.subscribe(ParseResult::error(0, "unused")).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_error());
        assert_eq!(results[0].offset, 0);
    }

    #[test]
    fn repeated_reports_the_furthest_offset_reached_below_min() {
        let memo = Memoizer::new();
        let input = b"aab";
        let rep = Repeated::new(heap_alloc(Literal::new("a")), 5, None);
        let ctx = Context::<Vec<()>>::root(&memo, input, rep.node_name(memo.node_names()));
        rep.parse(&ctx);
        let results: Vec<_> = ctx.results.subscribe(ParseResult::error(0, "unused")).collect();
        assert_eq!(results.len(), 1);
        assert!(results[0].is_error());
        assert_eq!(results[0].offset, 2);
    }

    #[test]
    fn repeated_with_max_zero_closes_with_no_results() {
        let memo = Memoizer::new();
        let input = b"aaa";
        let rep = Repeated::new(heap_alloc(Literal::new("a")), 0, Some(0));
        let ctx = Context::<Vec<()>>::root(&memo, input, rep.node_name(memo.node_names()));
        rep.parse(&ctx);
        let results: Vec<_> = ctx.results.subscribe(ParseResult::error(0, "unused")).collect();
        assert!(results.is_empty());
    }

    #[test]
    fn repeated_ambiguous_flattens_to_every_count() {
        let memo = Memoizer::new();
        let input = b"aaab";
        let rep = RepeatedAmbiguous::new(heap_alloc(Literal::new("a")), None);
        let ctx = Context::<RepNode<()>>::root(&memo, input, rep.node_name(memo.node_names()));
        rep.parse(&ctx);
        let fallback = ParseResult::error(0, "unused");
        let top: Vec<_> = ctx.results.subscribe(fallback).collect();
        assert_eq!(top.len(), 1);
        let readings = flatten_repeated(top[0].as_value().unwrap());
        assert_eq!(readings, vec![vec![(), (), ()]]);
    }
}
