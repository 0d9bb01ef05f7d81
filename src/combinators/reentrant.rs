//! Same-position left recursion via bounded-depth retry rounds.
//!
//! A grammar rule that refers to itself without consuming input first
//! (`expr := expr '+' term | term`) cannot be handled by a single descent: the
//! self-reference would immediately recurse into itself at the same offset
//! forever. [`Reentrant`] resolves this the way packrat parsers grow
//! left-recursive seeds (Warth, Douglass & Millstein): run the rule bounded to
//! depth 0 (every self-reference bottoms out to the empty language), then
//! depth 1, then depth 2, each time giving nested self-references one more
//! level of real expansion, until a round's furthest successful offset stops
//! improving on the previous one. The round before that plateau is the
//! answer.
//!
//! Each round is driven through [`crate::memo::Memoizer::get`] with an
//! explicit `max_depth`, whose `resolve_depth` bookkeeping hands every
//! self-reference encountered while unrolling one round a depth one less than
//! its caller, bottoming them out at depth 0 — see that module for the exact
//! branch logic.

use std::cell::RefCell;
use std::rc::Rc;

use log::debug;

use crate::context::Context;
use crate::identity::{tag, NodeNameCache};
use crate::parser::{Parser, ParserRef};
use crate::pos::NodeName;
use crate::result::ParseResult;
use crate::stream::ResultStream;

pub struct Reentrant<V> {
    inner: RefCell<Option<ParserRef<V>>>,
    /// Caps how many retry rounds are attempted regardless of how much
    /// further growth the remaining input would otherwise allow. `None`
    /// (the default via [`reentrant`]) bounds rounds only by input length.
    retry_limit: Option<u32>,
}

impl<V: 'static + Clone> Parser<V> for Reentrant<V> {
    fn parse(&self, ctx: &Context<'_, V>) {
        let inner = self.inner.borrow().clone().expect("reentrant parser used before construction finished");

        // A self-reference reached while a round for this exact position is
        // already under way must not start its own set of rounds. Ordinarily
        // the combinator sitting between this node and its self-reference
        // (a `Sequence`'s first slot, say) intercepts this by resolving the
        // reference's memo key itself, one depth lower, and finding the
        // previous round already sitting there — so this branch only fires
        // for a rule whose body *is* the bare self-reference, with nothing
        // in between to do that lookup. Do it here instead: resolve this key
        // the same way a descendant would and replay whatever it finds
        // (either the still-open current round, read as the usual cyclic
        // fallback, or the closed previous round) rather than re-running the
        // rule body, which would recurse into this same branch forever.
        if ctx.memoizer.is_retrying(ctx.key) {
            let (resolved, _existed) = ctx.memoizer.get::<V>(&ctx.path, ctx.key, None);
            let cyclic = ParseResult::error(ctx.offset, crate::result::EMPTY_LANGUAGE);
            for item in resolved.subscribe(cyclic) {
                ctx.results.add(item);
            }
            ctx.results.close();
            return;
        }

        // Input is finite and a round only continues past the last one when
        // it reached further into it, so rounds are bounded by the remaining
        // input length regardless of how the grammar is shaped; `retry_limit`
        // lets an embedder tighten that further for a pathological grammar.
        let input_bound = ctx.input.len() as u64 - ctx.offset + 1;
        let round_cap = match self.retry_limit {
            Some(limit) => input_bound.min(limit as u64),
            None => input_bound,
        };

        let (round0, existed) = ctx.memoizer.get::<V>(&ctx.path, ctx.key, Some(0));
        debug_assert!(!existed, "a fresh retry round must never already be memoized");
        run_round(&inner, ctx, &round0);
        let mut best_offset = furthest_value_offset(&round0);
        let mut best_round = round0;

        let mut depth = 1u32;
        while (depth as u64) <= round_cap {
            debug!("reentrant {:?}: entering retry depth {depth}", ctx.key);
            let (round, existed) = ctx.memoizer.get::<V>(&ctx.path, ctx.key, Some(depth));
            debug_assert!(!existed);
            run_round(&inner, ctx, &round);
            let reached = furthest_value_offset(&round);
            if reached.is_some() && reached > best_offset {
                best_offset = reached;
                best_round = round;
                depth += 1;
            } else {
                break;
            }
        }

        for item in replay(&best_round) {
            ctx.results.add(item);
        }
        ctx.results.close();
        ctx.memoizer.finish_retry(ctx.key, ctx.results.clone());
    }

    fn node_name(&self, cache: &NodeNameCache) -> NodeName {
        cache.resolve(self as *const Self as usize, || {
            let inner_name = self.inner.borrow().as_ref().expect("reentrant parser used before construction finished").node_name(cache);
            crate::parser::combine_child_names(tag::REENTRANT, &[inner_name])
        })
    }
}

fn run_round<V: 'static>(inner: &ParserRef<V>, ctx: &Context<'_, V>, round: &Rc<ResultStream<ParseResult<V>>>) {
    let round_ctx = Context {
        input: ctx.input,
        offset: ctx.offset,
        results: round.clone(),
        existing_results: false,
        memoizer: ctx.memoizer,
        key: ctx.key,
        path: ctx.path.clone(),
    };
    inner.parse(&round_ctx);
}

fn furthest_value_offset<V: Clone>(stream: &ResultStream<ParseResult<V>>) -> Option<u64> {
    debug_assert!(stream.is_closed(), "a round's stream must be closed by the time its offset is inspected");
    replay(stream).filter(|r| r.is_value()).map(|r| r.offset).max()
}

fn replay<V: Clone>(stream: &ResultStream<ParseResult<V>>) -> impl Iterator<Item = ParseResult<V>> {
    stream.subscribe(ParseResult::error(0, crate::result::EMPTY_LANGUAGE))
}

/// Build a self-referential grammar rule. `build` receives a reference usable
/// anywhere the finished rule would be used, including inside itself. Retry
/// rounds are bounded only by the remaining input length; use
/// [`reentrant_with_limit`] to cap them more tightly.
pub fn reentrant<V: 'static + Clone>(build: impl FnOnce(ParserRef<V>) -> ParserRef<V>) -> ParserRef<V> {
    reentrant_with_limit(build, None)
}

/// Like [`reentrant`], but caps the number of retry rounds at `retry_limit`
/// regardless of how much further the input would otherwise allow growth.
/// Useful for a grammar whose left-recursive shape is known never to need
/// many rounds, or as a safety valve against a pathological one.
pub fn reentrant_with_limit<V: 'static + Clone>(build: impl FnOnce(ParserRef<V>) -> ParserRef<V>, retry_limit: Option<u32>) -> ParserRef<V> {
    let node: Rc<Reentrant<V>> = Rc::new(Reentrant { inner: RefCell::new(None), retry_limit });
    let self_ref: ParserRef<V> = node.clone();
    let built = build(self_ref);
    *node.inner.borrow_mut() = Some(built);
    node
}
