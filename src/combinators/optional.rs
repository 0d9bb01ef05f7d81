//! Makes a parser's absence of a match into a value instead of an error.

use crate::context::Context;
use crate::identity::{tag, NodeNameCache};
use crate::parser::{combine_child_names, Parser, ParserRef};
use crate::pos::NodeName;
use crate::result::{Outcome, ParseResult};

/// Runs `inner` and re-emits every result it produces: a value becomes
/// `Some(value)` at the same offset, an error becomes `None` at the
/// *original* offset (the attempt consumed nothing, since it failed). Unlike
/// wrapping in a `match`, this handles every ambiguous branch `inner`
/// produces, not just the first.
pub struct Optional<V> {
    inner: ParserRef<V>,
}

impl<V> Optional<V> {
    pub fn new(inner: ParserRef<V>) -> Self {
        Optional { inner }
    }
}

impl<V: Clone + 'static> Parser<Option<V>> for Optional<V> {
    fn parse(&self, ctx: &Context<'_, Option<V>>) {
        let name = self.inner.node_name(ctx.memoizer.node_names());
        let inner_ctx: Context<'_, V> = ctx.init_child(name, ctx.offset, None);
        if !inner_ctx.existing_results {
            self.inner.parse(&inner_ctx);
        }
        let cyclic = ParseResult::error(ctx.offset, crate::result::EMPTY_LANGUAGE);

        let mut saw_any = false;
        for result in inner_ctx.results.subscribe(cyclic) {
            saw_any = true;
            match result.outcome {
                Outcome::Value(v) => ctx.results.add(ParseResult::value(result.offset, Some(v))),
                Outcome::Error(_) => ctx.results.add(ParseResult::value(ctx.offset, None)),
            }
        }
        if !saw_any {
            ctx.results.add(ParseResult::value(ctx.offset, None));
        }
        ctx.results.close();
    }

    fn node_name(&self, cache: &NodeNameCache) -> NodeName {
        combine_child_names(tag::OPTIONAL, &[self.inner.node_name(cache)])
    }
}
