//! Per-result transformation, including over errors.

use crate::context::Context;
use crate::identity::{tag, NodeNameCache};
use crate::parser::{combine_child_names, Parser, ParserRef};
use crate::pos::NodeName;
use crate::result::ParseResult;

/// Applies `map_fn` to every result `inner` produces, values and errors
/// alike, so a grammar can rewrite an error message or discard a result
/// outright (`map_fn` returning `None` drops it from the stream) as easily as
/// it can transform a value.
pub struct MapTo<A, B> {
    inner: ParserRef<A>,
    map_fn: Box<dyn Fn(ParseResult<A>) -> Option<ParseResult<B>>>,
}

impl<A, B> MapTo<A, B> {
    pub fn new(inner: ParserRef<A>, map_fn: impl Fn(ParseResult<A>) -> Option<ParseResult<B>> + 'static) -> Self {
        MapTo { inner, map_fn: Box::new(map_fn) }
    }
}

impl<A: Clone + 'static, B: Clone + 'static> Parser<B> for MapTo<A, B> {
    fn parse(&self, ctx: &Context<'_, B>) {
        let name = self.inner.node_name(ctx.memoizer.node_names());
        let inner_ctx: Context<'_, A> = ctx.init_child(name, ctx.offset, None);
        if !inner_ctx.existing_results {
            self.inner.parse(&inner_ctx);
        }
        let cyclic = ParseResult::error(ctx.offset, crate::result::EMPTY_LANGUAGE);

        for result in inner_ctx.results.subscribe(cyclic) {
            if let Some(mapped) = (self.map_fn)(result) {
                ctx.results.add(mapped);
            }
        }
        ctx.results.close();
    }

    fn node_name(&self, cache: &NodeNameCache) -> NodeName {
        combine_child_names(tag::MAP_TO, &[self.inner.node_name(cache), self as *const _ as u64])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::literal::Literal;
    use crate::memo::Memoizer;
    use crate::parser::heap_alloc;
    use crate::result::Outcome;

    #[test]
    fn map_to_transforms_values() {
        let memo = Memoizer::new();
        let input = b"abc";
        let mapped = MapTo::new(heap_alloc(Literal::new("abc")), |r| Some(r.map(|_| 7i32)));
        let ctx = Context::<i32>::root(&memo, input, mapped.node_name(memo.node_names()));
        mapped.parse(&ctx);
        let results: Vec<_> = ctx.results.subscribe(ParseResult::error(0, "unused")).collect();
        assert_eq!(results, vec![ParseResult::value(3, 7)]);
    }

    #[test]
    fn map_to_can_rewrite_errors() {
        let memo = Memoizer::new();
        let input = b"xyz";
        let mapped = MapTo::new(heap_alloc(Literal::new("abc")), |r| match r.outcome {
            Outcome::Error(_) => Some(ParseResult::error(r.offset, "rewritten")),
            Outcome::Value(_) => unreachable!(),
        });
        let ctx = Context::<()>::root(&memo, input, mapped.node_name(memo.node_names()));
        mapped.parse(&ctx);
        let results: Vec<_> = ctx.results.subscribe(ParseResult::error(0, "unused")).collect();
        assert_eq!(results, vec![ParseResult::error(0, "rewritten")]);
    }

    #[test]
    fn map_to_can_drop_results() {
        let memo = Memoizer::new();
        let input = b"abc";
        let mapped = MapTo::new(heap_alloc(Literal::new("abc")), |_| None::<ParseResult<()>>);
        let ctx = Context::<()>::root(&memo, input, mapped.node_name(memo.node_names()));
        mapped.parse(&ctx);
        let results: Vec<_> = ctx.results.subscribe(ParseResult::error(0, "unused")).collect();
        assert!(results.is_empty());
    }
}
