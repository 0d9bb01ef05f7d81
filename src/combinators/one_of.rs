//! Ordered alternation across a fixed set of parsers.

use crate::context::Context;
use crate::identity::{tag, NodeNameCache};
use crate::parser::{combine_child_names, Parser, ParserRef};
use crate::pos::NodeName;
use crate::result::{Outcome, ParseResult};

/// Tries every alternative at the same offset and forwards every value any of
/// them produce, in declaration order. Emits an error only if every
/// alternative failed to produce even one value.
pub struct OneOf<V> {
    alternatives: Vec<ParserRef<V>>,
}

impl<V> OneOf<V> {
    pub fn new(alternatives: Vec<ParserRef<V>>) -> Self {
        assert!(!alternatives.is_empty(), "OneOf needs at least one alternative");
        OneOf { alternatives }
    }
}

impl<V: Clone + 'static> Parser<V> for OneOf<V> {
    fn parse(&self, ctx: &Context<'_, V>) {
        let mut any_value = false;
        let mut last_error: Option<ParseResult<V>> = None;

        for alt in &self.alternatives {
            let name = alt.node_name(ctx.memoizer.node_names());
            let alt_ctx: Context<'_, V> = ctx.init_child(name, ctx.offset, None);
            if !alt_ctx.existing_results {
                alt.parse(&alt_ctx);
            }
            let cyclic = ParseResult::error(ctx.offset, crate::result::EMPTY_LANGUAGE);

            for result in alt_ctx.results.subscribe(cyclic) {
                match result.outcome {
                    Outcome::Value(_) => {
                        any_value = true;
                        ctx.results.add(result);
                    }
                    Outcome::Error(_) => last_error = Some(result),
                }
            }
        }

        if !any_value {
            ctx.results.add(last_error.unwrap_or_else(|| ParseResult::error(ctx.offset, "no alternative matched")));
        }
        ctx.results.close();
    }

    fn node_name(&self, cache: &NodeNameCache) -> NodeName {
        let children: Vec<NodeName> = self.alternatives.iter().map(|a| a.node_name(cache)).collect();
        combine_child_names(tag::ONE_OF, &children)
    }
}
