//! Fluent construction sugar over [`ParserRef`], mirroring the call-site
//! ergonomics of a tuple-based `.seq()`/`.alt()` sugar trait, but scoped to
//! this engine's pairwise combinators instead of arbitrary tuple arities.

use crate::combinators::{MapTo, OneOf, Optional, RepNode, Repeated, RepeatedAmbiguous, Sequence, SequenceAmbiguous};
use crate::parser::{heap_alloc, ParserRef};
use crate::result::ParseResult;

pub trait ParserSugar<V> {
    /// Sequence `self` then `next`, producing `(V, W)`.
    fn then<W: Clone + 'static>(self, next: ParserRef<W>) -> ParserRef<(V, W)>
    where
        V: Clone + 'static;

    /// Sequence `self` then `next`, keeping every combination reachable.
    fn then_ambiguous<W: Clone + 'static>(self, next: ParserRef<W>) -> ParserRef<crate::combinators::AmbiguousNode<V, W>>
    where
        V: Clone + 'static;

    /// Make a failed match into `None` instead of propagating the error.
    fn optional(self) -> ParserRef<Option<V>>
    where
        V: Clone + 'static;

    /// Apply `f` to every result, values and errors alike; `None` drops it.
    fn map_to<W: Clone + 'static>(self, f: impl Fn(ParseResult<V>) -> Option<ParseResult<W>> + 'static) -> ParserRef<W>
    where
        V: Clone + 'static;

    /// Repeat between `min` and `max` (inclusive, unbounded if `None`) times.
    fn repeated(self, min: u32, max: Option<u32>) -> ParserRef<Vec<V>>
    where
        V: Clone + 'static;

    /// Repeat one or more times, keeping every repetition shape reachable.
    fn repeated_ambiguous(self, max: Option<u32>) -> ParserRef<RepNode<V>>
    where
        V: Clone + 'static;
}

impl<V> ParserSugar<V> for ParserRef<V> {
    fn then<W: Clone + 'static>(self, next: ParserRef<W>) -> ParserRef<(V, W)>
    where
        V: Clone + 'static,
    {
        heap_alloc(Sequence::new(self, next))
    }

    fn then_ambiguous<W: Clone + 'static>(self, next: ParserRef<W>) -> ParserRef<crate::combinators::AmbiguousNode<V, W>>
    where
        V: Clone + 'static,
    {
        heap_alloc(SequenceAmbiguous::new(self, next))
    }

    fn optional(self) -> ParserRef<Option<V>>
    where
        V: Clone + 'static,
    {
        heap_alloc(Optional::new(self))
    }

    fn map_to<W: Clone + 'static>(self, f: impl Fn(ParseResult<V>) -> Option<ParseResult<W>> + 'static) -> ParserRef<W>
    where
        V: Clone + 'static,
    {
        heap_alloc(MapTo::new(self, f))
    }

    fn repeated(self, min: u32, max: Option<u32>) -> ParserRef<Vec<V>>
    where
        V: Clone + 'static,
    {
        heap_alloc(Repeated::new(self, min, max))
    }

    fn repeated_ambiguous(self, max: Option<u32>) -> ParserRef<RepNode<V>>
    where
        V: Clone + 'static,
    {
        heap_alloc(RepeatedAmbiguous::new(self, max))
    }
}

/// Tries every alternative at the same offset, forwarding every value any of
/// them produce. A free function rather than a `.or()` method since it takes
/// an arbitrary number of alternatives, not just two.
pub fn one_of<V: Clone + 'static>(alternatives: Vec<ParserRef<V>>) -> ParserRef<V> {
    heap_alloc(OneOf::new(alternatives))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combinators::Literal;
    use crate::context::Context;
    use crate::memo::Memoizer;

    #[test]
    fn then_reads_naturally_left_to_right() {
        let memo = Memoizer::new();
        let input = b"abcd";
        let grammar = heap_alloc(Literal::new("ab")).then(heap_alloc(Literal::new("cd")));
        let ctx = Context::<((), ())>::root(&memo, input, grammar.node_name(memo.node_names()));
        grammar.parse(&ctx);
        let results: Vec<_> = ctx.results.subscribe(ParseResult::error(0, "unused")).collect();
        assert_eq!(results, vec![ParseResult::value(4, ((), ()))]);
    }

    #[test]
    fn one_of_picks_among_several_alternatives() {
        let memo = Memoizer::new();
        let input = b"cd";
        let grammar = one_of(vec![heap_alloc(Literal::new("ab")), heap_alloc(Literal::new("cd"))]);
        let ctx = Context::<()>::root(&memo, input, grammar.node_name(memo.node_names()));
        grammar.parse(&ctx);
        let results: Vec<_> = ctx.results.subscribe(ParseResult::error(0, "unused")).collect();
        assert_eq!(results, vec![ParseResult::value(2, ())]);
    }
}
