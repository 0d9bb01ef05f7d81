//! Property-based checks over the invariants the rest of the suite only
//! ever exercises with hand-picked inputs: offsets never run backwards,
//! closed streams replay identically no matter how many subscribers ask,
//! and repetition/alternation counts track the input rather than the
//! combinator's own bookkeeping.

use proptest::prelude::*;

use gll_streams::combinators::{Literal, OneOf};
use gll_streams::context::Context;
use gll_streams::memo::Memoizer;
use gll_streams::parser::heap_alloc;
use gll_streams::parser::Parser;
use gll_streams::pos::PosKey;
use gll_streams::result::ParseResult;
use gll_streams::run;
use gll_streams::stream::ResultStream;
use gll_streams::sugar::ParserSugar;

proptest! {
    /// A closed stream's replay is a pure function of what was added to it:
    /// the same subscription, asked for twice, returns the same sequence in
    /// the same order, no matter how many times or how many subscribers ask.
    #[test]
    fn closed_stream_replay_is_stable(values in proptest::collection::vec(0i32..1000, 0..20)) {
        let stream: ResultStream<ParseResult<i32>> = ResultStream::new(PosKey::new(1, 0, 0));
        for (i, v) in values.iter().enumerate() {
            stream.add(ParseResult::value(i as u64, *v));
        }
        stream.close();

        let fallback = ParseResult::error(0, "unused");
        let first: Vec<_> = stream.subscribe(fallback.clone()).collect();
        let second: Vec<_> = stream.subscribe(fallback).collect();
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), values.len());
        for (result, expected) in first.iter().zip(values.iter()) {
            prop_assert_eq!(result.as_value(), Some(expected));
        }
    }

    /// A literal match's offset is always exactly the start offset plus the
    /// pattern's length, never short or long, whatever the surrounding text.
    #[test]
    fn literal_match_offset_tracks_pattern_length(prefix in "[a-z]{0,12}", pattern in "[a-z]{1,8}", suffix in "[a-z]{0,12}") {
        let input = format!("{prefix}{pattern}{suffix}");
        let memo = Memoizer::new();
        let grammar = heap_alloc(Literal::new(pattern.clone()));
        let ctx = Context::<()>::root(&memo, input.as_bytes(), grammar.node_name(memo.node_names()));

        // Re-point the context at the offset just past `prefix` by driving a
        // fresh memoizer lookup there directly, the way `Sequence` does.
        let prefix_end = prefix.len() as u64;
        let inner_ctx = ctx.init_child(grammar.node_name(memo.node_names()), prefix_end, None);
        if !inner_ctx.existing_results {
            grammar.parse(&inner_ctx);
        }
        let fallback = ParseResult::error(prefix_end, "unused");
        let results: Vec<_> = inner_ctx.results.subscribe(fallback).collect();

        prop_assert_eq!(results.len(), 1);
        prop_assert!(results[0].is_value());
        prop_assert_eq!(results[0].offset, prefix_end + pattern.len() as u64);
    }

    /// Repeating a fixed-width literal over a run of `n` back-to-back copies
    /// followed by a byte that can't extend the match produces exactly one
    /// result per count from `0` to `n`, each one `pattern.len()` further
    /// than the last, in ascending order.
    #[test]
    fn repeated_offsets_advance_by_one_pattern_width_per_count(pattern in "[a-z]{1,4}", repeats in 0usize..6, breaker in "[A-Z]") {
        let mut input = pattern.repeat(repeats);
        input.push_str(&breaker);
        let width = pattern.len() as u64;

        let memo = Memoizer::new();
        let rep = heap_alloc(Literal::new(pattern.clone())).repeated(0, None);
        let ctx = Context::<Vec<()>>::root(&memo, input.as_bytes(), rep.node_name(memo.node_names()));
        rep.parse(&ctx);

        let fallback = ParseResult::error(0, "unused");
        let offsets: Vec<u64> = ctx.results.subscribe(fallback).map(|r| r.offset).collect();

        prop_assert_eq!(offsets.len(), repeats + 1);
        for (count, offset) in offsets.iter().enumerate() {
            prop_assert_eq!(*offset, count as u64 * width);
        }
        prop_assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    /// `OneOf` over two disjoint fixed literals picks up exactly the
    /// alternatives that actually match the input, never more and never
    /// fewer, regardless of which one (if either) is present.
    #[test]
    fn one_of_surfaces_exactly_the_matching_alternatives(left in "[a-k]{2,5}", right in "[l-z]{2,5}", pick_left in any::<bool>(), pick_right in any::<bool>()) {
        let input = match (pick_left, pick_right) {
            (true, _) => left.clone(),
            (false, true) => right.clone(),
            (false, false) => format!("{left}{right}"),
        };

        let grammar = OneOf::new(vec![heap_alloc(Literal::new(left.clone())), heap_alloc(Literal::new(right.clone()))]);
        let memo = Memoizer::new();
        let ctx = Context::<()>::root(&memo, input.as_bytes(), grammar.node_name(memo.node_names()));
        grammar.parse(&ctx);

        let fallback = ParseResult::error(0, "unused");
        let matched_lengths: Vec<u64> = ctx.results.subscribe(fallback).filter(|r| r.is_value()).map(|r| r.offset).collect();

        let left_matches = input.starts_with(left.as_str());
        let right_matches = input.starts_with(right.as_str());
        let mut expected = Vec::new();
        if left_matches {
            expected.push(left.len() as u64);
        }
        if right_matches {
            expected.push(right.len() as u64);
        }
        expected.sort_unstable();
        let mut actual = matched_lengths;
        actual.sort_unstable();
        prop_assert_eq!(actual, expected);
    }

    /// `run` never reports a full match at an offset other than the whole
    /// input's length, and a total mismatch never reports trailing input.
    #[test]
    fn run_offsets_are_either_the_whole_input_or_an_error(pattern in "[a-z]{1,6}", extra in "[a-z]{0,6}") {
        let input = format!("{pattern}{extra}");
        let grammar = heap_alloc(Literal::new(pattern.clone()));
        let outcome = run(&grammar, input.as_bytes());

        if extra.is_empty() {
            prop_assert_eq!(outcome.ok(), Some(vec![()]));
        } else {
            match outcome {
                Err(gll_streams::EngineError::TrailingInput { offset, remaining }) => {
                    prop_assert_eq!(offset, pattern.len() as u64);
                    prop_assert_eq!(remaining, extra.len());
                }
                other => prop_assert!(false, "expected trailing input, got {other:?}"),
            }
        }
    }
}
