//! The composable combinator set: primitives, sequencing, repetition,
//! alternation, optionality, mapping, and same-position left recursion.

pub mod literal;
pub mod map_to;
pub mod one_of;
pub mod optional;
pub mod reentrant;
pub mod repeated;
pub mod sequence;

pub use literal::{Always, Literal};
pub use map_to::MapTo;
pub use one_of::OneOf;
pub use optional::Optional;
pub use reentrant::{reentrant, reentrant_with_limit, Reentrant};
pub use repeated::{flatten_repeated, RepNode, Repeated, RepeatedAmbiguous};
pub use sequence::{flatten, AmbiguousNode, Sequence, SequenceAmbiguous};
