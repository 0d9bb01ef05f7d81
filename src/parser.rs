//! The `Parser` contract and parser-graph construction helpers.

use std::cell::RefCell;
use std::rc::Rc;

use crate::context::Context;
use crate::identity::{hash_combine, NodeNameCache};
use crate::pos::NodeName;

/// Every parser exposes two operations: run, and name yourself.
///
/// `parse` must emit zero or more results into `ctx.results` and close that
/// stream on every exit path, including when it emits nothing.
///
/// `node_name` returns this parser's structural hash. Most combinators can
/// compute this fresh on every call (see [`crate::identity`] module docs) by
/// combining a kind tag with their children's names; only
/// [`crate::combinators::reentrant::Reentrant`] needs the address-keyed cache
/// to give a finite name to a shape that refers to itself.
pub trait Parser<V> {
    fn parse(&self, ctx: &Context<'_, V>);
    fn node_name(&self, cache: &NodeNameCache) -> NodeName;
}

/// A stable, shareable reference to a parser node. The parser graph is built
/// once and is read-only during parsing, so plain `Rc` sharing (rather than
/// arena indices or raw pointers) is both idiomatic and sufficient.
pub type ParserRef<V> = Rc<dyn Parser<V>>;

/// Move a parser onto the heap and return a stable reference to it.
pub fn heap_alloc<V: 'static>(parser: impl Parser<V> + 'static) -> ParserRef<V> {
    Rc::new(parser)
}

/// Obtain another stable reference to a parser the caller already owns a
/// reference to. A thin name for `Rc::clone` so grammar-construction code
/// reads the same way whether it is allocating a node for the first time or
/// wiring in a shared one.
pub fn reference<V: ?Sized>(parser: &Rc<V>) -> Rc<V> {
    parser.clone()
}

/// A forward-reference slot: a placeholder parser that delegates to whatever
/// is later installed via [`RecursiveSlot::set`]. Used to build grammars that
/// name themselves (left recursion) without a chicken-and-egg construction
/// order. The slot itself never caches its own name — it just asks its
/// target, which is exactly what lets [`crate::combinators::reentrant::Reentrant`]'s
/// own address-keyed cache detect the cycle and hand back the sentinel name
/// while the target is still being constructed.
pub struct RecursiveSlot<V> {
    inner: Rc<RefCell<Option<ParserRef<V>>>>,
}

impl<V> Clone for RecursiveSlot<V> {
    fn clone(&self) -> Self {
        RecursiveSlot { inner: self.inner.clone() }
    }
}

impl<V> RecursiveSlot<V> {
    fn new() -> Self {
        RecursiveSlot { inner: Rc::new(RefCell::new(None)) }
    }

    pub fn set(&self, parser: ParserRef<V>) {
        *self.inner.borrow_mut() = Some(parser);
    }
}

impl<V: 'static> Parser<V> for RecursiveSlot<V> {
    fn parse(&self, ctx: &Context<'_, V>) {
        let inner = self.inner.borrow().clone().expect("recursive slot used before being resolved");
        inner.parse(ctx);
    }

    fn node_name(&self, cache: &NodeNameCache) -> NodeName {
        match self.inner.borrow().as_ref() {
            Some(inner) => inner.node_name(cache),
            None => 0,
        }
    }
}

/// Build a self-referential parser graph. `build` receives a placeholder
/// reference to the node under construction (usable anywhere the finished
/// parser would be referenced) and must return the finished parser; that
/// parser is then installed into the placeholder, so any use of the
/// placeholder during an actual parse transparently runs the real thing.
pub fn recursive<V: 'static>(build: impl FnOnce(ParserRef<V>) -> ParserRef<V>) -> ParserRef<V> {
    let slot = RecursiveSlot::new();
    let slot_ref: ParserRef<V> = Rc::new(slot.clone());
    let actual = build(slot_ref);
    slot.set(actual);
    Rc::new(slot)
}

pub(crate) fn combine_child_names(own_tag: u64, children: &[NodeName]) -> NodeName {
    let mut parts = Vec::with_capacity(children.len() + 1);
    parts.push(own_tag);
    parts.extend_from_slice(children);
    hash_combine(&parts)
}
