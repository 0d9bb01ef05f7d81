//! Per-node-and-position memoization and recursion-retry bookkeeping.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use log::trace;

use crate::identity::NodeNameCache;
use crate::pos::{ParserPath, PosDepthKey, PosKey};
use crate::result::ParseResult;
use crate::stream::ResultStream;

/// `(current_depth, max_depth)` for one `PosKey` currently under retry.
#[derive(Clone, Copy, Debug)]
pub struct RecursionRetry {
    pub current_depth: u32,
    pub max_depth: u32,
}

/// A type-erased handle to one memoized `ResultStream<ParseResult<V>>`.
/// The value type `V` varies per parser node; a `Memoizer` holds entries for
/// every node active in a single top-level parse behind `Box<dyn Any>` and
/// downcasts back to the caller-supplied `V` at lookup time, per the
/// "opaque pointer, cast back using a compile-time value-type parameter"
/// realization in the design notes.
struct ErasedEntry(Box<dyn Any>);

impl ErasedEntry {
    fn new<V: 'static>(stream: Rc<ResultStream<ParseResult<V>>>) -> Self {
        ErasedEntry(Box::new(stream))
    }

    fn downcast<V: 'static>(&self) -> Rc<ResultStream<ParseResult<V>>> {
        self.0
            .downcast_ref::<Rc<ResultStream<ParseResult<V>>>>()
            .expect("memo entry read back at the wrong value type")
            .clone()
    }
}

pub struct Memoizer {
    memoized: RefCell<HashMap<PosDepthKey, ErasedEntry>>,
    recursion: RefCell<HashMap<PosKey, RecursionRetry>>,
    deferred_cleanups: RefCell<Vec<ErasedEntry>>,
    node_names: NodeNameCache,
}

impl Memoizer {
    pub fn new() -> Self {
        Memoizer {
            memoized: RefCell::new(HashMap::new()),
            recursion: RefCell::new(HashMap::new()),
            deferred_cleanups: RefCell::new(Vec::new()),
            node_names: NodeNameCache::new(),
        }
    }

    pub fn node_names(&self) -> &NodeNameCache {
        &self.node_names
    }

    pub fn is_retrying(&self, key: PosKey) -> bool {
        self.recursion.borrow().contains_key(&key)
    }

    /// Fetch or create the memoized stream for `key`, returning the stream
    /// and whether it already existed (in which case the caller must not
    /// re-invoke the child parser).
    pub fn get<V: 'static>(
        &self,
        path: &ParserPath,
        key: PosKey,
        opt_new_max_depth: Option<u32>,
    ) -> (Rc<ResultStream<ParseResult<V>>>, bool) {
        let depth = self.resolve_depth(path, key, opt_new_max_depth);
        let pdk = PosDepthKey { pos: key, depth };

        if let Some(entry) = self.memoized.borrow().get(&pdk) {
            return (entry.downcast::<V>(), true);
        }

        let stream = Rc::new(ResultStream::new(key));
        self.memoized.borrow_mut().insert(pdk, ErasedEntry::new(stream.clone()));
        (stream, false)
    }

    fn resolve_depth(&self, path: &ParserPath, key: PosKey, opt_new_max_depth: Option<u32>) -> u32 {
        let mut recursion = self.recursion.borrow_mut();

        if let Some(retry) = recursion.get(&key).copied() {
            if let Some(d) = opt_new_max_depth {
                trace!("memoizer: re-entering retry for {key:?} at depth {d}");
                recursion.insert(key, RecursionRetry { current_depth: d, max_depth: d });
                drop(recursion);
                self.clear_stale(key, d);
                return d;
            }
            let decremented = retry.current_depth.saturating_sub(1);
            recursion.insert(key, RecursionRetry { current_depth: decremented, max_depth: retry.max_depth });
            return decremented;
        }

        if let Some(d) = opt_new_max_depth {
            trace!("memoizer: starting retry for {key:?} at depth {d}");
            recursion.insert(key, RecursionRetry { current_depth: d, max_depth: d });
            drop(recursion);
            self.clear_stale(key, d);
            return d;
        }
        drop(recursion);

        // A node that is not itself retrying but sits beneath one that is
        // just inherits the ancestor's current depth; it has no retry round
        // of its own to set up, so nothing here needs clearing.
        let recursion = self.recursion.borrow();
        match path.nearest_ancestor_in(|k| recursion.contains_key(k)) {
            Some(ancestor) => recursion[&ancestor].current_depth,
            None => 0,
        }
    }

    /// Called once a [`crate::combinators::reentrant::Reentrant`] node has
    /// picked its final round: installs `stream` as the permanent depth-0
    /// entry for `key` and stops treating `key` as under retry, so any later
    /// lookup of the same position (from a different parent in an ambiguous
    /// grammar) replays the finished result instead of re-running the rounds.
    pub fn finish_retry<V: 'static>(&self, key: PosKey, stream: Rc<ResultStream<ParseResult<V>>>) {
        self.recursion.borrow_mut().remove(&key);
        let pdk = PosDepthKey { pos: key, depth: 0 };
        if let Some(old) = self.memoized.borrow_mut().insert(pdk, ErasedEntry::new(stream)) {
            self.deferred_cleanups.borrow_mut().push(old);
        }
    }

    /// Remove memo entries for `key` at depths older than `new_depth - 1`,
    /// moving them to the deferred cleanup list. Depth `new_depth - 1` itself
    /// is deliberately kept: a self-reference encountered while the
    /// `new_depth` round runs resolves to exactly that depth (see
    /// `resolve_depth`'s decrement branch) and must still find the previous
    /// round's finished stream there. An ancestor activation holding a
    /// reference to an older stream may still be reading it, so entries are
    /// moved aside rather than dropped outright.
    fn clear_stale(&self, key: PosKey, new_depth: u32) {
        let keep_from = new_depth.saturating_sub(1);
        let mut memoized = self.memoized.borrow_mut();
        let mut deferred = self.deferred_cleanups.borrow_mut();
        for depth in 0..keep_from {
            if let Some(entry) = memoized.remove(&PosDepthKey { pos: key, depth }) {
                trace!("memoizer: deferring cleanup of {key:?} at depth {depth}, superseded by depth {new_depth}");
                deferred.push(entry);
            }
        }
    }
}

impl Default for Memoizer {
    fn default() -> Self {
        Self::new()
    }
}
