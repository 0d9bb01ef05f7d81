//! Structural hashing of parser shapes ([`crate::pos::NodeName`]).
//!
//! Only the forward-reference slot used to build self-referential grammars
//! (see [`crate::parser::recursive`]) needs the address-keyed "currently
//! computing" cache described in the design notes: ordinary combinators
//! compute their name by combining a kind tag with their children's names,
//! and that recursion only fails to terminate when it eventually reaches a
//! slot that refers back to a parser already being named. Caching by
//! instance address is therefore reserved for that one long-lived,
//! never-ephemeral node; giving every combinator its own address-keyed cache
//! would risk aliasing on stack temporaries that are constructed and dropped
//! while unrolling a repetition or retry, since Rust is free to reuse their
//! addresses.

use std::cell::RefCell;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use crate::pos::NodeName;

/// Sentinel returned for a self-referential shape still being computed.
pub const REENTRANT_PLACEHOLDER: NodeName = 0;

pub mod tag {
    pub const LITERAL: u64 = 1;
    pub const ALWAYS: u64 = 2;
    pub const SEQUENCE: u64 = 3;
    pub const SEQUENCE_AMBIGUOUS: u64 = 4;
    pub const ONE_OF: u64 = 5;
    pub const REPEATED: u64 = 6;
    pub const REPEATED_AMBIGUOUS: u64 = 7;
    pub const OPTIONAL: u64 = 8;
    pub const MAP_TO: u64 = 9;
    pub const REENTRANT: u64 = 10;
    pub const RECURSIVE_SLOT: u64 = 11;
}

pub fn hash_combine(parts: &[u64]) -> NodeName {
    let mut hasher = DefaultHasher::new();
    parts.len().hash(&mut hasher);
    for p in parts {
        p.hash(&mut hasher);
    }
    hasher.finish()
}

pub fn hash_bytes(bytes: &[u8]) -> NodeName {
    let mut hasher = DefaultHasher::new();
    bytes.hash(&mut hasher);
    hasher.finish()
}

enum CacheState {
    Computing,
    Done(NodeName),
}

/// Address-keyed cache used exclusively by [`crate::combinators::reentrant::Reentrant`]
/// to give self-referential shapes a finite, deterministic name.
#[derive(Default)]
pub struct NodeNameCache {
    entries: RefCell<HashMap<usize, CacheState>>,
}

impl NodeNameCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the name for the node living at `addr`. If `addr` is currently
    /// being resolved (we recursed back into it), returns the sentinel `0`
    /// without invoking `compute` again. Otherwise runs `compute`, caches the
    /// result, and returns it.
    pub fn resolve(&self, addr: usize, compute: impl FnOnce() -> NodeName) -> NodeName {
        {
            let entries = self.entries.borrow();
            match entries.get(&addr) {
                Some(CacheState::Computing) => return REENTRANT_PLACEHOLDER,
                Some(CacheState::Done(name)) => return *name,
                None => {}
            }
        }
        self.entries.borrow_mut().insert(addr, CacheState::Computing);
        let name = compute();
        self.entries.borrow_mut().insert(addr, CacheState::Done(name));
        name
    }
}
