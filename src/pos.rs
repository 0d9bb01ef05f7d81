//! Identity and ancestry of parser activations.

use std::fmt;

/// Structural hash identifying a parser node's *shape*. `0` is the sentinel used
/// while a self-referential shape is still being computed (see [`crate::identity`]).
pub type NodeName = u64;

/// Identifies a parser's activation at a specific input position: which node,
/// over which input buffer, at which offset.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PosKey {
    pub node: NodeName,
    pub input_base: usize,
    pub offset: u64,
}

impl fmt::Debug for PosKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PosKey(node={:#x}, base={:#x}, offset={})", self.node, self.input_base, self.offset)
    }
}

impl PosKey {
    pub fn new(node: NodeName, input_base: usize, offset: u64) -> Self {
        PosKey { node, input_base, offset }
    }
}

/// Adds the current retry depth for same-position recursion on top of a [`PosKey`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PosDepthKey {
    pub pos: PosKey,
    pub depth: u32,
}

/// Ordered stack of ancestor activations, root first. By convention a
/// `ParserPath` includes the key of the activation it belongs to as its last
/// element: deriving a child context appends the child's own key, so "does
/// `key` appear in `path`" always correctly answers "is `key` an ancestor of,
/// or identical to, the activation that owns this path".
#[derive(Clone, Debug, Default)]
pub struct ParserPath(Vec<PosKey>);

impl ParserPath {
    pub fn root(key: PosKey) -> Self {
        ParserPath(vec![key])
    }

    pub fn contains(&self, key: &PosKey) -> bool {
        self.0.contains(key)
    }

    /// Clone this path and append `key`, used when deriving a child context.
    pub fn pushed(&self, key: PosKey) -> Self {
        let mut next = self.0.clone();
        next.push(key);
        ParserPath(next)
    }

    /// Scan from the root toward the tip and return the first (outermost)
    /// ancestor key present in `present`. Used by the memoizer to let a node
    /// that is not itself retrying inherit an enclosing retry's depth.
    pub fn nearest_ancestor_in<F: Fn(&PosKey) -> bool>(&self, present: F) -> Option<PosKey> {
        self.0.iter().find(|k| present(k)).copied()
    }

    pub fn as_slice(&self) -> &[PosKey] {
        &self.0
    }
}
