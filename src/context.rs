//! Per-activation parse state and child-context derivation.

use std::rc::Rc;

use crate::memo::Memoizer;
use crate::pos::{NodeName, ParserPath, PosKey};
use crate::result::ParseResult;
use crate::stream::ResultStream;

/// The state one parser activation sees: where it is in the input, where to
/// publish its results, and a handle back to the shared memoizer.
pub struct Context<'a, V> {
    pub input: &'a [u8],
    pub offset: u64,
    pub results: Rc<ResultStream<ParseResult<V>>>,
    /// Set when the memoizer already held a stream for this activation: the
    /// combinator that derived this context must not invoke the child parser
    /// again, only subscribe to what is already there.
    pub existing_results: bool,
    pub memoizer: &'a Memoizer,
    pub key: PosKey,
    pub path: ParserPath,
}

impl<'a, V: 'static> Context<'a, V> {
    /// Start a fresh top-level parse over `input` for a parser whose
    /// structural name is `node`.
    pub fn root(memoizer: &'a Memoizer, input: &'a [u8], node: NodeName) -> Self {
        let key = PosKey::new(node, input.as_ptr() as usize, 0);
        Context {
            input,
            offset: 0,
            results: Rc::new(ResultStream::new(key)),
            existing_results: false,
            memoizer,
            key,
            path: ParserPath::root(key),
        }
    }

    /// Derive a context for a child parser named `node`, reading from
    /// `new_offset`. `opt_max_depth` is `Some(d)` only when the caller is a
    /// [`crate::combinators::reentrant::Reentrant`] initiating or continuing
    /// a same-position retry round.
    pub fn init_child<V2: 'static>(&self, node: NodeName, new_offset: u64, opt_max_depth: Option<u32>) -> Context<'a, V2> {
        let child_key = PosKey::new(node, self.key.input_base, new_offset);
        let child_path = self.path.pushed(child_key);
        let (results, existing_results) = self.memoizer.get::<V2>(&self.path, child_key, opt_max_depth);
        Context {
            input: self.input,
            offset: new_offset,
            results,
            existing_results,
            memoizer: self.memoizer,
            key: child_key,
            path: child_path,
        }
    }
}
