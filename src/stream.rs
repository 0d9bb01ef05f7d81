//! Lazy, multi-subscriber result queues.
//!
//! Cycle detection is usually framed as "does the owning activation appear in
//! the subscriber's ancestry". This engine runs single-threaded and
//! depth-first: a combinator always either (a) just finished invoking the
//! child parser synchronously, so the child's stream is closed by the time it
//! subscribes, or (b) is reading a stream that an *ancestor* frame is still in
//! the middle of producing, which is exactly the case where the stream is not
//! yet closed. Those two cases are exhaustive here, so "is the stream still
//! open" and "is the owner an ancestor of the subscriber" are the same
//! question in this implementation, and checking the former avoids carrying a
//! separate ancestry list through every subscription. This equivalence is
//! documented in DESIGN.md.

use std::cell::RefCell;

use log::trace;

use crate::pos::PosKey;

pub struct ResultStream<R> {
    owner: PosKey,
    items: RefCell<Vec<R>>,
    closed: RefCell<bool>,
}

impl<R> ResultStream<R> {
    pub fn new(owner: PosKey) -> Self {
        ResultStream { owner, items: RefCell::new(Vec::new()), closed: RefCell::new(false) }
    }

    pub fn owner(&self) -> PosKey {
        self.owner
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.borrow()
    }

    pub fn add(&self, item: R) {
        assert!(!self.is_closed(), "add() called after close() on stream owned by {:?}", self.owner);
        self.items.borrow_mut().push(item);
    }

    pub fn close(&self) {
        *self.closed.borrow_mut() = true;
    }
}

impl<R: Clone> ResultStream<R> {
    /// Subscribe to this stream's results. If the stream is still being
    /// produced (a cycle, in this single-threaded engine — see module docs),
    /// the iterator yields exactly `cyclic_fallback` and ends. Otherwise it
    /// walks a snapshot of the buffered items in insertion order.
    pub fn subscribe(&self, cyclic_fallback: R) -> StreamIter<R> {
        if !self.is_closed() {
            trace!("stream owned by {:?}: still open, subscriber falls back to the cyclic result", self.owner);
            StreamIter::Cyclic(Some(cyclic_fallback))
        } else {
            StreamIter::Items { items: self.items.borrow().clone(), idx: 0 }
        }
    }
}

pub enum StreamIter<R> {
    Cyclic(Option<R>),
    Items { items: Vec<R>, idx: usize },
}

impl<R: Clone> Iterator for StreamIter<R> {
    type Item = R;

    fn next(&mut self) -> Option<R> {
        match self {
            StreamIter::Cyclic(slot) => slot.take(),
            StreamIter::Items { items, idx } => {
                if *idx < items.len() {
                    let item = items[*idx].clone();
                    *idx += 1;
                    Some(item)
                } else {
                    None
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::result::ParseResult;

    fn key(offset: u64) -> PosKey {
        PosKey::new(1, 0, offset)
    }

    #[test]
    fn closed_stream_replays_in_order() {
        let s: ResultStream<ParseResult<i32>> = ResultStream::new(key(0));
        s.add(ParseResult::value(1, 10));
        s.add(ParseResult::value(2, 20));
        s.close();
        let fallback = ParseResult::error(0, "unused");
        let collected: Vec<_> = s.subscribe(fallback).collect();
        assert_eq!(collected, vec![ParseResult::value(1, 10), ParseResult::value(2, 20)]);
    }

    #[test]
    fn open_stream_yields_only_the_fallback() {
        let s: ResultStream<ParseResult<i32>> = ResultStream::new(key(0));
        s.add(ParseResult::value(1, 10));
        let fallback = ParseResult::error(0, "matches only the empty language");
        let collected: Vec<_> = s.subscribe(fallback.clone()).collect();
        assert_eq!(collected, vec![fallback]);
    }

    #[test]
    #[should_panic]
    fn add_after_close_panics() {
        let s: ResultStream<ParseResult<i32>> = ResultStream::new(key(0));
        s.close();
        s.add(ParseResult::value(1, 10));
    }

    #[test]
    fn resubscribing_after_close_replays() {
        let s: ResultStream<ParseResult<i32>> = ResultStream::new(key(0));
        s.add(ParseResult::value(1, 10));
        s.close();
        let fallback = ParseResult::error(0, "unused");
        let first: Vec<_> = s.subscribe(fallback.clone()).collect();
        let second: Vec<_> = s.subscribe(fallback).collect();
        assert_eq!(first, second);
    }
}
