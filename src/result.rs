//! `Result<V>`: the data-plane outcome every parser activation emits.

/// A single parse outcome at a given `offset`: either a successfully produced
/// value, or a recoverable mismatch carrying a short explanatory message.
///
/// Errors are ordinary values here, not exceptional control flow — see the
/// error handling policy in the crate's design notes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome<V> {
    Value(V),
    Error(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseResult<V> {
    /// Input position after a successful match, or the position at which an
    /// error was observed.
    pub offset: u64,
    pub outcome: Outcome<V>,
}

impl<V> ParseResult<V> {
    pub fn value(offset: u64, value: V) -> Self {
        ParseResult { offset, outcome: Outcome::Value(value) }
    }

    pub fn error(offset: u64, message: impl Into<String>) -> Self {
        ParseResult { offset, outcome: Outcome::Error(message.into()) }
    }

    pub fn is_value(&self) -> bool {
        matches!(self.outcome, Outcome::Value(_))
    }

    pub fn is_error(&self) -> bool {
        matches!(self.outcome, Outcome::Error(_))
    }

    pub fn as_value(&self) -> Option<&V> {
        match &self.outcome {
            Outcome::Value(v) => Some(v),
            Outcome::Error(_) => None,
        }
    }

    pub fn map<T>(self, f: impl FnOnce(V) -> T) -> ParseResult<T> {
        match self.outcome {
            Outcome::Value(v) => ParseResult::value(self.offset, f(v)),
            Outcome::Error(e) => ParseResult::error(self.offset, e),
        }
    }
}

/// The fallback message injected for a cyclic subscription (see
/// [`crate::stream::ResultStream::subscribe`]) and for a `Reentrant` base case
/// that never found a non-recursive alternative.
pub const EMPTY_LANGUAGE: &str = "matches only the empty language";
