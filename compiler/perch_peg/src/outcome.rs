//! The result of evaluating one operator at one position.

use perch_lexer::MatchRange;

/// Outcome of evaluating an operator.
///
/// Failing to match is an ordinary outcome, not an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseOutcome<T> {
    /// The operator matched `range` and the next operator starts at `next`.
    Matched {
        next: usize,
        range: MatchRange,
        value: T,
    },
    /// The operator did not match; `position` is where it was tried or where
    /// the first failing operand was tried.
    Failed { position: usize },
}

impl<T> ParseOutcome<T> {
    #[inline]
    pub(crate) fn matched(start: usize, length: usize, value: T) -> Self {
        ParseOutcome::Matched {
            next: start + length,
            range: MatchRange::new(start, length),
            value,
        }
    }

    #[inline]
    pub(crate) fn failed(position: usize) -> Self {
        ParseOutcome::Failed { position }
    }

    #[inline]
    pub fn is_ok(&self) -> bool {
        matches!(self, ParseOutcome::Matched { .. })
    }

    /// Token index after the match, or the failure position.
    #[inline]
    pub fn next_index(&self) -> usize {
        match self {
            ParseOutcome::Matched { next, .. } => *next,
            ParseOutcome::Failed { position } => *position,
        }
    }

    /// Matched token range; `None` on failure.
    #[inline]
    pub fn range(&self) -> Option<MatchRange> {
        match self {
            ParseOutcome::Matched { range, .. } => Some(*range),
            ParseOutcome::Failed { .. } => None,
        }
    }

    #[inline]
    pub fn value(&self) -> Option<&T> {
        match self {
            ParseOutcome::Matched { value, .. } => Some(value),
            ParseOutcome::Failed { .. } => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            ParseOutcome::Matched { value, .. } => Some(value),
            ParseOutcome::Failed { .. } => None,
        }
    }
}
