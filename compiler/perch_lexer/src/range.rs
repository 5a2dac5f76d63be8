//! Start/length ranges over characters or tokens.

use std::fmt;

/// A contiguous range given by start index and length.
///
/// Used both for the byte range a [`Token`](crate::Token) occupies in its
/// source text and for the run of tokens a grammar operator matched.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Default)]
pub struct MatchRange {
    pub start: usize,
    pub length: usize,
}

impl MatchRange {
    /// Empty range at offset zero.
    pub const EMPTY: MatchRange = MatchRange {
        start: 0,
        length: 0,
    };

    #[inline]
    pub const fn new(start: usize, length: usize) -> Self {
        MatchRange { start, length }
    }

    /// Exclusive end index.
    #[inline]
    pub const fn end(&self) -> usize {
        self.start + self.length
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// As a `start..end` range, for slicing.
    #[inline]
    pub const fn as_range(&self) -> std::ops::Range<usize> {
        self.start..self.end()
    }

    /// Check whether either range begins inside the other.
    ///
    /// For non-empty ranges this is sharing at least one index. An empty
    /// range overlaps a range that contains its start; two empty ranges never
    /// overlap.
    pub fn overlaps_with(&self, start: usize, length: usize) -> bool {
        self.as_range().contains(&start) || (start..start + length).contains(&self.start)
    }
}

impl fmt::Debug for MatchRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.start, self.length)
    }
}

impl From<std::ops::Range<usize>> for MatchRange {
    fn from(range: std::ops::Range<usize>) -> Self {
        MatchRange::new(range.start, range.end.saturating_sub(range.start))
    }
}
