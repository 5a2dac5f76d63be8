//! Per-parse mutable state.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::{OpId, ParseOutcome, RuleName};

/// Memo table and in-progress non-terminal calls for one parse.
///
/// A [`Grammar`](crate::Grammar) never mutates itself; everything a parse
/// writes lives here. Reusing a context across parses keeps its allocations;
/// [`Grammar::parse_with`](crate::Grammar::parse_with) clears it first.
pub struct ParseContext<N, T> {
    memo: FxHashMap<(N, usize, bool), ParseOutcome<T>>,
    active: FxHashSet<(OpId, usize)>,
    stats: ParseStats,
}

/// Counters describing the work one parse did.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct ParseStats {
    /// Non-terminal invocations, including memo hits and cut-offs.
    pub rule_calls: usize,
    pub memo_hits: usize,
    /// Calls refused because the same non-terminal was already in progress
    /// at the same position.
    pub recursion_cuts: usize,
}

impl<N: RuleName, T: Clone> ParseContext<N, T> {
    pub fn new() -> Self {
        ParseContext {
            memo: FxHashMap::default(),
            active: FxHashSet::default(),
            stats: ParseStats::default(),
        }
    }

    pub fn reset(&mut self) {
        self.memo.clear();
        self.active.clear();
        self.stats = ParseStats::default();
    }

    #[inline]
    pub fn stats(&self) -> ParseStats {
        self.stats
    }

    /// Number of memoized `(rule, position, mode)` results.
    #[inline]
    pub fn memo_len(&self) -> usize {
        self.memo.len()
    }

    pub(crate) fn lookup(&mut self, name: N, position: usize, consume: bool) -> Option<ParseOutcome<T>> {
        self.stats.rule_calls += 1;
        let hit = self.memo.get(&(name, position, consume)).cloned();
        if hit.is_some() {
            self.stats.memo_hits += 1;
        }
        hit
    }

    pub(crate) fn record(&mut self, name: N, position: usize, consume: bool, outcome: ParseOutcome<T>) {
        self.memo.insert((name, position, consume), outcome);
    }

    /// Mark `node` in progress at `position`; `false` if it already was.
    pub(crate) fn enter(&mut self, node: OpId, position: usize) -> bool {
        let entered = self.active.insert((node, position));
        if !entered {
            self.stats.recursion_cuts += 1;
        }
        entered
    }

    pub(crate) fn leave(&mut self, node: OpId, position: usize) {
        self.active.remove(&(node, position));
    }
}

impl<N: RuleName, T: Clone> Default for ParseContext<N, T> {
    fn default() -> Self {
        Self::new()
    }
}
