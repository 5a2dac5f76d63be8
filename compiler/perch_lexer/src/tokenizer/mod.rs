//! Leftmost, priority-ordered scanning.
//!
//! At each step every definition reports its first match at or after the
//! scan position. The match that starts earliest wins; ties go to the
//! definition listed first. The scan then resumes at the end of the winner,
//! or one character past its start if it matched nothing, which guarantees
//! progress for patterns such as `^$`.
//!
//! A definition's pending match stays valid until the scan position passes
//! its start, so each definition is searched again only after its previous
//! match has been consumed or skipped. This keeps rarely matching
//! definitions from rescanning the rest of the input on every step.

use std::fmt;

use tracing::{debug, trace};

use crate::{LexerError, MatchRange, Token, TokenDefinition};

/// Splits text into tokens using an ordered definition list.
///
/// Stateless between calls: the same input always yields the same result.
#[derive(Clone, Debug)]
pub struct Tokenizer<K> {
    definitions: Vec<TokenDefinition<K>>,
}

/// Where a definition's next match lies, relative to the last search.
#[derive(Copy, Clone)]
enum Pending {
    /// Not searched yet, or the scan moved past the cached match.
    Stale,
    /// Cached match, valid while its start is at or after the scan position.
    At(MatchRange),
    /// No match anywhere at or after the last search position.
    Exhausted,
}

impl<K: Copy + fmt::Debug> Tokenizer<K> {
    /// Create a tokenizer. Earlier definitions take priority on ties.
    pub fn new(
        definitions: impl IntoIterator<Item = TokenDefinition<K>>,
    ) -> Result<Self, LexerError> {
        let definitions: Vec<_> = definitions.into_iter().collect();
        if definitions.is_empty() {
            debug!("rejecting tokenizer with no definitions");
            return Err(LexerError::NoDefinitions);
        }
        Ok(Tokenizer { definitions })
    }

    /// Convenience constructor compiling `(tag, pattern)` pairs in order.
    pub fn from_patterns<'p>(
        patterns: impl IntoIterator<Item = (K, &'p str)>,
    ) -> Result<Self, LexerError> {
        let definitions = patterns
            .into_iter()
            .map(|(tag, pattern)| TokenDefinition::new(tag, pattern))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(definitions)
    }

    pub fn definitions(&self) -> &[TokenDefinition<K>] {
        &self.definitions
    }

    /// Tokenize `text`.
    ///
    /// Always returns a result; check [`TokenizationResult::succeeded`] to
    /// find out whether every character was covered.
    #[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
    pub fn tokenize<'src>(&self, text: &'src str) -> TokenizationResult<'src, K> {
        let tokens = self.scan(text);
        let unmatched = unmatched_ranges(&tokens, text.len());
        debug!(
            tokens = tokens.len(),
            gaps = unmatched.len(),
            "tokenization complete"
        );
        TokenizationResult { tokens, unmatched }
    }

    fn scan<'src>(&self, text: &'src str) -> Vec<Token<'src, K>> {
        let mut pending = vec![Pending::Stale; self.definitions.len()];
        let mut tokens = Vec::new();
        let mut pos = 0;

        loop {
            let mut best: Option<(usize, MatchRange)> = None;
            for (index, definition) in self.definitions.iter().enumerate() {
                let found = match pending[index] {
                    Pending::At(range) if range.start >= pos => Some(range),
                    Pending::Exhausted => None,
                    Pending::At(_) | Pending::Stale => {
                        let found = definition.find_at(text, pos);
                        pending[index] = found.map_or(Pending::Exhausted, Pending::At);
                        found
                    }
                };
                if let Some(range) = found {
                    // Strict `<` keeps the earlier definition on a tie.
                    if best.map_or(true, |(_, b)| range.start < b.start) {
                        best = Some((index, range));
                    }
                }
            }

            let Some((index, range)) = best else {
                break;
            };
            let tag = self.definitions[index].tag();
            trace!(?tag, ?range, "token");
            tokens.push(Token::new(tag, range, text));
            pending[index] = Pending::Stale;

            pos = if range.is_empty() {
                next_char_boundary(text, range.start)
            } else {
                range.end()
            };
            if pos >= text.len() {
                break;
            }
        }

        tokens
    }
}

/// Offset of the character after the one starting at `offset`.
fn next_char_boundary(text: &str, offset: usize) -> usize {
    text.get(offset..)
        .and_then(|rest| rest.chars().next())
        .map_or(offset + 1, |c| offset + c.len_utf8())
}

/// Ranges of `0..len` not covered by `tokens`, in order.
fn unmatched_ranges<K>(tokens: &[Token<'_, K>], len: usize) -> Vec<MatchRange>
where
    K: Copy,
{
    let mut gaps = Vec::new();
    let mut covered = 0;
    for token in tokens {
        let range = token.range();
        if range.start > covered {
            gaps.push(MatchRange::new(covered, range.start - covered));
        }
        covered = covered.max(range.end());
    }
    if covered < len {
        gaps.push(MatchRange::new(covered, len - covered));
    }
    gaps
}

/// Tokens recognised in one input, plus the ranges nothing recognised.
#[derive(Clone, Debug)]
pub struct TokenizationResult<'src, K> {
    tokens: Vec<Token<'src, K>>,
    unmatched: Vec<MatchRange>,
}

impl<'src, K: Copy + PartialEq> TokenizationResult<'src, K> {
    /// `true` when every character of the input belongs to a token.
    #[inline]
    pub fn succeeded(&self) -> bool {
        self.unmatched.is_empty()
    }

    /// Matched tokens in source order, including those after a gap.
    #[inline]
    pub fn tokens(&self) -> &[Token<'src, K>] {
        &self.tokens
    }

    /// Uncovered byte ranges in source order.
    #[inline]
    pub fn unmatched(&self) -> &[MatchRange] {
        &self.unmatched
    }

    pub fn into_tokens(self) -> Vec<Token<'src, K>> {
        self.tokens
    }

    /// Matched tokens minus every token tagged `tag`.
    ///
    /// Typically used to drop whitespace before parsing.
    pub fn without(&self, tag: K) -> Vec<Token<'src, K>> {
        self.tokens
            .iter()
            .filter(|token| token.tag() != tag)
            .copied()
            .collect()
    }
}
