//! Tokens and the definitions that produce them.

use std::fmt;

use regex::Regex;

use crate::{LexerError, MatchRange};

/// A tagged slice of source text.
///
/// Borrows the text it was cut from, so [`Token::text`] needs no copy.
#[derive(Copy, Clone, PartialEq, Eq)]
pub struct Token<'src, K> {
    tag: K,
    range: MatchRange,
    source: &'src str,
}

impl<'src, K: Copy> Token<'src, K> {
    /// Create a token covering `range` of `source`.
    ///
    /// `range` must lie on character boundaries inside `source`.
    pub fn new(tag: K, range: MatchRange, source: &'src str) -> Self {
        debug_assert!(range.end() <= source.len(), "token range {range:?} past end of source");
        Token { tag, range, source }
    }

    #[inline]
    pub fn tag(&self) -> K {
        self.tag
    }

    /// Byte range within the source text.
    #[inline]
    pub fn range(&self) -> MatchRange {
        self.range
    }

    /// The matched text.
    #[inline]
    pub fn text(&self) -> &'src str {
        self.source.get(self.range.as_range()).unwrap_or_default()
    }

    /// The whole text this token was cut from.
    #[inline]
    pub fn source(&self) -> &'src str {
        self.source
    }
}

impl<K: fmt::Debug> fmt::Debug for Token<'_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.source.get(self.range.as_range()).unwrap_or_default();
        write!(f, "{:?}@{:?} {:?}", self.tag, self.range, text)
    }
}

/// A tag paired with the pattern that recognises it.
#[derive(Clone, Debug)]
pub struct TokenDefinition<K> {
    tag: K,
    pattern: Regex,
}

impl<K: Copy + fmt::Debug> TokenDefinition<K> {
    /// Compile `pattern` as the definition for `tag`.
    pub fn new(tag: K, pattern: &str) -> Result<Self, LexerError> {
        let pattern = Regex::new(pattern).map_err(|source| LexerError::InvalidPattern {
            tag: format!("{tag:?}"),
            source,
        })?;
        Ok(TokenDefinition { tag, pattern })
    }

    /// Use an already compiled pattern.
    pub fn from_regex(tag: K, pattern: Regex) -> Self {
        TokenDefinition { tag, pattern }
    }

    #[inline]
    pub fn tag(&self) -> K {
        self.tag
    }

    #[inline]
    pub fn pattern(&self) -> &Regex {
        &self.pattern
    }

    /// First match starting at or after `from`, as a byte range.
    ///
    /// Anchors and word boundaries see the full text, not just the suffix.
    pub(crate) fn find_at(&self, text: &str, from: usize) -> Option<MatchRange> {
        self.pattern
            .find_at(text, from)
            .map(|m| MatchRange::from(m.range()))
    }
}
