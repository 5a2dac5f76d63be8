//! Tokenizer configuration errors.

/// Error raised while building a [`Tokenizer`](crate::Tokenizer).
///
/// Failing to cover the input is not an error; see
/// [`TokenizationResult::succeeded`](crate::TokenizationResult::succeeded).
#[derive(Debug, thiserror::Error)]
pub enum LexerError {
    /// The definition list was empty.
    #[error("expected at least one token definition")]
    NoDefinitions,

    /// A definition's pattern failed to compile.
    #[error("invalid pattern for token `{tag}`: {source}")]
    InvalidPattern {
        /// Debug rendering of the offending tag.
        tag: String,
        #[source]
        source: regex::Error,
    },
}
