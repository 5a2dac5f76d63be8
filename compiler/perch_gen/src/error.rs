//! Grammar-text compilation errors.

use perch_lexer::LexerError;
use perch_peg::GrammarError;
use thiserror::Error;

/// Grammar text could not be turned into rules.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error("grammar text is empty")]
    EmptyGrammar,

    #[error("unrecognized grammar text at offset {offset}: {snippet:?}")]
    Unrecognized { offset: usize, snippet: String },

    #[error("syntax error at token {position}: unexpected {found}")]
    Syntax { position: usize, found: String },

    #[error("unknown token tag `{0}`")]
    UnknownTag(String),

    #[error("unknown rule name `{0}`")]
    UnknownRule(String),

    #[error("{kind} name `{name}` is registered more than once")]
    DuplicateName { kind: &'static str, name: String },

    #[error(transparent)]
    Grammar(#[from] GrammarError),

    #[error(transparent)]
    Lexer(#[from] LexerError),
}
