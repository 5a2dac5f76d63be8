//! Grammar construction errors.

use thiserror::Error;

/// A grammar or action registry could not be built.
///
/// Names and tags are carried as their `Debug` rendering so the error type
/// stays independent of the caller's tag and name types.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GrammarError {
    #[error("rule `{0}` is defined more than once")]
    DuplicateRule(String),

    #[error("start symbol `{0}` has no rule")]
    MissingStartRule(String),

    #[error("rule `{rule}` uses an operator built for a different grammar")]
    ForeignOperator { rule: String },

    #[error("rule `{rule}` references `{name}`, which has no rule")]
    UndefinedRule { name: String, rule: String },

    #[error("{operator} needs at least two operands, got {count}")]
    TooFewOperands { operator: &'static str, count: usize },

    #[error("semantic action for {kind} `{name}` is already set")]
    DuplicateAction { kind: &'static str, name: String },
}
