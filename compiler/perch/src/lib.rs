//! Perch: parsing expression grammars over regex-tokenized input.
//!
//! A parse runs in three steps:
//!
//! 1. A [`Tokenizer`] splits text into tagged [`Token`]s.
//! 2. A [`Grammar`], built with a [`PegBuilder`] or compiled from grammar
//!    text by a [`Generator`], matches the tokens from its start symbol.
//! 3. [`SemanticAction`]s attached to the operators turn the match into the
//!    caller's value type.
//!
//! ```text
//! let tokenizer = Tokenizer::from_patterns([(Tag::Num, "[0-9]+"), (Tag::Plus, r"\+")])?;
//! let generator = Generator::new(Vocabulary::from_debug_names(Tag::ALL, [Rule::Sum]))?;
//! let grammar = generator.compile("Sum => [Num] ([Plus] [Num])*", Rule::Sum, builder)?;
//! let outcome = grammar.parse(tokenizer.tokenize("1+2").tokens());
//! ```
//!
//! Tag and rule name types are chosen by the caller, normally fieldless
//! enums.

use std::sync::OnceLock;

pub use perch_gen::{GenerateError, Generator, Vocabulary};
pub use perch_lexer::{
    LexerError, MatchRange, Token, TokenDefinition, TokenizationResult, Tokenizer,
};
pub use perch_peg::{
    action, Grammar, GrammarError, Match, MatchedOperator, OpId, Operator, ParseContext,
    ParseOutcome, ParseStats, PassthroughNode, PegBuilder, Rule, RuleGraph, RuleName,
    SemanticAction, SemanticActions, SemanticValue, TokenTag,
};
pub use perch_stack::ensure_sufficient_stack;

/// Environment variable holding the log filter.
const LOG_FILTER_ENV: &str = "RUST_LOG";

/// Install a stderr `tracing` subscriber filtered by `RUST_LOG`.
///
/// Does nothing while `RUST_LOG` is unset or unparsable. Only the first call
/// tries to install; later calls report the first call's result. Returns
/// `true` if this process logs through the subscriber installed here, and
/// `false` if logging is off or another global subscriber was already set.
///
/// Useful filters:
///
/// - `RUST_LOG=perch_gen=debug`: grammar-text compilation and its errors.
/// - `RUST_LOG=perch_peg=debug`: grammar construction and per-parse totals.
/// - `RUST_LOG=perch_peg=trace`: every memo hit and left-recursion cut.
/// - `RUST_LOG=perch_lexer=trace`: every token.
pub fn init_tracing() -> bool {
    static INSTALLED: OnceLock<bool> = OnceLock::new();

    *INSTALLED.get_or_init(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let Ok(filter) = EnvFilter::try_from_env(LOG_FILTER_ENV) else {
            return false;
        };
        let installed = tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .with(filter)
            .try_init()
            .is_ok();
        if installed {
            tracing::debug!(filter = LOG_FILTER_ENV, "perch tracing initialized");
        }
        installed
    })
}
