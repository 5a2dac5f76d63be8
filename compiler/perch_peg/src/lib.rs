//! Parsing expression grammars over tagged token streams.
//!
//! Grammars are built from a closed set of operators stored in a
//! [`RuleGraph`] arena and addressed by [`OpId`]. A [`PegBuilder`] creates the
//! operators, attaching default [`SemanticAction`]s from its
//! [`SemanticActions`] registry, and [`PegBuilder::build`] validates the rule
//! set and produces an immutable [`Grammar`].
//!
//! # Evaluation
//!
//! [`Grammar::parse`] runs recursive descent from the start symbol. All
//! mutable state of a run (memo table, in-progress non-terminal calls) lives
//! in a [`ParseContext`], so one grammar can serve any number of parses,
//! including concurrent ones.
//!
//! - Non-terminal results are memoized by `(rule, position, mode)` for the
//!   duration of one parse.
//! - A non-terminal node re-entered at a position where it is already in
//!   progress fails immediately, cutting left-recursive cycles.
//! - Predicates evaluate their operand in probe mode: no semantic actions
//!   fire anywhere beneath them.

mod action;
mod builder;
mod context;
mod error;
mod grammar;
mod operator;
mod outcome;

use std::fmt;
use std::hash::Hash;

pub use action::{action, Match, MatchedOperator, PassthroughNode, SemanticAction, SemanticActions};
pub use builder::PegBuilder;
pub use context::{ParseContext, ParseStats};
pub use error::GrammarError;
pub use grammar::{Grammar, Rule};
pub use operator::{OpId, Operator, RuleGraph};
pub use outcome::ParseOutcome;

pub use perch_lexer::{MatchRange, Token};

/// Bounds on the caller's token tag type.
pub trait TokenTag: Copy + Eq + Hash + fmt::Debug + 'static {}

impl<K> TokenTag for K where K: Copy + Eq + Hash + fmt::Debug + 'static {}

/// Bounds on the caller's rule name type.
pub trait RuleName: Copy + Eq + Hash + fmt::Debug + 'static {}

impl<N> RuleName for N where N: Copy + Eq + Hash + fmt::Debug + 'static {}

/// Bounds on semantic values.
///
/// Operators without an action produce `T::default()`; memoized results are
/// handed out as clones.
pub trait SemanticValue: Clone + Default + 'static {}

impl<T> SemanticValue for T where T: Clone + Default + 'static {}
