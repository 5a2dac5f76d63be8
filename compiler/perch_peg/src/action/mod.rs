//! Semantic actions and the registry that supplies them.
//!
//! An action runs when its operator matches outside a predicate. It sees the
//! [`Match`] (what was matched, and which operator matched it) together with
//! the values of the operator's operands, and produces the operator's value.

use std::fmt;
use std::sync::{Arc, OnceLock};

use rustc_hash::FxHashMap;

use perch_lexer::{MatchRange, Token};

use crate::{GrammarError, RuleName, SemanticValue, TokenTag};

/// Callback producing an operator's value from its operands' values.
pub type SemanticAction<K, T> = Arc<dyn Fn(&Match<'_, '_, K>, Vec<T>) -> T + Send + Sync>;

/// Wrap a closure as a [`SemanticAction`].
///
/// ```text
/// let sum = action(|_, values: Vec<i64>| values.iter().sum());
/// ```
pub fn action<K, T, F>(f: F) -> SemanticAction<K, T>
where
    F: Fn(&Match<'_, '_, K>, Vec<T>) -> T + Send + Sync + 'static,
{
    Arc::new(f)
}

/// What an operator matched.
///
/// The operator's rendering is produced on the first call to
/// [`Match::peg`] and cached with the grammar.
pub struct Match<'m, 'src, K> {
    tokens: &'m [Token<'src, K>],
    range: MatchRange,
    peg: &'m OnceLock<Box<str>>,
    render: &'m dyn Fn() -> String,
}

impl<'m, 'src, K: Copy> Match<'m, 'src, K> {
    pub(crate) fn new(
        tokens: &'m [Token<'src, K>],
        range: MatchRange,
        peg: &'m OnceLock<Box<str>>,
        render: &'m dyn Fn() -> String,
    ) -> Self {
        Match {
            tokens,
            range,
            peg,
            render,
        }
    }

    /// The matched tokens.
    #[inline]
    pub fn tokens(&self) -> &'m [Token<'src, K>] {
        self.tokens
    }

    /// Matched token indices.
    #[inline]
    pub fn range(&self) -> MatchRange {
        self.range
    }

    /// Grammar-text rendering of the operator that matched, e.g. `([A] | [B])`.
    #[inline]
    pub fn peg(&self) -> &'m str {
        self.peg.get_or_init(|| (self.render)().into_boxed_str())
    }

    /// Text of the matched tokens, concatenated.
    pub fn text(&self) -> String {
        self.tokens.iter().map(Token::text).collect()
    }

    /// Text of the first matched token; empty for zero-length matches.
    pub fn first_text(&self) -> &'src str {
        self.tokens.first().map(Token::text).unwrap_or_default()
    }
}

impl<K: Copy + fmt::Debug> fmt::Debug for Match<'_, '_, K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Match")
            .field("range", &self.range)
            .field("peg", &self.peg.get())
            .field("tokens", &self.tokens)
            .finish()
    }
}

/// Operator kinds that fire semantic actions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MatchedOperator {
    Terminal,
    NonTerminal,
    EmptyString,
    Sequence,
    OrderedChoice,
    Optional,
    ZeroOrMore,
    OneOrMore,
}

/// Generic node built by the passthrough actions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PassthroughNode<T> {
    pub operator: MatchedOperator,
    pub range: MatchRange,
    pub text: String,
    pub peg: String,
    pub sub_results: Vec<T>,
}

fn passthrough<K, T>(operator: MatchedOperator) -> SemanticAction<K, T>
where
    K: TokenTag,
    T: SemanticValue + From<PassthroughNode<T>>,
{
    action(move |m: &Match<'_, '_, K>, sub_results: Vec<T>| {
        T::from(PassthroughNode {
            operator,
            range: m.range(),
            text: m.text(),
            peg: m.peg().to_owned(),
            sub_results,
        })
    })
}

/// Registry of the actions a [`PegBuilder`](crate::PegBuilder) attaches to
/// the operators it creates.
///
/// Lookups prefer, in order: an action registered for the tag or name, the
/// default for the operator kind, and the generic passthrough if installed.
/// Predicates never get an action.
pub struct SemanticActions<K, N, T> {
    sequence: Option<SemanticAction<K, T>>,
    ordered_choice: Option<SemanticAction<K, T>>,
    optional: Option<SemanticAction<K, T>>,
    zero_or_more: Option<SemanticAction<K, T>>,
    one_or_more: Option<SemanticAction<K, T>>,
    empty_string: Option<SemanticAction<K, T>>,
    terminals: FxHashMap<K, SemanticAction<K, T>>,
    non_terminals: FxHashMap<N, SemanticAction<K, T>>,
    passthrough: Option<fn(MatchedOperator) -> SemanticAction<K, T>>,
}

impl<K: TokenTag, N: RuleName, T: SemanticValue> SemanticActions<K, N, T> {
    pub fn new() -> Self {
        SemanticActions {
            sequence: None,
            ordered_choice: None,
            optional: None,
            zero_or_more: None,
            one_or_more: None,
            empty_string: None,
            terminals: FxHashMap::default(),
            non_terminals: FxHashMap::default(),
            passthrough: None,
        }
    }

    pub fn set_sequence_action(&mut self, action: SemanticAction<K, T>) {
        self.sequence = Some(action);
    }

    pub fn set_ordered_choice_action(&mut self, action: SemanticAction<K, T>) {
        self.ordered_choice = Some(action);
    }

    pub fn set_optional_action(&mut self, action: SemanticAction<K, T>) {
        self.optional = Some(action);
    }

    pub fn set_zero_or_more_action(&mut self, action: SemanticAction<K, T>) {
        self.zero_or_more = Some(action);
    }

    pub fn set_one_or_more_action(&mut self, action: SemanticAction<K, T>) {
        self.one_or_more = Some(action);
    }

    pub fn set_empty_string_action(&mut self, action: SemanticAction<K, T>) {
        self.empty_string = Some(action);
    }

    /// Register the action for terminals carrying `tag`. Write-once.
    pub fn set_terminal_action(
        &mut self,
        tag: K,
        action: SemanticAction<K, T>,
    ) -> Result<(), GrammarError> {
        if self.terminals.contains_key(&tag) {
            return Err(GrammarError::DuplicateAction {
                kind: "terminal",
                name: format!("{tag:?}"),
            });
        }
        self.terminals.insert(tag, action);
        Ok(())
    }

    /// Register the action for non-terminals named `name`. Write-once.
    pub fn set_non_terminal_action(
        &mut self,
        name: N,
        action: SemanticAction<K, T>,
    ) -> Result<(), GrammarError> {
        if self.non_terminals.contains_key(&name) {
            return Err(GrammarError::DuplicateAction {
                kind: "non-terminal",
                name: format!("{name:?}"),
            });
        }
        self.non_terminals.insert(name, action);
        Ok(())
    }

    /// Build a [`PassthroughNode`] for every match that has no other action.
    pub fn set_generic_passthrough(&mut self)
    where
        T: From<PassthroughNode<T>>,
    {
        self.passthrough = Some(passthrough::<K, T> as fn(MatchedOperator) -> SemanticAction<K, T>);
    }

    pub fn has_generic_passthrough(&self) -> bool {
        self.passthrough.is_some()
    }

    /// Action for a new operator of `kind`.
    ///
    /// Terminals and non-terminals are looked up by tag and name instead.
    pub fn for_kind(&self, kind: MatchedOperator) -> Option<SemanticAction<K, T>> {
        let default = match kind {
            MatchedOperator::Sequence => self.sequence.as_ref(),
            MatchedOperator::OrderedChoice => self.ordered_choice.as_ref(),
            MatchedOperator::Optional => self.optional.as_ref(),
            MatchedOperator::ZeroOrMore => self.zero_or_more.as_ref(),
            MatchedOperator::OneOrMore => self.one_or_more.as_ref(),
            MatchedOperator::EmptyString => self.empty_string.as_ref(),
            MatchedOperator::Terminal | MatchedOperator::NonTerminal => None,
        };
        default
            .cloned()
            .or_else(|| self.passthrough.map(|make| make(kind)))
    }

    pub fn for_terminal(&self, tag: K) -> Option<SemanticAction<K, T>> {
        self.terminals
            .get(&tag)
            .cloned()
            .or_else(|| self.for_kind(MatchedOperator::Terminal))
    }

    pub fn for_non_terminal(&self, name: N) -> Option<SemanticAction<K, T>> {
        self.non_terminals
            .get(&name)
            .cloned()
            .or_else(|| self.for_kind(MatchedOperator::NonTerminal))
    }
}

impl<K: TokenTag, N: RuleName, T: SemanticValue> Default for SemanticActions<K, N, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, N: fmt::Debug, T> fmt::Debug for SemanticActions<K, N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SemanticActions")
            .field("terminals", &self.terminals.keys().collect::<Vec<_>>())
            .field("non_terminals", &self.non_terminals.keys().collect::<Vec<_>>())
            .field("passthrough", &self.passthrough.is_some())
            .finish_non_exhaustive()
    }
}
