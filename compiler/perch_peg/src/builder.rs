//! Programmatic grammar construction.

use tracing::debug;

use crate::action::MatchedOperator;
use crate::{
    Grammar, GrammarError, OpId, Operator, Rule, RuleGraph, RuleName, SemanticAction,
    SemanticActions, SemanticValue, TokenTag,
};

/// Creates operators and assembles them into a [`Grammar`].
///
/// Each operator gets its semantic action when it is created: the explicit
/// one passed to a `*_with` constructor, otherwise whatever the registry
/// supplies at that moment. Register actions before creating the operators
/// they should apply to.
///
/// ```text
/// let mut peg = PegBuilder::<Tag, Name, Value>::new();
/// let a = peg.terminal(Tag::A);
/// let b = peg.terminal(Tag::B);
/// let body = peg.ordered_choice([a, b])?;
/// let many = peg.zero_or_more(body);
/// let start = peg.rule(Name::Start, many);
/// let grammar = peg.build(Name::Start, [start])?;
/// ```
pub struct PegBuilder<K, N, T> {
    graph: RuleGraph<K, N, T>,
    actions: SemanticActions<K, N, T>,
}

impl<K: TokenTag, N: RuleName, T: SemanticValue> PegBuilder<K, N, T> {
    pub fn new() -> Self {
        Self::with_actions(SemanticActions::new())
    }

    pub fn with_actions(actions: SemanticActions<K, N, T>) -> Self {
        PegBuilder {
            graph: RuleGraph::new(),
            actions,
        }
    }

    #[inline]
    pub fn actions(&self) -> &SemanticActions<K, N, T> {
        &self.actions
    }

    /// Registry for operators created from now on.
    #[inline]
    pub fn actions_mut(&mut self) -> &mut SemanticActions<K, N, T> {
        &mut self.actions
    }

    #[inline]
    pub fn graph(&self) -> &RuleGraph<K, N, T> {
        &self.graph
    }

    pub fn terminal(&mut self, tag: K) -> OpId {
        let action = self.actions.for_terminal(tag);
        self.graph.push(Operator::Terminal(tag), action)
    }

    pub fn terminal_with(&mut self, tag: K, action: SemanticAction<K, T>) -> OpId {
        self.graph.push(Operator::Terminal(tag), Some(action))
    }

    pub fn non_terminal(&mut self, name: N) -> OpId {
        let action = self.actions.for_non_terminal(name);
        self.graph.push(Operator::NonTerminal(name), action)
    }

    pub fn non_terminal_with(&mut self, name: N, action: SemanticAction<K, T>) -> OpId {
        self.graph.push(Operator::NonTerminal(name), Some(action))
    }

    pub fn empty_string(&mut self) -> OpId {
        let action = self.actions.for_kind(MatchedOperator::EmptyString);
        self.graph.push(Operator::EmptyString, action)
    }

    pub fn empty_string_with(&mut self, action: SemanticAction<K, T>) -> OpId {
        self.graph.push(Operator::EmptyString, Some(action))
    }

    /// Sequence of at least two operands.
    pub fn sequence(&mut self, children: impl IntoIterator<Item = OpId>) -> Result<OpId, GrammarError> {
        let action = self.actions.for_kind(MatchedOperator::Sequence);
        self.composite(children, Operator::Sequence, action)
    }

    pub fn sequence_with(
        &mut self,
        children: impl IntoIterator<Item = OpId>,
        action: SemanticAction<K, T>,
    ) -> Result<OpId, GrammarError> {
        self.composite(children, Operator::Sequence, Some(action))
    }

    /// Ordered choice between at least two operands.
    pub fn ordered_choice(
        &mut self,
        children: impl IntoIterator<Item = OpId>,
    ) -> Result<OpId, GrammarError> {
        let action = self.actions.for_kind(MatchedOperator::OrderedChoice);
        self.composite(children, Operator::OrderedChoice, action)
    }

    pub fn ordered_choice_with(
        &mut self,
        children: impl IntoIterator<Item = OpId>,
        action: SemanticAction<K, T>,
    ) -> Result<OpId, GrammarError> {
        self.composite(children, Operator::OrderedChoice, Some(action))
    }

    pub fn optional(&mut self, child: OpId) -> OpId {
        let action = self.actions.for_kind(MatchedOperator::Optional);
        self.graph.push(Operator::Optional(child), action)
    }

    pub fn optional_with(&mut self, child: OpId, action: SemanticAction<K, T>) -> OpId {
        self.graph.push(Operator::Optional(child), Some(action))
    }

    pub fn zero_or_more(&mut self, child: OpId) -> OpId {
        let action = self.actions.for_kind(MatchedOperator::ZeroOrMore);
        self.graph.push(Operator::ZeroOrMore(child), action)
    }

    pub fn zero_or_more_with(&mut self, child: OpId, action: SemanticAction<K, T>) -> OpId {
        self.graph.push(Operator::ZeroOrMore(child), Some(action))
    }

    pub fn one_or_more(&mut self, child: OpId) -> OpId {
        let action = self.actions.for_kind(MatchedOperator::OneOrMore);
        self.graph.push(Operator::OneOrMore(child), action)
    }

    pub fn one_or_more_with(&mut self, child: OpId, action: SemanticAction<K, T>) -> OpId {
        self.graph.push(Operator::OneOrMore(child), Some(action))
    }

    /// Positive lookahead. Predicates never carry actions.
    pub fn and_predicate(&mut self, child: OpId) -> OpId {
        self.graph.push(Operator::AndPredicate(child), None)
    }

    /// Negative lookahead.
    pub fn not_predicate(&mut self, child: OpId) -> OpId {
        self.graph.push(Operator::NotPredicate(child), None)
    }

    #[inline]
    pub fn rule(&self, head: N, body: OpId) -> Rule<N> {
        Rule::new(head, body)
    }

    /// Validate `rules` and freeze them into a grammar starting at `start`.
    pub fn build(
        self,
        start: N,
        rules: impl IntoIterator<Item = Rule<N>>,
    ) -> Result<Grammar<K, N, T>, GrammarError> {
        Grammar::new(self.graph, &self.actions, start, rules.into_iter().collect())
    }

    fn composite(
        &mut self,
        children: impl IntoIterator<Item = OpId>,
        make: fn(Vec<OpId>) -> Operator<K, N>,
        action: Option<SemanticAction<K, T>>,
    ) -> Result<OpId, GrammarError> {
        let children: Vec<OpId> = children.into_iter().collect();
        let operator = make(children);
        if operator.operands().len() < 2 {
            debug!(operator = operator.kind_name(), "too few operands");
            return Err(GrammarError::TooFewOperands {
                operator: operator.kind_name(),
                count: operator.operands().len(),
            });
        }
        Ok(self.graph.push(operator, action))
    }
}

impl<K: TokenTag, N: RuleName, T: SemanticValue> Default for PegBuilder<K, N, T> {
    fn default() -> Self {
        Self::new()
    }
}
