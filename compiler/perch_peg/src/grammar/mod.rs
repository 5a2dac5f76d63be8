//! Validated grammars and their evaluation.
//!
//! Evaluation is one recursive function over the operator enum. The
//! `consume` flag is `false` beneath predicates, where no action fires and
//! every operator yields `T::default()`.
//!
//! Non-terminal calls are where recursion can run away, so they carry the
//! bookkeeping:
//!
//! 1. A memoized `(rule, position, consume)` body result is reused.
//! 2. A non-terminal node already in progress at the same position fails on
//!    the spot. The cut-off itself is not memoized.
//! 3. Otherwise the rule body runs on a freshly grown stack if needed, and
//!    its result is memoized.
//!
//! The memo holds body results only. Each non-terminal node applies its own
//! action afterwards, so two nodes naming the same rule may label the same
//! match differently.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use perch_lexer::{MatchRange, Token};
use perch_stack::ensure_sufficient_stack;

use crate::action::Match;
use crate::{
    GrammarError, OpId, Operator, ParseContext, ParseOutcome, RuleGraph, RuleName,
    SemanticActions, SemanticValue, TokenTag,
};

/// A rule head paired with its body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Rule<N> {
    head: N,
    body: OpId,
}

impl<N: Copy> Rule<N> {
    #[inline]
    pub const fn new(head: N, body: OpId) -> Self {
        Rule { head, body }
    }

    #[inline]
    pub fn head(&self) -> N {
        self.head
    }

    #[inline]
    pub fn body(&self) -> OpId {
        self.body
    }
}

/// An immutable, validated grammar.
///
/// Parsing keeps its state in a [`ParseContext`], so a grammar can be shared
/// between threads and parsed concurrently.
pub struct Grammar<K, N, T> {
    graph: RuleGraph<K, N, T>,
    rules: Vec<Rule<N>>,
    bodies: FxHashMap<N, OpId>,
    start: N,
    start_node: OpId,
    /// Renderings of operators, by node index, filled in when an action
    /// first asks for one.
    labels: Vec<OnceLock<Box<str>>>,
}

impl<K: TokenTag, N: RuleName, T: SemanticValue> Grammar<K, N, T> {
    pub(crate) fn new(
        mut graph: RuleGraph<K, N, T>,
        actions: &SemanticActions<K, N, T>,
        start: N,
        rules: Vec<Rule<N>>,
    ) -> Result<Self, GrammarError> {
        let mut bodies = FxHashMap::default();
        for rule in &rules {
            if bodies.insert(rule.head, rule.body).is_some() {
                debug!(head = ?rule.head, "duplicate rule");
                return Err(GrammarError::DuplicateRule(format!("{:?}", rule.head)));
            }
        }

        if !bodies.contains_key(&start) {
            debug!(?start, "start symbol has no rule");
            return Err(GrammarError::MissingStartRule(format!("{start:?}")));
        }

        let mut referenced = Vec::with_capacity(rules.len());
        for rule in &rules {
            let names = graph.non_terminal_names(rule.body).map_err(|foreign| {
                debug!(head = ?rule.head, ?foreign, "foreign operator");
                GrammarError::ForeignOperator {
                    rule: format!("{:?}", rule.head),
                }
            })?;
            referenced.push(names);
        }

        for (rule, names) in rules.iter().zip(&referenced) {
            if let Some(name) = names.iter().find(|name| !bodies.contains_key(name)) {
                debug!(head = ?rule.head, ?name, "undefined rule");
                return Err(GrammarError::UndefinedRule {
                    name: format!("{name:?}"),
                    rule: format!("{:?}", rule.head),
                });
            }
        }

        let start_node = graph.push(Operator::NonTerminal(start), actions.for_non_terminal(start));
        let labels = graph.ids().map(|_| OnceLock::new()).collect();

        debug!(rules = rules.len(), operators = graph.len(), "grammar built");
        Ok(Grammar {
            graph,
            rules,
            bodies,
            start,
            start_node,
            labels,
        })
    }

    #[inline]
    pub fn start(&self) -> N {
        self.start
    }

    /// Rules in declaration order.
    #[inline]
    pub fn rules(&self) -> &[Rule<N>] {
        &self.rules
    }

    #[inline]
    pub fn graph(&self) -> &RuleGraph<K, N, T> {
        &self.graph
    }

    /// Body of the rule headed `name`.
    pub fn rule_body(&self, name: N) -> Option<OpId> {
        self.bodies.get(&name).copied()
    }

    /// All rules as grammar text, one `Head => Expr;` line each.
    pub fn to_text(&self) -> String {
        self.rules
            .iter()
            .map(|rule| format!("{:?} => {};", rule.head, self.graph.render(rule.body)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Parse `tokens` from the start symbol with a fresh context.
    pub fn parse(&self, tokens: &[Token<'_, K>]) -> ParseOutcome<T> {
        let mut ctx = ParseContext::new();
        self.parse_with(&mut ctx, tokens)
    }

    /// Parse `tokens`, reusing `ctx`'s allocations.
    ///
    /// Fails unless the start symbol matches every token.
    #[tracing::instrument(level = "debug", skip_all, fields(tokens = tokens.len()))]
    pub fn parse_with(
        &self,
        ctx: &mut ParseContext<N, T>,
        tokens: &[Token<'_, K>],
    ) -> ParseOutcome<T> {
        ctx.reset();
        let outcome = self.eval(ctx, tokens, self.start_node, 0, true);
        let stats = ctx.stats();
        let outcome = match outcome {
            ParseOutcome::Matched { next, .. } if next != tokens.len() => {
                debug!(next, "input remains after match");
                ParseOutcome::failed(next)
            }
            outcome => outcome,
        };
        debug!(
            ok = outcome.is_ok(),
            calls = stats.rule_calls,
            memo_hits = stats.memo_hits,
            cuts = stats.recursion_cuts,
            "parse complete"
        );
        outcome
    }

    fn eval(
        &self,
        ctx: &mut ParseContext<N, T>,
        tokens: &[Token<'_, K>],
        id: OpId,
        start: usize,
        consume: bool,
    ) -> ParseOutcome<T> {
        let Some(operator) = self.graph.get(id) else {
            return ParseOutcome::failed(start);
        };

        match operator {
            Operator::Terminal(tag) => match tokens.get(start) {
                Some(token) if token.tag() == *tag => {
                    let value = self.fire(id, tokens, MatchRange::new(start, 1), Vec::new(), consume);
                    ParseOutcome::matched(start, 1, value)
                }
                _ => ParseOutcome::failed(start),
            },

            Operator::NonTerminal(name) => self.call(ctx, tokens, id, *name, start, consume),

            Operator::EmptyString => {
                if start <= tokens.len() {
                    let value = self.fire(id, tokens, MatchRange::new(start, 0), Vec::new(), consume);
                    ParseOutcome::matched(start, 0, value)
                } else {
                    ParseOutcome::failed(start)
                }
            }

            Operator::Sequence(children) => {
                let mut pos = start;
                let mut values = Vec::with_capacity(children.len());
                for &child in children {
                    match self.eval(ctx, tokens, child, pos, consume) {
                        ParseOutcome::Matched { next, value, .. } => {
                            pos = next;
                            values.push(value);
                        }
                        failed @ ParseOutcome::Failed { .. } => return failed,
                    }
                }
                let range = MatchRange::new(start, pos - start);
                let value = self.fire(id, tokens, range, values, consume);
                ParseOutcome::matched(start, range.length, value)
            }

            Operator::OrderedChoice(children) => {
                for &child in children {
                    if let ParseOutcome::Matched { next, range, value } =
                        self.eval(ctx, tokens, child, start, consume)
                    {
                        let value = self.fire(id, tokens, range, vec![value], consume);
                        return ParseOutcome::Matched { next, range, value };
                    }
                }
                ParseOutcome::failed(start)
            }

            Operator::Optional(child) => match self.eval(ctx, tokens, *child, start, consume) {
                ParseOutcome::Matched { next, range, value } => {
                    let value = self.fire(id, tokens, range, vec![value], consume);
                    ParseOutcome::Matched { next, range, value }
                }
                ParseOutcome::Failed { .. } if start <= tokens.len() => {
                    let value = self.fire(id, tokens, MatchRange::new(start, 0), Vec::new(), consume);
                    ParseOutcome::matched(start, 0, value)
                }
                ParseOutcome::Failed { .. } => ParseOutcome::failed(start),
            },

            Operator::ZeroOrMore(child) => {
                let (end, values) = self.repeat(ctx, tokens, *child, start, consume);
                let range = MatchRange::new(start, end - start);
                let value = self.fire(id, tokens, range, values, consume);
                ParseOutcome::matched(start, range.length, value)
            }

            Operator::OneOrMore(child) => {
                let (end, values) = self.repeat(ctx, tokens, *child, start, consume);
                if values.is_empty() {
                    return ParseOutcome::failed(start);
                }
                let range = MatchRange::new(start, end - start);
                let value = self.fire(id, tokens, range, values, consume);
                ParseOutcome::matched(start, range.length, value)
            }

            Operator::AndPredicate(child) => {
                if self.eval(ctx, tokens, *child, start, false).is_ok() {
                    ParseOutcome::matched(start, 0, T::default())
                } else {
                    ParseOutcome::failed(start)
                }
            }

            Operator::NotPredicate(child) => {
                if self.eval(ctx, tokens, *child, start, false).is_ok() {
                    ParseOutcome::failed(start)
                } else {
                    ParseOutcome::matched(start, 0, T::default())
                }
            }
        }
    }

    /// Match `child` as often as possible from `start`.
    ///
    /// Stops after an iteration that did not advance (keeping its value),
    /// when `child` fails, or at the end of input.
    fn repeat(
        &self,
        ctx: &mut ParseContext<N, T>,
        tokens: &[Token<'_, K>],
        child: OpId,
        start: usize,
        consume: bool,
    ) -> (usize, Vec<T>) {
        let mut pos = start;
        let mut values = Vec::new();
        while let ParseOutcome::Matched { next, value, .. } = self.eval(ctx, tokens, child, pos, consume) {
            values.push(value);
            let advanced = next > pos;
            pos = next;
            if !advanced || pos >= tokens.len() {
                break;
            }
        }
        (pos, values)
    }

    fn call(
        &self,
        ctx: &mut ParseContext<N, T>,
        tokens: &[Token<'_, K>],
        id: OpId,
        name: N,
        start: usize,
        consume: bool,
    ) -> ParseOutcome<T> {
        let inner = if let Some(hit) = ctx.lookup(name, start, consume) {
            trace!(?name, start, consume, "memo hit");
            hit
        } else {
            if !ctx.enter(id, start) {
                trace!(?name, start, "left recursion cut");
                return ParseOutcome::failed(start);
            }
            let inner = match self.bodies.get(&name) {
                Some(&body) => ensure_sufficient_stack(|| self.eval(ctx, tokens, body, start, consume)),
                None => ParseOutcome::failed(start),
            };
            ctx.leave(id, start);
            ctx.record(name, start, consume, inner.clone());
            inner
        };

        match inner {
            ParseOutcome::Matched { next, range, value } => {
                let value = if consume && self.graph.action(id).is_some() {
                    self.fire(id, tokens, range, vec![value], consume)
                } else {
                    value
                };
                ParseOutcome::Matched { next, range, value }
            }
            failed @ ParseOutcome::Failed { .. } => failed,
        }
    }

    /// Run `id`'s action, or produce the default value.
    fn fire(
        &self,
        id: OpId,
        tokens: &[Token<'_, K>],
        range: MatchRange,
        sub_results: Vec<T>,
        consume: bool,
    ) -> T {
        match (self.graph.action(id), self.labels.get(id.index())) {
            (Some(action), Some(label)) if consume => {
                let matched = tokens.get(range.as_range()).unwrap_or_default();
                let render = || self.graph.render(id);
                action(&Match::new(matched, range, label, &render), sub_results)
            }
            _ => T::default(),
        }
    }
}

impl<K: std::fmt::Debug, N: std::fmt::Debug, T> std::fmt::Debug for Grammar<K, N, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("start", &self.start)
            .field("rules", &self.rules)
            .field("graph", &self.graph)
            .finish_non_exhaustive()
    }
}
