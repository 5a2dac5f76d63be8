//! The grammar that reads grammar text.
//!
//! Built directly from the operator algebra. It has no left recursion, so
//! the evaluator's left-recursion guard never cuts a derivation:
//!
//! ```text
//! Start      => Rule+
//! Rule       => [Identifier] [Arrow] Operator [SemiColon]?
//! Operator   => Choice | Sequence | Unary
//! Choice     => (Sequence | Unary) ([Choice] (Sequence | Unary))+
//! Sequence   => Unary Unary+
//! Unary      => Optional | ZeroOrMore | OneOrMore | Atom
//! Optional   => Atom [Optional]
//! ZeroOrMore => Atom [ZeroOrMore]
//! OneOrMore  => Atom [OneOrMore]
//! Atom       => Terminal | Empty | NonTerminal | Brackets | And | Not
//! Terminal   => [OpenSquare] [Identifier] [CloseSquare]
//! Empty      => [OpenSquare] [CloseSquare]
//! NonTerminal=> [Identifier] !([Arrow])
//! Brackets   => [OpenRound] Operator [CloseRound]
//! And        => [And] [OpenRound] Operator [CloseRound]
//! Not        => [Not] [OpenRound] Operator [CloseRound]
//! ```
//!
//! Inner operators use the generic passthrough, so every value reaches the
//! enclosing rule's action; each rule's action distils its part of the tree
//! into an [`Expr`].

use perch_lexer::{LexerError, Tokenizer};
use perch_peg::{
    action, Grammar, GrammarError, Match, PassthroughNode, PegBuilder, SemanticAction,
    SemanticActions,
};

/// Tokens of grammar text.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum MetaToken {
    Identifier,
    OpenSquare,
    CloseSquare,
    OpenRound,
    CloseRound,
    WhiteSpace,
    And,
    Not,
    OneOrMore,
    ZeroOrMore,
    Optional,
    Choice,
    Arrow,
    SemiColon,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub(crate) enum MetaRule {
    Start,
    Rule,
    Operator,
    Choice,
    Sequence,
    Unary,
    Optional,
    ZeroOrMore,
    OneOrMore,
    Atom,
    Terminal,
    Empty,
    NonTerminal,
    Brackets,
    And,
    Not,
}

/// Grammar expression with unresolved identifiers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Expr {
    Terminal(String),
    NonTerminal(String),
    Empty,
    Sequence(Vec<Expr>),
    Choice(Vec<Expr>),
    Optional(Box<Expr>),
    ZeroOrMore(Box<Expr>),
    OneOrMore(Box<Expr>),
    And(Box<Expr>),
    Not(Box<Expr>),
}

/// One `Head => Expr` definition.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct RuleText {
    pub head: String,
    pub body: Expr,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) enum MetaValue {
    #[default]
    Nil,
    Node(Box<PassthroughNode<MetaValue>>),
    Expr(Expr),
    Rule(RuleText),
    Rules(Vec<RuleText>),
}

impl From<PassthroughNode<MetaValue>> for MetaValue {
    fn from(node: PassthroughNode<MetaValue>) -> Self {
        MetaValue::Node(Box::new(node))
    }
}

/// Depth-first collection of the expressions and rules under `values`.
fn collect(values: Vec<MetaValue>, out: &mut Vec<MetaValue>) {
    for value in values {
        match value {
            MetaValue::Nil => {}
            MetaValue::Node(node) => collect(node.sub_results, out),
            found @ (MetaValue::Expr(_) | MetaValue::Rule(_) | MetaValue::Rules(_)) => out.push(found),
        }
    }
}

fn exprs(values: Vec<MetaValue>) -> Vec<Expr> {
    let mut found = Vec::new();
    collect(values, &mut found);
    found
        .into_iter()
        .filter_map(|value| match value {
            MetaValue::Expr(expr) => Some(expr),
            _ => None,
        })
        .collect()
}

type MetaAction = SemanticAction<MetaToken, MetaValue>;

/// Action building an expression from the operand expressions.
fn build(make: fn(Vec<Expr>) -> Option<Expr>) -> MetaAction {
    action(move |_: &Match<'_, '_, MetaToken>, values| {
        make(exprs(values)).map_or(MetaValue::Nil, MetaValue::Expr)
    })
}

fn only(mut exprs: Vec<Expr>) -> Option<Expr> {
    if exprs.len() == 1 {
        exprs.pop()
    } else {
        None
    }
}

fn wrap(make: fn(Box<Expr>) -> Expr) -> MetaAction {
    action(move |_: &Match<'_, '_, MetaToken>, values| {
        only(exprs(values)).map_or(MetaValue::Nil, |inner| MetaValue::Expr(make(Box::new(inner))))
    })
}

/// Text of the first token tagged `Identifier` in the match.
fn identifier(m: &Match<'_, '_, MetaToken>) -> Option<String> {
    m.tokens()
        .iter()
        .find(|token| token.tag() == MetaToken::Identifier)
        .map(|token| token.text().to_owned())
}

fn meta_actions() -> Result<SemanticActions<MetaToken, MetaRule, MetaValue>, GrammarError> {
    let mut actions = SemanticActions::new();
    actions.set_generic_passthrough();

    actions.set_non_terminal_action(
        MetaRule::Start,
        action(|_: &Match<'_, '_, MetaToken>, values| {
            let mut found = Vec::new();
            collect(values, &mut found);
            let rules = found
                .into_iter()
                .filter_map(|value| match value {
                    MetaValue::Rule(rule) => Some(rule),
                    _ => None,
                })
                .collect();
            MetaValue::Rules(rules)
        }),
    )?;
    actions.set_non_terminal_action(
        MetaRule::Rule,
        action(|m: &Match<'_, '_, MetaToken>, values| {
            match (identifier(m), only(exprs(values))) {
                (Some(head), Some(body)) => MetaValue::Rule(RuleText { head, body }),
                _ => MetaValue::Nil,
            }
        }),
    )?;
    for passthrough in [MetaRule::Operator, MetaRule::Unary, MetaRule::Atom, MetaRule::Brackets] {
        actions.set_non_terminal_action(passthrough, build(only))?;
    }
    actions.set_non_terminal_action(MetaRule::Choice, build(|exprs| Some(Expr::Choice(exprs))))?;
    actions.set_non_terminal_action(MetaRule::Sequence, build(|exprs| Some(Expr::Sequence(exprs))))?;
    actions.set_non_terminal_action(MetaRule::Optional, wrap(Expr::Optional))?;
    actions.set_non_terminal_action(MetaRule::ZeroOrMore, wrap(Expr::ZeroOrMore))?;
    actions.set_non_terminal_action(MetaRule::OneOrMore, wrap(Expr::OneOrMore))?;
    actions.set_non_terminal_action(MetaRule::And, wrap(Expr::And))?;
    actions.set_non_terminal_action(MetaRule::Not, wrap(Expr::Not))?;
    actions.set_non_terminal_action(
        MetaRule::Terminal,
        action(|m: &Match<'_, '_, MetaToken>, _| {
            identifier(m).map_or(MetaValue::Nil, |name| MetaValue::Expr(Expr::Terminal(name)))
        }),
    )?;
    actions.set_non_terminal_action(
        MetaRule::Empty,
        action(|_: &Match<'_, '_, MetaToken>, _| MetaValue::Expr(Expr::Empty)),
    )?;
    actions.set_non_terminal_action(
        MetaRule::NonTerminal,
        action(|m: &Match<'_, '_, MetaToken>, _| {
            MetaValue::Expr(Expr::NonTerminal(m.first_text().to_owned()))
        }),
    )?;
    Ok(actions)
}

pub(crate) fn meta_tokenizer() -> Result<Tokenizer<MetaToken>, LexerError> {
    Tokenizer::from_patterns([
        (MetaToken::Identifier, r"[a-zA-Z_][a-zA-Z0-9_]*"),
        (MetaToken::OpenSquare, r"\["),
        (MetaToken::CloseSquare, r"\]"),
        (MetaToken::OpenRound, r"\("),
        (MetaToken::CloseRound, r"\)"),
        (MetaToken::WhiteSpace, r"\s+"),
        (MetaToken::And, "&"),
        (MetaToken::Not, "!"),
        (MetaToken::OneOrMore, r"\+"),
        (MetaToken::ZeroOrMore, r"\*"),
        (MetaToken::Optional, r"\?"),
        (MetaToken::Choice, r"\|"),
        (MetaToken::Arrow, "=>"),
        (MetaToken::SemiColon, ";"),
    ])
}

pub(crate) fn meta_grammar() -> Result<Grammar<MetaToken, MetaRule, MetaValue>, GrammarError> {
    use MetaRule as R;
    use MetaToken as T;

    let mut peg = PegBuilder::with_actions(meta_actions()?);

    let rule = peg.non_terminal(R::Rule);
    let start = peg.one_or_more(rule);

    let head = peg.terminal(T::Identifier);
    let arrow = peg.terminal(T::Arrow);
    let operator = peg.non_terminal(R::Operator);
    let semicolon = peg.terminal(T::SemiColon);
    let end = peg.optional(semicolon);
    let rule_body = peg.sequence([head, arrow, operator, end])?;

    let choice = peg.non_terminal(R::Choice);
    let sequence = peg.non_terminal(R::Sequence);
    let unary = peg.non_terminal(R::Unary);
    let operator_body = peg.ordered_choice([choice, sequence, unary])?;

    let operand = peg.ordered_choice([sequence, unary])?;
    let bar = peg.terminal(T::Choice);
    let alternative = peg.sequence([bar, operand])?;
    let alternatives = peg.one_or_more(alternative);
    let choice_body = peg.sequence([operand, alternatives])?;

    let more_unary = peg.one_or_more(unary);
    let sequence_body = peg.sequence([unary, more_unary])?;

    let optional = peg.non_terminal(R::Optional);
    let zero_or_more = peg.non_terminal(R::ZeroOrMore);
    let one_or_more = peg.non_terminal(R::OneOrMore);
    let atom = peg.non_terminal(R::Atom);
    let unary_body = peg.ordered_choice([optional, zero_or_more, one_or_more, atom])?;

    let question = peg.terminal(T::Optional);
    let optional_body = peg.sequence([atom, question])?;
    let star = peg.terminal(T::ZeroOrMore);
    let zero_or_more_body = peg.sequence([atom, star])?;
    let plus = peg.terminal(T::OneOrMore);
    let one_or_more_body = peg.sequence([atom, plus])?;

    let terminal = peg.non_terminal(R::Terminal);
    let empty = peg.non_terminal(R::Empty);
    let non_terminal = peg.non_terminal(R::NonTerminal);
    let brackets = peg.non_terminal(R::Brackets);
    let and = peg.non_terminal(R::And);
    let not = peg.non_terminal(R::Not);
    let atom_body = peg.ordered_choice([terminal, empty, non_terminal, brackets, and, not])?;

    let open_square = peg.terminal(T::OpenSquare);
    let name = peg.terminal(T::Identifier);
    let close_square = peg.terminal(T::CloseSquare);
    let terminal_body = peg.sequence([open_square, name, close_square])?;
    let empty_body = peg.sequence([open_square, close_square])?;

    let arrow_ahead = peg.not_predicate(arrow);
    let non_terminal_body = peg.sequence([name, arrow_ahead])?;

    let open_round = peg.terminal(T::OpenRound);
    let close_round = peg.terminal(T::CloseRound);
    let brackets_body = peg.sequence([open_round, operator, close_round])?;
    let ampersand = peg.terminal(T::And);
    let and_body = peg.sequence([ampersand, open_round, operator, close_round])?;
    let bang = peg.terminal(T::Not);
    let not_body = peg.sequence([bang, open_round, operator, close_round])?;

    let rules = [
        peg.rule(R::Start, start),
        peg.rule(R::Rule, rule_body),
        peg.rule(R::Operator, operator_body),
        peg.rule(R::Choice, choice_body),
        peg.rule(R::Sequence, sequence_body),
        peg.rule(R::Unary, unary_body),
        peg.rule(R::Optional, optional_body),
        peg.rule(R::ZeroOrMore, zero_or_more_body),
        peg.rule(R::OneOrMore, one_or_more_body),
        peg.rule(R::Atom, atom_body),
        peg.rule(R::Terminal, terminal_body),
        peg.rule(R::Empty, empty_body),
        peg.rule(R::NonTerminal, non_terminal_body),
        peg.rule(R::Brackets, brackets_body),
        peg.rule(R::And, and_body),
        peg.rule(R::Not, not_body),
    ];
    peg.build(R::Start, rules)
}
