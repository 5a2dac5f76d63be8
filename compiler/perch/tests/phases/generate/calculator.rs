//! Arithmetic evaluated entirely by semantic actions on a compiled grammar.

use pretty_assertions::assert_eq;

use perch::{action, Generator, Grammar, Match, PegBuilder, Tokenizer, Vocabulary};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Lexeme {
    Num,
    Plus,
    Minus,
    Times,
    Divide,
    Open,
    Close,
    Space,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
enum Rule {
    Expr,
    AddOp,
    Term,
    MulOp,
    Factor,
}

#[derive(Clone, Debug, Default, PartialEq)]
enum Calc {
    #[default]
    Nil,
    Num(i64),
    Op(char),
    List(Vec<Calc>),
}

const GRAMMAR: &str = "
    Expr   => Term (AddOp Term)*;
    AddOp  => [Plus] | [Minus];
    Term   => Factor (MulOp Factor)*;
    MulOp  => [Times] | [Divide];
    Factor => [Num] | [Open] Expr [Close] | [Minus] Factor;
";

fn number(value: &Calc) -> i64 {
    match value {
        Calc::Num(n) => *n,
        other => panic!("expected a number, got {other:?}"),
    }
}

/// Fold `first (op operand)*` left to right.
fn fold(mut values: Vec<Calc>) -> Calc {
    let Some(Calc::List(body)) = values.pop() else {
        return Calc::Nil;
    };
    let [first, Calc::List(rest)] = body.as_slice() else {
        panic!("unexpected body {body:?}");
    };
    let total = rest.iter().fold(number(first), |acc, pair| match pair {
        Calc::List(pair) => match pair.as_slice() {
            [Calc::Op('+'), rhs] => acc + number(rhs),
            [Calc::Op('-'), rhs] => acc - number(rhs),
            [Calc::Op('*'), rhs] => acc * number(rhs),
            [Calc::Op('/'), rhs] => acc / number(rhs),
            other => panic!("unexpected operation {other:?}"),
        },
        other => panic!("unexpected operation {other:?}"),
    });
    Calc::Num(total)
}

fn factor(mut values: Vec<Calc>) -> Calc {
    match values.pop() {
        Some(Calc::List(items)) => match items.as_slice() {
            [Calc::Nil, inner, Calc::Nil] => inner.clone(),
            [Calc::Op('-'), inner] => Calc::Num(-number(inner)),
            other => panic!("unexpected factor {other:?}"),
        },
        Some(value) => value,
        None => Calc::Nil,
    }
}

fn calculator() -> (Tokenizer<Lexeme>, Grammar<Lexeme, Rule, Calc>) {
    let tokenizer = Tokenizer::from_patterns([
        (Lexeme::Num, "[0-9]+"),
        (Lexeme::Plus, r"\+"),
        (Lexeme::Minus, "-"),
        (Lexeme::Times, r"\*"),
        (Lexeme::Divide, "/"),
        (Lexeme::Open, r"\("),
        (Lexeme::Close, r"\)"),
        (Lexeme::Space, r"\s+"),
    ])
    .unwrap();

    let mut builder = PegBuilder::<Lexeme, Rule, Calc>::new();
    let actions = builder.actions_mut();
    actions
        .set_terminal_action(
            Lexeme::Num,
            action(|m: &Match<'_, '_, Lexeme>, _| Calc::Num(m.first_text().parse().unwrap())),
        )
        .unwrap();
    for op in [Lexeme::Plus, Lexeme::Minus, Lexeme::Times, Lexeme::Divide] {
        actions
            .set_terminal_action(
                op,
                action(|m: &Match<'_, '_, Lexeme>, _| {
                    Calc::Op(m.first_text().chars().next().unwrap())
                }),
            )
            .unwrap();
    }
    actions.set_sequence_action(action(|_: &Match<'_, '_, Lexeme>, values| Calc::List(values)));
    actions.set_zero_or_more_action(action(|_: &Match<'_, '_, Lexeme>, values| Calc::List(values)));
    actions.set_ordered_choice_action(action(|_: &Match<'_, '_, Lexeme>, mut values: Vec<Calc>| {
        values.pop().unwrap_or_default()
    }));
    actions
        .set_non_terminal_action(Rule::Expr, action(|_: &Match<'_, '_, Lexeme>, values| fold(values)))
        .unwrap();
    actions
        .set_non_terminal_action(Rule::Term, action(|_: &Match<'_, '_, Lexeme>, values| fold(values)))
        .unwrap();
    actions
        .set_non_terminal_action(Rule::Factor, action(|_: &Match<'_, '_, Lexeme>, values| factor(values)))
        .unwrap();

    let vocabulary = Vocabulary::from_debug_names(
        [
            Lexeme::Num,
            Lexeme::Plus,
            Lexeme::Minus,
            Lexeme::Times,
            Lexeme::Divide,
            Lexeme::Open,
            Lexeme::Close,
        ],
        [Rule::Expr, Rule::AddOp, Rule::Term, Rule::MulOp, Rule::Factor],
    );
    let grammar = Generator::new(vocabulary)
        .unwrap()
        .compile(GRAMMAR, Rule::Expr, builder)
        .unwrap();
    (tokenizer, grammar)
}

fn evaluate(input: &str) -> Option<i64> {
    let (tokenizer, grammar) = calculator();
    let result = tokenizer.tokenize(input);
    assert!(result.succeeded(), "{input:?}");
    let tokens = result.without(Lexeme::Space);
    match grammar.parse(&tokens).into_value()? {
        Calc::Num(n) => Some(n),
        other => panic!("expected a number, got {other:?}"),
    }
}

#[test]
fn precedence_and_grouping() {
    assert_eq!(evaluate("1 + 2 * 3"), Some(7));
    assert_eq!(evaluate("(1 + 2) * 3"), Some(9));
    assert_eq!(evaluate("42"), Some(42));
}

#[test]
fn operators_associate_to_the_left() {
    assert_eq!(evaluate("10 - 4 - 3"), Some(3));
    assert_eq!(evaluate("100 / 10 / 5"), Some(2));
}

#[test]
fn unary_minus() {
    assert_eq!(evaluate("-(2 + 3) * 4"), Some(-20));
    assert_eq!(evaluate("3 - -2"), Some(5));
}

#[test]
fn malformed_expressions_fail() {
    assert_eq!(evaluate("2 *"), None);
    assert_eq!(evaluate("1 + + 2"), None);
    assert_eq!(evaluate("(1 + 2"), None);
    assert_eq!(evaluate(""), None);
}

#[test]
fn grammar_text_round_trips() {
    let (_, grammar) = calculator();
    assert_eq!(
        grammar.to_text(),
        "Expr => Term (AddOp Term)*;\n\
         AddOp => ([Plus] | [Minus]);\n\
         Term => Factor (MulOp Factor)*;\n\
         MulOp => ([Times] | [Divide]);\n\
         Factor => ([Num] | [Open] Expr [Close] | [Minus] Factor);"
    );
}
