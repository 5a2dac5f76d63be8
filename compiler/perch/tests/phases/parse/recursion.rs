//! Left recursion, deep recursion and memoization.

use pretty_assertions::assert_eq;

use perch::{Generator, ParseContext, PegBuilder, Vocabulary};

use crate::common::{compile, lex, Name, Tag};

#[test]
fn self_referencing_rule_terminates() {
    let grammar = compile::<()>(
        "Start => NonTerminalA; NonTerminalA => NonTerminalA;",
        PegBuilder::new(),
    );
    let mut ctx = ParseContext::new();

    let outcome = grammar.parse_with(&mut ctx, &lex(""));
    assert!(!outcome.is_ok());
    assert_eq!(ctx.stats().recursion_cuts, 1);
}

#[test]
fn mutual_recursion_falls_through_to_later_alternatives() {
    let grammar = compile::<()>(
        "Start => NonTerminalA;
         NonTerminalA => NonTerminalB | [A];
         NonTerminalB => NonTerminalA [B];",
        PegBuilder::new(),
    );
    let mut ctx = ParseContext::new();

    assert!(grammar.parse_with(&mut ctx, &lex("a")).is_ok());
    assert!(ctx.stats().recursion_cuts >= 1);
    assert!(!grammar.parse_with(&mut ctx, &lex("b")).is_ok());
}

#[test]
fn deep_right_recursion_does_not_overflow() {
    let grammar = compile::<()>("Start => [A] Start | []", PegBuilder::new());
    let input = "a ".repeat(20_000);
    let tokens = lex(&input);
    assert_eq!(tokens.len(), 20_000);

    let outcome = grammar.parse(&tokens);
    assert!(outcome.is_ok());
    assert_eq!(outcome.next_index(), 20_000);
}

/// `Level{i} => Level{i+1} [A] | Level{i+1} [B]` for `depth` levels.
///
/// Input `c b b ...` fails the first alternative of every level, so each
/// level retries its callee at the same position.
fn shared_prefix_grammar(depth: usize) -> (String, Vocabulary<Tag, usize>) {
    let mut text = String::new();
    let mut vocabulary = Vocabulary::new().tag("A", Tag::A).tag("B", Tag::B).tag("C", Tag::C);
    for level in 0..depth {
        let next = level + 1;
        text.push_str(&format!(
            "Level{level} => Level{next} [A] | Level{next} [B];\n"
        ));
        vocabulary = vocabulary.rule(format!("Level{level}"), level);
    }
    text.push_str(&format!("Level{depth} => [C];"));
    (text, vocabulary.rule(format!("Level{depth}"), depth))
}

#[test]
fn memoization_keeps_shared_prefixes_linear() {
    let depth = 20;
    let (text, vocabulary) = shared_prefix_grammar(depth);
    let grammar = Generator::new(vocabulary)
        .unwrap()
        .compile(&text, 0, PegBuilder::<Tag, usize, ()>::new())
        .unwrap();
    let input = format!("c{}", " b".repeat(depth));
    let mut ctx = ParseContext::new();

    assert!(grammar.parse_with(&mut ctx, &lex(&input)).is_ok());
    let stats = ctx.stats();
    assert_eq!(stats.memo_hits, depth);
    assert!(stats.rule_calls <= 2 * depth + 1, "{stats:?}");
}

#[test]
fn memo_is_cleared_between_parses() {
    let grammar = compile::<()>("Start => NonTerminalA [B]*; NonTerminalA => [A]", PegBuilder::new());
    let mut ctx = ParseContext::<Name, ()>::new();

    assert!(grammar.parse_with(&mut ctx, &lex("a b b")).is_ok());
    let first = ctx.stats();
    assert!(!grammar.parse_with(&mut ctx, &lex("b")).is_ok());
    assert!(grammar.parse_with(&mut ctx, &lex("a b b")).is_ok());
    assert_eq!(ctx.stats(), first);
}
