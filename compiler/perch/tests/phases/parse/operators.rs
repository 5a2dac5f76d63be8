//! Operator semantics over compiled grammars.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;

use perch::{action, Match, MatchRange, PegBuilder};

use crate::common::{compile, lex, Name, Tag};

fn accepts(grammar_text: &str, input: &str) -> bool {
    compile::<()>(grammar_text, PegBuilder::new())
        .parse(&lex(input))
        .is_ok()
}

#[test]
fn sequence_stops_at_the_first_failing_operand() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = PegBuilder::<Tag, Name, ()>::new();
    let counter = Arc::clone(&calls);
    builder
        .actions_mut()
        .set_sequence_action(action(move |_: &Match<'_, '_, Tag>, _| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
    let grammar = compile("Start => [A] [B]", builder);

    let outcome = grammar.parse(&lex("a a a"));
    assert!(!outcome.is_ok());
    assert_eq!(outcome.next_index(), 1);
    assert_eq!(calls.load(Ordering::Relaxed), 0);

    assert!(grammar.parse(&lex("a b")).is_ok());
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn choice_takes_the_first_alternative_that_matches() {
    let mut builder = PegBuilder::<Tag, Name, String>::new();
    builder.actions_mut().set_ordered_choice_action(action(
        |m: &Match<'_, '_, Tag>, values: Vec<String>| format!("{}:{}", m.peg(), values.concat()),
    ));
    builder.actions_mut().set_sequence_action(action(|_: &Match<'_, '_, Tag>, _| "seq".to_owned()));
    builder
        .actions_mut()
        .set_terminal_action(Tag::B, action(|m: &Match<'_, '_, Tag>, _| m.text()))
        .unwrap();
    let grammar = compile("Start => [A] [A] | [B] | [B] [B]", builder);

    let outcome = grammar.parse(&lex("bbb"));
    assert_eq!(outcome.range(), Some(MatchRange::new(0, 1)));
    assert_eq!(
        outcome.into_value().unwrap(),
        "([A] [A] | [B] | [B] [B]):bbb"
    );
}

#[test]
fn optional_matches_empty_input_and_one_token() {
    assert!(accepts("Start => [A]?", ""));
    assert!(accepts("Start => [A]?", "aaaa"));
    assert!(!accepts("Start => [A]?", "a a"));
}

#[test]
fn repetition_counts() {
    assert!(accepts("Start => [A]*", ""));
    assert!(accepts("Start => [A]*", "a a a"));
    assert!(!accepts("Start => [A]+", ""));
    assert!(accepts("Start => [A]+", "a"));
    assert!(accepts("Start => ([A] [B])*", "a b a b"));
    assert!(!accepts("Start => ([A] [B])*", "a b a"));
}

#[test]
fn repetition_of_the_empty_string_terminates() {
    let mut builder = PegBuilder::<Tag, Name, usize>::new();
    builder
        .actions_mut()
        .set_zero_or_more_action(action(|_: &Match<'_, '_, Tag>, values: Vec<usize>| values.len()));
    let grammar = compile("Start => []*", builder);

    assert_eq!(grammar.parse(&lex("")).into_value(), Some(1));
}

#[test]
fn and_predicate_looks_ahead_without_consuming() {
    assert!(accepts("Start => &([A] [A]) [A]+", "a a"));
    assert!(!accepts("Start => &([A] [A]) [A]+", "a"));
    assert!(!accepts("Start => &([A])", "a"));
    assert!(accepts("Start => &([A]) [A]", "a"));
}

#[test]
fn not_predicate_rejects_what_it_matches() {
    assert!(accepts("Start => !([B] [B]) [B]*", "b"));
    assert!(!accepts("Start => !([B] [B]) [B]*", "b b"));
    assert!(accepts("Start => !([A])", ""));
}

#[test]
fn predicates_never_fire_actions() {
    let calls = Arc::new(AtomicUsize::new(0));
    let mut builder = PegBuilder::<Tag, Name, ()>::new();
    let counter = Arc::clone(&calls);
    builder
        .actions_mut()
        .set_terminal_action(
            Tag::A,
            action(move |_: &Match<'_, '_, Tag>, _| {
                counter.fetch_add(1, Ordering::Relaxed);
            }),
        )
        .unwrap();
    let grammar = compile("Start => &([A]) !([A] [A]) [A]", builder);

    assert!(grammar.parse(&lex("a")).is_ok());
    assert_eq!(calls.load(Ordering::Relaxed), 1);

    assert!(!grammar.parse(&lex("a a")).is_ok());
    assert_eq!(calls.load(Ordering::Relaxed), 1);
}

#[test]
fn empty_string_alternative() {
    assert!(accepts("Start => [A] | []", ""));
    assert!(accepts("Start => [A] | []", "a"));
    assert!(accepts("Start => []", ""));
    assert!(!accepts("Start => []", "a"));
}

#[test]
fn partial_match_fails_at_the_first_unconsumed_token() {
    let grammar = compile::<()>("Start => [A] NonTerminalB; NonTerminalB => [B]", PegBuilder::new());
    let outcome = grammar.parse(&lex("a b c"));
    assert!(!outcome.is_ok());
    assert_eq!(outcome.next_index(), 2);
}
