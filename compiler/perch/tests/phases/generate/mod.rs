//! Generation phase: grammar text compiled into working grammars.

mod calculator;

use pretty_assertions::assert_eq;

use perch::{GenerateError, PegBuilder};

use crate::common::{compile, generator, lex, Name, Tag};

#[test]
fn compiled_grammar_renders_back_to_its_text() {
    let text = "Start => ((NonTerminalA | NonTerminalB))+;\nNonTerminalA => [A] ([C])?;\nNonTerminalB => !([A]) [B];";
    let grammar = compile::<()>(text, PegBuilder::new());
    assert_eq!(grammar.to_text(), text);
    assert!(grammar.parse(&lex("a c b a")).is_ok());
    assert!(!grammar.parse(&lex("c")).is_ok());
}

#[test]
fn one_generator_compiles_many_grammars() {
    let generator = generator();
    for text in ["Start => [A]", "Start => [B]*", "Start => NonTerminalA; NonTerminalA => []"] {
        assert!(
            generator.compile(text, Name::Start, PegBuilder::<Tag, Name, ()>::new()).is_ok(),
            "{text}"
        );
    }
}

#[test]
fn errors_describe_the_problem() {
    let generator = generator();
    let compile = |text: &str| {
        generator
            .compile(text, Name::Start, PegBuilder::<Tag, Name, ()>::new())
            .unwrap_err()
    };

    assert_eq!(compile("Start => [Z]").to_string(), "unknown token tag `Z`");
    assert!(matches!(compile("Start => [A] |"), GenerateError::Syntax { .. }));
    assert!(matches!(compile("NonTerminalA => [A]"), GenerateError::Grammar(_)));
}
