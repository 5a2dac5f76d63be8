//! Shared fixtures for phase tests.
//!
//! Letters tokenize as runs: `aaa` is one `A` token, `a a a` is three.

use perch::{
    Generator, Grammar, PassthroughNode, PegBuilder, SemanticValue, Token, Tokenizer, Vocabulary,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tag {
    A,
    B,
    C,
    Space,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Name {
    Start,
    NonTerminalA,
    NonTerminalB,
}

/// Value type able to hold passthrough trees.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    #[default]
    Nil,
    Text(String),
    List(Vec<Value>),
    Node(Box<PassthroughNode<Value>>),
}

impl From<PassthroughNode<Value>> for Value {
    fn from(node: PassthroughNode<Value>) -> Self {
        Value::Node(Box::new(node))
    }
}

impl Value {
    pub fn node(&self) -> &PassthroughNode<Value> {
        match self {
            Value::Node(node) => node,
            other => panic!("expected a passthrough node, got {other:?}"),
        }
    }
}

pub fn tokenizer() -> Tokenizer<Tag> {
    Tokenizer::from_patterns([
        (Tag::A, "a+"),
        (Tag::B, "b+"),
        (Tag::C, "c+"),
        (Tag::Space, r"\s+"),
    ])
    .unwrap()
}

/// Tokens of `text` without whitespace. Panics on unrecognized text.
pub fn lex(text: &str) -> Vec<Token<'_, Tag>> {
    let result = tokenizer().tokenize(text);
    assert!(result.succeeded(), "{text:?} has unmatched ranges {:?}", result.unmatched());
    result.without(Tag::Space)
}

pub fn generator() -> Generator<Tag, Name> {
    Generator::new(Vocabulary::from_debug_names(
        [Tag::A, Tag::B, Tag::C],
        [Name::Start, Name::NonTerminalA, Name::NonTerminalB],
    ))
    .unwrap()
}

/// Compile grammar text starting at `Start`, attaching `builder`'s actions.
pub fn compile<T: SemanticValue>(text: &str, builder: PegBuilder<Tag, Name, T>) -> Grammar<Tag, Name, T> {
    generator().compile(text, Name::Start, builder).unwrap()
}
