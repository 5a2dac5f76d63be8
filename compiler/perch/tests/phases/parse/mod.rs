//! Parsing phase: operator semantics, recursion and actions.

mod operators;
mod recursion;
