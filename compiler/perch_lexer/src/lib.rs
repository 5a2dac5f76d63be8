//! Tokenizer for Perch grammars.
//!
//! Turns text into a sequence of tagged [`Token`]s using an ordered list of
//! regular-expression [`TokenDefinition`]s. Characters no definition covers
//! are reported as unmatched [`MatchRange`]s instead of aborting, so callers
//! still see every token recognised up to (and beyond) a gap.
//!
//! The tag type `K` is chosen by the caller, normally a fieldless `enum`.

mod error;
mod range;
mod token;
mod tokenizer;

pub use error::LexerError;
pub use range::MatchRange;
pub use token::{Token, TokenDefinition};
pub use tokenizer::{TokenizationResult, Tokenizer};
