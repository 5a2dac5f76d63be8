//! Grammar text to Perch rules.
//!
//! ```text
//! Start => Expr ([Plus] Expr)*;
//! Expr  => [Number] | [Open] Start [Close]
//! ```
//!
//! A rule is `Head => Expr`, optionally ended by `;`. Expressions combine
//! `[Tag]` (terminal), `Name` (non-terminal), `[]` (empty string), `( )`
//! grouping, postfix `?` `*` `+` on a terminal, name or group, juxtaposition
//! for sequences, `|` for ordered choice, and `&( )` / `!( )` for lookahead.
//! Whitespace is insignificant.
//!
//! A [`Generator`] reads the text with a grammar built from the same
//! operator algebra, then resolves identifiers against the caller's
//! [`Vocabulary`] and creates the operators through the caller's
//! [`PegBuilder`], so the caller's registered actions attach to them.

mod error;
mod meta;
mod vocabulary;

use std::fmt;

use tracing::debug;

use perch_lexer::Tokenizer;
use perch_peg::{Grammar, OpId, PegBuilder, Rule, RuleName, SemanticValue, TokenTag};

pub use error::GenerateError;
pub use vocabulary::Vocabulary;

use meta::{Expr, MetaRule, MetaToken, MetaValue, RuleText};
use vocabulary::Resolver;

/// Compiles grammar text into rules over the caller's tags and names.
///
/// Holds no per-call state; one generator can compile any number of texts.
pub struct Generator<K, N> {
    tokenizer: Tokenizer<MetaToken>,
    grammar: Grammar<MetaToken, MetaRule, MetaValue>,
    names: Resolver<K, N>,
}

impl<K: TokenTag, N: RuleName> Generator<K, N> {
    /// Create a generator resolving identifiers through `vocabulary`.
    ///
    /// Fails if a tag name or rule name is registered twice.
    pub fn new(vocabulary: Vocabulary<K, N>) -> Result<Self, GenerateError> {
        Ok(Generator {
            tokenizer: meta::meta_tokenizer()?,
            grammar: meta::meta_grammar()?,
            names: vocabulary.resolve()?,
        })
    }

    /// Compile `text`, creating its operators in `builder`.
    ///
    /// Returns the rules in the order the text defines them, ready for
    /// [`PegBuilder::build`].
    #[tracing::instrument(level = "debug", skip_all, fields(len = text.len()))]
    pub fn generate<T: SemanticValue>(
        &self,
        text: &str,
        builder: &mut PegBuilder<K, N, T>,
    ) -> Result<Vec<Rule<N>>, GenerateError> {
        let rules = self.read(text)?;
        let mut lowered = Vec::with_capacity(rules.len());
        for RuleText { head, body } in &rules {
            let head = self.names.rule(head)?;
            let body = self.lower(body, builder)?;
            lowered.push(Rule::new(head, body));
        }
        debug!(rules = lowered.len(), "grammar text compiled");
        Ok(lowered)
    }

    /// Compile `text` and build a grammar starting at `start`.
    pub fn compile<T: SemanticValue>(
        &self,
        text: &str,
        start: N,
        mut builder: PegBuilder<K, N, T>,
    ) -> Result<Grammar<K, N, T>, GenerateError> {
        let rules = self.generate(text, &mut builder)?;
        Ok(builder.build(start, rules)?)
    }

    /// Parse `text` into unresolved rules.
    fn read(&self, text: &str) -> Result<Vec<RuleText>, GenerateError> {
        if text.trim().is_empty() {
            debug!("empty grammar text");
            return Err(GenerateError::EmptyGrammar);
        }

        let scanned = self.tokenizer.tokenize(text);
        if let Some(gap) = scanned.unmatched().first() {
            debug!(?gap, "unrecognized grammar text");
            return Err(GenerateError::Unrecognized {
                offset: gap.start,
                snippet: text.get(gap.as_range()).unwrap_or_default().to_owned(),
            });
        }

        let tokens = scanned.without(MetaToken::WhiteSpace);
        let outcome = self.grammar.parse(&tokens);
        let position = outcome.next_index();
        match outcome.into_value() {
            Some(MetaValue::Rules(rules)) if !rules.is_empty() => Ok(rules),
            _ => {
                let found = tokens
                    .get(position)
                    .map_or_else(|| "end of input".to_owned(), |token| format!("`{}`", token.text()));
                debug!(position, %found, "grammar text does not parse");
                Err(GenerateError::Syntax { position, found })
            }
        }
    }

    fn lower<T: SemanticValue>(
        &self,
        expr: &Expr,
        builder: &mut PegBuilder<K, N, T>,
    ) -> Result<OpId, GenerateError> {
        Ok(match expr {
            Expr::Terminal(name) => builder.terminal(self.names.tag(name)?),
            Expr::NonTerminal(name) => builder.non_terminal(self.names.rule(name)?),
            Expr::Empty => builder.empty_string(),
            Expr::Sequence(items) => {
                let children = self.lower_all(items, builder)?;
                builder.sequence(children)?
            }
            Expr::Choice(items) => {
                let children = self.lower_all(items, builder)?;
                builder.ordered_choice(children)?
            }
            Expr::Optional(inner) => {
                let child = self.lower(inner, builder)?;
                builder.optional(child)
            }
            Expr::ZeroOrMore(inner) => {
                let child = self.lower(inner, builder)?;
                builder.zero_or_more(child)
            }
            Expr::OneOrMore(inner) => {
                let child = self.lower(inner, builder)?;
                builder.one_or_more(child)
            }
            Expr::And(inner) => {
                let child = self.lower(inner, builder)?;
                builder.and_predicate(child)
            }
            Expr::Not(inner) => {
                let child = self.lower(inner, builder)?;
                builder.not_predicate(child)
            }
        })
    }

    fn lower_all<T: SemanticValue>(
        &self,
        items: &[Expr],
        builder: &mut PegBuilder<K, N, T>,
    ) -> Result<Vec<OpId>, GenerateError> {
        items.iter().map(|item| self.lower(item, builder)).collect()
    }
}

impl<K: fmt::Debug, N: fmt::Debug> fmt::Debug for Generator<K, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Generator")
            .field("names", &self.names)
            .finish_non_exhaustive()
    }
}
