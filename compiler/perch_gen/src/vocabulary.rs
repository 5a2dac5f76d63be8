//! Names grammar text may use for the caller's tags and rules.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::GenerateError;

/// Registration table mapping identifiers in grammar text to the caller's
/// token tags and rule names.
///
/// Grammar text refers to `[Tag]` and `Rule` by name; only registered names
/// resolve. Duplicates are reported when a [`Generator`](crate::Generator)
/// is created from the table.
#[derive(Clone, Debug)]
pub struct Vocabulary<K, N> {
    tags: Vec<(String, K)>,
    rules: Vec<(String, N)>,
}

impl<K: Copy + fmt::Debug, N: Copy + fmt::Debug> Vocabulary<K, N> {
    pub fn new() -> Self {
        Vocabulary {
            tags: Vec::new(),
            rules: Vec::new(),
        }
    }

    /// Register every tag and rule under its `Debug` rendering.
    ///
    /// Fits fieldless enums, whose `Debug` output is the variant name.
    pub fn from_debug_names(
        tags: impl IntoIterator<Item = K>,
        rules: impl IntoIterator<Item = N>,
    ) -> Self {
        let mut vocabulary = Self::new();
        for tag in tags {
            vocabulary = vocabulary.tag(format!("{tag:?}"), tag);
        }
        for rule in rules {
            vocabulary = vocabulary.rule(format!("{rule:?}"), rule);
        }
        vocabulary
    }

    #[must_use]
    pub fn tag(mut self, name: impl Into<String>, tag: K) -> Self {
        self.tags.push((name.into(), tag));
        self
    }

    #[must_use]
    pub fn rule(mut self, name: impl Into<String>, rule: N) -> Self {
        self.rules.push((name.into(), rule));
        self
    }

    pub(crate) fn resolve(self) -> Result<Resolver<K, N>, GenerateError> {
        Ok(Resolver {
            tags: index("tag", self.tags)?,
            rules: index("rule", self.rules)?,
        })
    }
}

impl<K: Copy + fmt::Debug, N: Copy + fmt::Debug> Default for Vocabulary<K, N> {
    fn default() -> Self {
        Self::new()
    }
}

fn index<V>(kind: &'static str, entries: Vec<(String, V)>) -> Result<FxHashMap<String, V>, GenerateError> {
    let mut map = FxHashMap::default();
    for (name, value) in entries {
        if map.contains_key(&name) {
            return Err(GenerateError::DuplicateName { kind, name });
        }
        map.insert(name, value);
    }
    Ok(map)
}

/// Checked lookup tables built from a [`Vocabulary`].
#[derive(Debug)]
pub(crate) struct Resolver<K, N> {
    tags: FxHashMap<String, K>,
    rules: FxHashMap<String, N>,
}

impl<K: Copy, N: Copy> Resolver<K, N> {
    pub(crate) fn tag(&self, name: &str) -> Result<K, GenerateError> {
        self.tags
            .get(name)
            .copied()
            .ok_or_else(|| GenerateError::UnknownTag(name.to_owned()))
    }

    pub(crate) fn rule(&self, name: &str) -> Result<N, GenerateError> {
        self.rules
            .get(name)
            .copied()
            .ok_or_else(|| GenerateError::UnknownRule(name.to_owned()))
    }
}
