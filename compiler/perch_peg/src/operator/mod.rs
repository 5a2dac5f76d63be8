//! Operator arena.
//!
//! Every operator of a grammar lives in one [`RuleGraph`] and is addressed by
//! an [`OpId`]. Composite operators refer to their operands by id, and
//! non-terminals refer to rule bodies only by name, so recursive and mutually
//! recursive rules need no shared mutable references.
//!
//! Each graph stamps the ids it hands out with its own identity. An id can
//! therefore be checked for ownership, and an operator built for one grammar
//! is rejected by another.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::SemanticAction;

static NEXT_GRAPH: AtomicU32 = AtomicU32::new(1);

/// Index of an operator in its [`RuleGraph`].
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct OpId {
    graph: u32,
    index: u32,
}

impl OpId {
    /// Position in the owning graph's node list.
    #[inline]
    pub const fn index(self) -> usize {
        self.index as usize
    }
}

impl fmt::Debug for OpId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "OpId({}@{})", self.index, self.graph)
    }
}

/// The closed set of PEG operators.
///
/// `K` is the token tag type, `N` the rule name type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operator<K, N> {
    /// One token carrying the tag.
    Terminal(K),
    /// A call to the rule named `N`.
    NonTerminal(N),
    /// Matches nothing, anywhere up to and including the end of input.
    EmptyString,
    /// Operands in order; at least two.
    Sequence(Vec<OpId>),
    /// First matching operand wins; at least two.
    OrderedChoice(Vec<OpId>),
    Optional(OpId),
    ZeroOrMore(OpId),
    OneOrMore(OpId),
    /// Succeeds without consuming input if the operand matches.
    AndPredicate(OpId),
    /// Succeeds without consuming input if the operand does not match.
    NotPredicate(OpId),
}

impl<K, N> Operator<K, N> {
    /// Direct operands, in evaluation order.
    pub fn operands(&self) -> &[OpId] {
        match self {
            Operator::Terminal(_) | Operator::NonTerminal(_) | Operator::EmptyString => &[],
            Operator::Sequence(children) | Operator::OrderedChoice(children) => children,
            Operator::Optional(child)
            | Operator::ZeroOrMore(child)
            | Operator::OneOrMore(child)
            | Operator::AndPredicate(child)
            | Operator::NotPredicate(child) => std::slice::from_ref(child),
        }
    }

    /// Human-readable operator kind.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Operator::Terminal(_) => "terminal",
            Operator::NonTerminal(_) => "non-terminal",
            Operator::EmptyString => "empty string",
            Operator::Sequence(_) => "sequence",
            Operator::OrderedChoice(_) => "ordered choice",
            Operator::Optional(_) => "optional",
            Operator::ZeroOrMore(_) => "zero-or-more",
            Operator::OneOrMore(_) => "one-or-more",
            Operator::AndPredicate(_) => "and-predicate",
            Operator::NotPredicate(_) => "not-predicate",
        }
    }
}

/// Arena owning the operators of one grammar and their semantic actions.
pub struct RuleGraph<K, N, T> {
    id: u32,
    nodes: Vec<Operator<K, N>>,
    actions: Vec<Option<SemanticAction<K, T>>>,
}

impl<K, N, T> RuleGraph<K, N, T> {
    /// Create an empty graph with a fresh identity.
    pub fn new() -> Self {
        RuleGraph {
            id: NEXT_GRAPH.fetch_add(1, Ordering::Relaxed),
            nodes: Vec::new(),
            actions: Vec::new(),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Ids of every operator, in creation order.
    #[allow(clippy::cast_possible_truncation, reason = "indices were u32 when handed out")]
    pub fn ids(&self) -> impl Iterator<Item = OpId> + '_ {
        let graph = self.id;
        (0..self.nodes.len()).map(move |index| OpId {
            graph,
            index: index as u32,
        })
    }

    /// `true` if `id` was handed out by this graph.
    #[inline]
    pub fn owns(&self, id: OpId) -> bool {
        id.graph == self.id && id.index() < self.nodes.len()
    }

    /// The operator behind `id`, if this graph owns it.
    #[inline]
    pub fn get(&self, id: OpId) -> Option<&Operator<K, N>> {
        if id.graph == self.id {
            self.nodes.get(id.index())
        } else {
            None
        }
    }

    /// The semantic action attached to `id`, if any.
    #[inline]
    pub fn action(&self, id: OpId) -> Option<&SemanticAction<K, T>> {
        if id.graph == self.id {
            self.actions.get(id.index()).and_then(Option::as_ref)
        } else {
            None
        }
    }

    #[allow(clippy::cast_possible_truncation, reason = "grammars stay far below u32::MAX operators")]
    pub(crate) fn push(
        &mut self,
        operator: Operator<K, N>,
        action: Option<SemanticAction<K, T>>,
    ) -> OpId {
        let index = self.nodes.len() as u32;
        self.nodes.push(operator);
        self.actions.push(action);
        OpId {
            graph: self.id,
            index,
        }
    }

    /// Every operator reachable from `root`, `root` first, each listed once.
    ///
    /// Operands shared between several operators are visited once, so the
    /// walk is linear in the size of the graph.
    ///
    /// Returns the first id not owned by this graph as the error.
    pub fn subtree(&self, root: OpId) -> Result<Vec<OpId>, OpId> {
        let mut visited = vec![false; self.nodes.len()];
        let mut order = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            let Some(operator) = self.get(id) else {
                return Err(id);
            };
            if std::mem::replace(&mut visited[id.index()], true) {
                continue;
            }
            order.push(id);
            stack.extend(operator.operands().iter().rev());
        }
        Ok(order)
    }
}

impl<K: fmt::Debug, N: fmt::Debug, T> RuleGraph<K, N, T> {
    /// Rule names referenced anywhere under `root`, in first-seen order.
    pub fn non_terminal_names(&self, root: OpId) -> Result<Vec<N>, OpId>
    where
        N: Copy + PartialEq,
    {
        let mut names = Vec::new();
        for id in self.subtree(root)? {
            if let Some(Operator::NonTerminal(name)) = self.get(id) {
                if !names.contains(name) {
                    names.push(*name);
                }
            }
        }
        Ok(names)
    }

    /// Grammar-text rendering of the operator behind `id`.
    ///
    /// ```text
    /// [A]  Name  []  [A] [B]  ([A] | [B])  ([A])?  ([A])*  ([A])+  &([A])  !([A])
    /// ```
    pub fn render(&self, id: OpId) -> String {
        let mut out = String::new();
        self.render_into(id, &mut out);
        out
    }

    fn render_into(&self, id: OpId, out: &mut String) {
        use fmt::Write;

        let Some(operator) = self.get(id) else {
            out.push_str("<foreign>");
            return;
        };
        // Writing to a String cannot fail.
        let _ = match operator {
            Operator::Terminal(tag) => write!(out, "[{tag:?}]"),
            Operator::NonTerminal(name) => write!(out, "{name:?}"),
            Operator::EmptyString => write!(out, "[]"),
            Operator::Sequence(children) => {
                for (i, &child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push(' ');
                    }
                    self.render_into(child, out);
                }
                Ok(())
            }
            Operator::OrderedChoice(children) => {
                out.push('(');
                for (i, &child) in children.iter().enumerate() {
                    if i > 0 {
                        out.push_str(" | ");
                    }
                    self.render_into(child, out);
                }
                out.push(')');
                Ok(())
            }
            Operator::Optional(child) => self.render_wrapped("(", *child, ")?", out),
            Operator::ZeroOrMore(child) => self.render_wrapped("(", *child, ")*", out),
            Operator::OneOrMore(child) => self.render_wrapped("(", *child, ")+", out),
            Operator::AndPredicate(child) => self.render_wrapped("&(", *child, ")", out),
            Operator::NotPredicate(child) => self.render_wrapped("!(", *child, ")", out),
        };
    }

    fn render_wrapped(&self, open: &str, child: OpId, close: &str, out: &mut String) -> fmt::Result {
        out.push_str(open);
        self.render_into(child, out);
        out.push_str(close);
        Ok(())
    }
}

impl<K, N, T> Default for RuleGraph<K, N, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, N: fmt::Debug, T> fmt::Debug for RuleGraph<K, N, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleGraph")
            .field("id", &self.id)
            .field("nodes", &self.nodes)
            .finish_non_exhaustive()
    }
}
