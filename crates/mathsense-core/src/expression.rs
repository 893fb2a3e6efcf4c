//! Tree model of a parsed math expression.
//!
//! Expressions are built once from LaTeX or MathML and never mutated. A parse
//! failure never escapes: the model degrades to a single text leaf carrying the
//! raw markup verbatim.

use crate::{latex, mathml};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use ts_rs::TS;

/// Deepest tree (and parser recursion) accepted from markup; anything deeper
/// is treated as a parse failure.
pub const MAX_NESTING_DEPTH: usize = 128;

/// Navigation granularity attached to every node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum Granularity {
    Character,
    Symbol,
    Term,
    Structure,
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Granularity::Character => "character",
            Granularity::Symbol => "symbol",
            Granularity::Term => "term",
            Granularity::Structure => "structure",
        };
        write!(f, "{}", label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Text(String),
    Operator(String),
    Fraction {
        numerator: Box<Node>,
        denominator: Box<Node>,
    },
    Root {
        radicand: Box<Node>,
        index: Option<Box<Node>>,
    },
    Superscript {
        base: Box<Node>,
        exponent: Box<Node>,
    },
    Subscript {
        base: Box<Node>,
        subscript: Box<Node>,
    },
    Grouping(Vec<Node>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    kind: NodeKind,
    granularity: Granularity,
    depth: usize,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        let granularity = if text.chars().count() <= 1 {
            Granularity::Character
        } else {
            Granularity::Term
        };
        Self {
            kind: NodeKind::Text(text),
            granularity,
            depth: 1,
        }
    }

    pub fn operator(symbol: impl Into<String>) -> Self {
        Self {
            kind: NodeKind::Operator(symbol.into()),
            granularity: Granularity::Symbol,
            depth: 1,
        }
    }

    pub fn fraction(numerator: Node, denominator: Node) -> Self {
        Self::structure(NodeKind::Fraction {
            numerator: Box::new(numerator),
            denominator: Box::new(denominator),
        })
    }

    pub fn root(radicand: Node, index: Option<Node>) -> Self {
        Self::structure(NodeKind::Root {
            radicand: Box::new(radicand),
            index: index.map(Box::new),
        })
    }

    pub fn superscript(base: Node, exponent: Node) -> Self {
        Self::structure(NodeKind::Superscript {
            base: Box::new(base),
            exponent: Box::new(exponent),
        })
    }

    pub fn subscript(base: Node, subscript: Node) -> Self {
        Self::structure(NodeKind::Subscript {
            base: Box::new(base),
            subscript: Box::new(subscript),
        })
    }

    pub fn grouping(children: Vec<Node>) -> Self {
        let depth = 1 + children.iter().map(Node::depth).max().unwrap_or(0);
        Self {
            kind: NodeKind::Grouping(children),
            granularity: Granularity::Term,
            depth,
        }
    }

    /// Collapses a single-child sequence into that child.
    pub fn group_or_single(mut children: Vec<Node>) -> Self {
        if children.len() == 1 {
            children.remove(0)
        } else {
            Self::grouping(children)
        }
    }

    fn structure(kind: NodeKind) -> Self {
        let mut node = Self {
            kind,
            granularity: Granularity::Structure,
            depth: 1,
        };
        node.depth = 1 + node.children().iter().map(|child| child.depth).max().unwrap_or(0);
        node
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    /// Levels from this node down to its deepest leaf; a leaf is 1.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_operator(&self) -> bool {
        matches!(self.kind, NodeKind::Operator(_))
    }

    pub fn children(&self) -> Vec<&Node> {
        match &self.kind {
            NodeKind::Text(_) | NodeKind::Operator(_) => Vec::new(),
            NodeKind::Fraction {
                numerator,
                denominator,
            } => vec![numerator.as_ref(), denominator.as_ref()],
            NodeKind::Root { radicand, index } => {
                let mut out = Vec::with_capacity(2);
                if let Some(index) = index {
                    out.push(index.as_ref());
                }
                out.push(radicand.as_ref());
                out
            }
            NodeKind::Superscript { base, exponent } => vec![base.as_ref(), exponent.as_ref()],
            NodeKind::Subscript { base, subscript } => vec![base.as_ref(), subscript.as_ref()],
            NodeKind::Grouping(children) => children.iter().collect(),
        }
    }

    pub fn node_count(&self) -> usize {
        1 + self
            .children()
            .into_iter()
            .map(Node::node_count)
            .sum::<usize>()
    }

    /// Compact linear rendering used as a part's display text.
    pub fn display_text(&self) -> String {
        match &self.kind {
            NodeKind::Text(text) | NodeKind::Operator(text) => text.clone(),
            NodeKind::Fraction {
                numerator,
                denominator,
            } => format!(
                "{}/{}",
                numerator.display_operand(),
                denominator.display_operand()
            ),
            NodeKind::Root { radicand, index } => match index {
                Some(index) => format!("{}√{}", index.display_text(), radicand.display_operand()),
                None => format!("√{}", radicand.display_operand()),
            },
            NodeKind::Superscript { base, exponent } => {
                format!("{}^{}", base.display_operand(), exponent.display_operand())
            }
            NodeKind::Subscript { base, subscript } => {
                format!("{}_{}", base.display_operand(), subscript.display_operand())
            }
            NodeKind::Grouping(children) => {
                children.iter().map(Node::display_text).collect::<String>()
            }
        }
    }

    fn display_operand(&self) -> String {
        let text = self.display_text();
        let compound = match &self.kind {
            NodeKind::Text(_) | NodeKind::Operator(_) => false,
            NodeKind::Grouping(children) => children.len() > 1,
            _ => true,
        };
        if compound {
            format!("({text})")
        } else {
            text
        }
    }

    fn collect_triggers(&self, out: &mut BTreeSet<&'static str>) {
        match &self.kind {
            NodeKind::Operator(symbol) => match symbol.as_str() {
                "+" => {
                    out.insert("+");
                }
                "=" => {
                    out.insert("=");
                }
                "·" | "⋅" => {
                    out.insert(r"\cdot");
                }
                "×" => {
                    out.insert(r"\times");
                }
                _ => {}
            },
            NodeKind::Fraction { .. } => {
                out.insert(r"\frac");
            }
            NodeKind::Root { .. } => {
                out.insert(r"\sqrt");
            }
            NodeKind::Superscript { .. } => {
                out.insert("^");
            }
            _ => {}
        }
        for child in self.children() {
            child.collect_triggers(out);
        }
    }
}

/// Where an expression came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpressionSource {
    Latex,
    MathMl,
    /// Unparsed markup (or parse failure) kept as one text leaf.
    Verbatim,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expression {
    root: Node,
    source: ExpressionSource,
}

impl Expression {
    /// Parse LaTeX, falling back to a verbatim text leaf on malformed input.
    pub fn from_latex(source: &str) -> Self {
        match latex::parse_latex(source) {
            Ok(root) => Self {
                root,
                source: ExpressionSource::Latex,
            },
            Err(err) => {
                tracing::debug!(chars = source.len(), "LaTeX parse failed; using verbatim text: {err:#}");
                Self::verbatim(source)
            }
        }
    }

    /// Parse MathML, falling back to a verbatim text leaf on malformed input.
    pub fn from_mathml(source: &str) -> Self {
        match mathml::parse_mathml(source) {
            Ok(root) => Self {
                root,
                source: ExpressionSource::MathMl,
            },
            Err(err) => {
                tracing::debug!(chars = source.len(), "MathML parse failed; using verbatim text: {err:#}");
                Self::verbatim(source)
            }
        }
    }

    pub fn verbatim(source: &str) -> Self {
        Self {
            root: Node::text(source),
            source: ExpressionSource::Verbatim,
        }
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn source(&self) -> ExpressionSource {
        self.source
    }

    pub fn is_verbatim(&self) -> bool {
        self.source == ExpressionSource::Verbatim
    }

    pub fn node_count(&self) -> usize {
        self.root.node_count()
    }

    /// Distinct complexity triggers present in the tree, named the way they
    /// are spelled in LaTeX so tree and source counts agree.
    pub fn triggers(&self) -> BTreeSet<&'static str> {
        let mut out = BTreeSet::new();
        if !self.is_verbatim() {
            self.root.collect_triggers(&mut out);
        }
        out
    }

    /// Top-level items of the expression, in reading order.
    pub fn top_level(&self) -> Vec<&Node> {
        match self.root.kind() {
            NodeKind::Grouping(children) => children.iter().collect(),
            _ => vec![&self.root],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularity_defaults_follow_node_kind() {
        assert_eq!(Node::text("x").granularity(), Granularity::Character);
        assert_eq!(Node::text("sin").granularity(), Granularity::Term);
        assert_eq!(Node::operator("+").granularity(), Granularity::Symbol);
        let frac = Node::fraction(Node::text("1"), Node::text("2"));
        assert_eq!(frac.granularity(), Granularity::Structure);
        assert_eq!(Node::grouping(Vec::new()).granularity(), Granularity::Term);
    }

    #[test]
    fn malformed_latex_degrades_to_verbatim_leaf() {
        let expr = Expression::from_latex(r"\frac{1}{2");
        assert!(expr.is_verbatim());
        assert_eq!(expr.root().kind(), &NodeKind::Text(r"\frac{1}{2".to_string()));
        assert!(expr.triggers().is_empty());
    }

    #[test]
    fn display_text_parenthesizes_compound_operands() {
        let expr = Expression::from_latex(r"\frac{a+b}{2}");
        assert_eq!(expr.root().display_text(), "(a+b)/2");
    }

    #[test]
    fn triggers_match_latex_spelling() {
        let expr = Expression::from_latex(r"\sqrt{x}=y^2");
        let triggers: Vec<_> = expr.triggers().into_iter().collect();
        assert_eq!(triggers, vec!["=", r"\sqrt", "^"]);
    }

    #[test]
    fn node_count_includes_every_descendant() {
        let expr = Expression::from_latex(r"x^2");
        assert_eq!(expr.node_count(), 3);
    }

    #[test]
    fn overly_deep_markup_degrades_to_verbatim() {
        let latex = format!("{}x{}", "{".repeat(100_000), "}".repeat(100_000));
        assert!(Expression::from_latex(&latex).is_verbatim());

        let mathml = format!(
            "<math>{}<mi>x</mi>{}</math>",
            "<mrow>".repeat(100_000),
            "</mrow>".repeat(100_000)
        );
        assert!(Expression::from_mathml(&mathml).is_verbatim());
    }

    #[test]
    fn depth_tracks_deepest_branch() {
        let expr = Expression::from_latex(r"\frac{a}{b^2}+1");
        assert_eq!(expr.root().depth(), 4);
        assert_eq!(Node::text("x").depth(), 1);
    }
}
