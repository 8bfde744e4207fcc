//! The serialization contract shared by every syntax node.
//!
//! A node never stores its own text. It knows the order of its slots and
//! hands every leaf, trivia included, to a visitor in that order. Printing
//! a node is concatenating those leaves, so parse followed by print
//! reproduces the source byte for byte.

use std::fmt;

use crate::expr::{DualOperator, SingleOperatorKind};
use crate::tokens::{
    Identifier, InvalidToken, Keyword, NodePath, Number, Punct, StringLiteral, Trivia,
};

/// One leaf of the syntax tree, borrowed from the node that owns it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Leaf<'a> {
    /// Spaces, line endings, comments and invalid spans.
    Trivia(&'a Trivia),
    Identifier(&'a Identifier),
    Keyword(Keyword),
    Punct(Punct),
    Number(&'a Number),
    String(&'a StringLiteral),
    NodePath(&'a NodePath),
    DualOperator(&'a DualOperator),
    SingleOperator(SingleOperatorKind),
}

impl Leaf<'_> {
    /// Whether this leaf carries no grammatical meaning.
    pub fn is_trivia(&self) -> bool {
        matches!(self, Leaf::Trivia(_))
    }
}

impl fmt::Display for Leaf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Leaf::Trivia(t) => fmt::Display::fmt(t, f),
            Leaf::Identifier(t) => f.write_str(t.as_str()),
            Leaf::Keyword(t) => f.write_str(t.as_str()),
            Leaf::Punct(t) => f.write_str(t.as_str()),
            Leaf::Number(t) => f.write_str(t.text()),
            Leaf::String(t) => fmt::Display::fmt(t, f),
            Leaf::NodePath(t) => f.write_str(t.as_str()),
            Leaf::DualOperator(t) => fmt::Display::fmt(t, f),
            Leaf::SingleOperator(t) => f.write_str(t.as_str()),
        }
    }
}

/// A node of the lossless syntax tree.
pub trait SyntaxNode {
    /// Visit every leaf of this node in source order.
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>));

    /// Reconstruct the exact source text of this node.
    fn to_source(&self) -> String {
        use fmt::Write;

        let mut out = String::new();
        self.walk(&mut |leaf| {
            let _ = write!(out, "{}", leaf);
        });
        out
    }

    /// Collect the invalid spans quarantined anywhere below this node.
    fn invalid_tokens(&self) -> Vec<&InvalidToken> {
        let mut out = Vec::new();
        self.walk(&mut |leaf| {
            if let Leaf::Trivia(Trivia::Invalid(token)) = leaf {
                out.push(token);
            }
        });
        out
    }

    /// Whether any invalid span exists below this node.
    fn has_invalid_tokens(&self) -> bool {
        !self.invalid_tokens().is_empty()
    }

    /// Collect the non-trivia leaves of this node.
    fn tokens(&self) -> Vec<Leaf<'_>> {
        let mut out = Vec::new();
        self.walk(&mut |leaf| {
            if !leaf.is_trivia() {
                out.push(leaf);
            }
        });
        out
    }
}

impl<T: SyntaxNode> SyntaxNode for Option<T> {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        if let Some(node) = self {
            node.walk(visit);
        }
    }
}

impl<T: SyntaxNode + ?Sized> SyntaxNode for Box<T> {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        (**self).walk(visit);
    }
}

impl<T: SyntaxNode> SyntaxNode for Vec<T> {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        for node in self {
            node.walk(visit);
        }
    }
}

/// Write a node's leaves to a formatter.
pub(crate) fn write_node(node: &dyn SyntaxNode, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut result = Ok(());
    node.walk(&mut |leaf| {
        if result.is_ok() {
            result = write!(f, "{}", leaf);
        }
    });
    result
}

/// Implement `Display` for syntax nodes by printing their leaves.
macro_rules! impl_display {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ::std::fmt::Display for $ty {
                fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                    $crate::node::write_node(self, f)
                }
            }
        )+
    };
}

pub(crate) use impl_display;
