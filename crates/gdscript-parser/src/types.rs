//! Type annotations: `int`, `A.B`, `Array[int]`, `"res://base.gd"`.
//!
//! Types are written without spaces, so a space always ends one.

use gdscript_core::ParseError;

use crate::expr::ExpressionFlags;
use crate::list::{BracketedList, BracketedListReader, ListItem};
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    Identifier, IdentifierReader, LineEnding, Punct, StringLiteral, StringReader, is_ident_start,
};

/// A type in an annotation, an `extends` clause or a cast.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    /// `int`, `Node`
    Single(Identifier),
    /// A script path, as in `extends "res://base.gd"`.
    String(StringLiteral),
    /// `Outer.Inner`
    Sub(SubType),
    /// `Array[int]`, `Dictionary[String, int]`
    Generic(GenericType),
}

impl TypeNode {
    /// The last name of the type: `B` for `A.B`, `Array` for `Array[int]`.
    pub fn name(&self) -> Option<&str> {
        match self {
            TypeNode::Single(id) => Some(id.as_str()),
            TypeNode::String(_) => None,
            TypeNode::Sub(sub) => sub.inner.as_ref().map(Identifier::as_str),
            TypeNode::Generic(generic) => generic.base.name(),
        }
    }

    /// Type arguments of a generic type. Empty for other types.
    pub fn arguments(&self) -> impl Iterator<Item = &TypeNode> {
        let list = match self {
            TypeNode::Generic(generic) => Some(&generic.arguments),
            _ => None,
        };
        list.into_iter().flat_map(BracketedList::items)
    }

    pub fn is_generic(&self) -> bool {
        matches!(self, TypeNode::Generic(_))
    }
}

impl SyntaxNode for TypeNode {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        match self {
            TypeNode::Single(id) => id.walk(visit),
            TypeNode::String(s) => s.walk(visit),
            TypeNode::Sub(sub) => sub.walk(visit),
            TypeNode::Generic(generic) => generic.walk(visit),
        }
    }
}

/// `outer.inner`
#[derive(Debug, Clone, PartialEq)]
pub struct SubType {
    pub(crate) outer: Box<TypeNode>,
    pub(crate) inner: Option<Identifier>,
}

impl SubType {
    pub fn outer(&self) -> &TypeNode {
        &self.outer
    }

    pub fn inner(&self) -> Option<&Identifier> {
        self.inner.as_ref()
    }
}

impl SyntaxNode for SubType {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.outer.walk(visit);
        visit(Leaf::Punct(Punct::Dot));
        self.inner.walk(visit);
    }
}

/// `base[arguments]`
#[derive(Debug, Clone, PartialEq)]
pub struct GenericType {
    pub(crate) base: Box<TypeNode>,
    pub(crate) arguments: BracketedList<TypeNode>,
}

impl GenericType {
    pub fn base(&self) -> &TypeNode {
        &self.base
    }

    pub fn arguments(&self) -> &BracketedList<TypeNode> {
        &self.arguments
    }
}

impl SyntaxNode for GenericType {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.base.walk(visit);
        self.arguments.walk(visit);
    }
}

impl_display!(TypeNode, SubType, GenericType);

/// Reads one type. Pushed at its first character.
pub(crate) struct TypeReader {
    current: Option<TypeNode>,
    /// A `.` was read and its name has not arrived yet.
    dotted: bool,
}

impl TypeReader {
    pub fn new() -> Self {
        Self {
            current: None,
            dotted: false,
        }
    }

    /// Whether `c` can begin a type.
    pub fn starts(c: char) -> bool {
        is_ident_start(c) || c == '"' || c == '\''
    }

    fn close_dot(&mut self, inner: Option<Identifier>) {
        self.dotted = false;
        if let Some(outer) = self.current.take() {
            self.current = Some(TypeNode::Sub(SubType {
                outer: Box::new(outer),
                inner,
            }));
        }
    }
}

impl Resolve for TypeReader {
    fn name(&self) -> &'static str {
        "Type"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.dotted {
            if is_ident_start(c) {
                return Ok(Step::Push(Box::new(IdentifierReader::new())));
            }
            self.close_dot(None);
            return Ok(Step::Retry);
        }
        match (&self.current, c) {
            (None, '"' | '\'') => Ok(Step::Push(Box::new(StringReader::new()))),
            (None, c) if is_ident_start(c) => Ok(Step::Push(Box::new(IdentifierReader::new()))),
            (Some(_), '.') => {
                self.dotted = true;
                Ok(Step::Consumed)
            }
            (Some(TypeNode::Single(_) | TypeNode::Sub(_)), '[') => Ok(Step::Push(Box::new(
                BracketedListReader::<TypeNode>::new(Punct::OpenBracket, ExpressionFlags::empty()),
            ))),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.dotted {
            self.close_dot(None);
        }
        Ok(Step::Pop)
    }

    fn handle_eof(&mut self, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.dotted {
            self.close_dot(None);
        }
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match value {
            Resolved::Skipped => {}
            Resolved::Identifier(id) if self.dotted => self.close_dot(Some(id)),
            Resolved::Identifier(id) if self.current.is_none() => {
                self.current = Some(TypeNode::Single(id))
            }
            Resolved::String(s) if self.current.is_none() => {
                self.current = Some(TypeNode::String(s))
            }
            Resolved::Types(arguments) => {
                if let Some(base) = self.current.take() {
                    self.current = Some(TypeNode::Generic(GenericType {
                        base: Box::new(base),
                        arguments,
                    }));
                }
            }
            other => {
                return Err(ParseError::invalid_state(
                    "Type",
                    self.current.is_some(),
                    other.kind_name(),
                ));
            }
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(match self.current {
            Some(ty) => Resolved::Type(ty),
            None => Resolved::Skipped,
        })
    }
}

impl ListItem for TypeNode {
    fn starts(c: char) -> bool {
        TypeReader::starts(c)
    }

    fn reader(_flags: ExpressionFlags, _cx: &ReadContext) -> Box<dyn Resolve> {
        Box::new(TypeReader::new())
    }

    fn from_resolved(value: Resolved) -> Option<Self> {
        match value {
            Resolved::Type(ty) => Some(ty),
            _ => None,
        }
    }

    fn into_resolved(list: BracketedList<Self>) -> Resolved {
        Resolved::Types(list)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::decl::ClassMembers;

    fn parse_type(source: &str) -> TypeNode {
        let class = Parser::new().parse(&format!("var x: {source}")).unwrap();
        let var = class.variables().next().unwrap();
        var.type_node().unwrap().clone()
    }

    #[test]
    fn plain_type() {
        let ty = parse_type("int");
        assert_eq!(ty, TypeNode::Single(Identifier::new("int")));
        assert_eq!(ty.name(), Some("int"));
    }

    #[test]
    fn dotted_type() {
        let ty = parse_type("Outer.Inner");
        assert_eq!(ty.to_string(), "Outer.Inner");
        assert_eq!(ty.name(), Some("Inner"));
    }

    #[test]
    fn generic_types() {
        let ty = parse_type("Dictionary[String, Array[int]]");
        assert!(ty.is_generic());
        assert_eq!(ty.name(), Some("Dictionary"));
        let names: Vec<_> = ty.arguments().map(TypeNode::to_string).collect();
        assert_eq!(names, ["String", "Array[int]"]);
    }
}
