//! Class bodies: the file-level class and inner `class` blocks.

use gdscript_core::ParseError;
use num_enum::IntoPrimitive;

use super::{
    AttributeDeclaration, ClassMember, ClassNameAttribute, EnumDeclaration, MethodDeclaration,
    SignalDeclaration, VariableDeclaration,
};
use crate::block::{BlockReader, header_colon};
use crate::form::{Form, impl_form_state};
use crate::list::SyntaxList;
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    Identifier, IdentifierReader, Keyword, KeywordReader, LineEnding, Punct, is_ident_start,
    is_space,
};
use crate::types::{TypeNode, TypeReader};

/// Typed views over a member list.
///
/// Every query is a filter over the members in source order; nothing is
/// indexed.
pub trait ClassMembers {
    fn member_list(&self) -> Option<&SyntaxList<ClassMember>>;

    fn members(&self) -> impl Iterator<Item = &ClassMember> {
        self.member_list().into_iter().flat_map(SyntaxList::items)
    }

    /// Variables and constants.
    fn variables(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.members().filter_map(ClassMember::as_variable)
    }

    fn constants(&self) -> impl Iterator<Item = &VariableDeclaration> {
        self.variables().filter(|v| v.is_const())
    }

    fn methods(&self) -> impl Iterator<Item = &MethodDeclaration> {
        self.members().filter_map(|m| match m {
            ClassMember::Method(m) => Some(m),
            _ => None,
        })
    }

    fn signals(&self) -> impl Iterator<Item = &SignalDeclaration> {
        self.members().filter_map(|m| match m {
            ClassMember::Signal(s) => Some(s),
            _ => None,
        })
    }

    fn enums(&self) -> impl Iterator<Item = &EnumDeclaration> {
        self.members().filter_map(|m| match m {
            ClassMember::Enum(e) => Some(e),
            _ => None,
        })
    }

    fn inner_classes(&self) -> impl Iterator<Item = &InnerClassDeclaration> {
        self.members().filter_map(|m| match m {
            ClassMember::InnerClass(c) => Some(c),
            _ => None,
        })
    }

    fn attributes(&self) -> impl Iterator<Item = &AttributeDeclaration> {
        self.members().filter_map(|m| match m {
            ClassMember::Attribute(a) => Some(a),
            _ => None,
        })
    }

    /// `@tool` or the older `tool` keyword.
    fn is_tool(&self) -> bool {
        self.members().any(|m| match m {
            ClassMember::Tool => true,
            ClassMember::Attribute(a) => a.is("tool"),
            _ => false,
        })
    }

    /// The base type named by the first `extends` member.
    fn extends(&self) -> Option<&TypeNode> {
        self.members().find_map(|m| match m {
            ClassMember::Extends(e) => e.base(),
            _ => None,
        })
    }

    fn class_name(&self) -> Option<&ClassNameAttribute> {
        self.members().find_map(|m| match m {
            ClassMember::ClassName(c) => Some(c),
            _ => None,
        })
    }
}

/// The class a whole file declares.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassDeclaration {
    pub(crate) members: SyntaxList<ClassMember>,
}

impl ClassMembers for ClassDeclaration {
    fn member_list(&self) -> Option<&SyntaxList<ClassMember>> {
        Some(&self.members)
    }
}

impl SyntaxNode for ClassDeclaration {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.members.walk(visit);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum InnerClassState {
    Class,
    Name,
    Extends,
    Base,
    Colon,
    Members,
    Completed,
}

impl_form_state!(InnerClassState, "InnerClassDeclaration", Class);

/// `class Name [extends Base]:` and its indented members.
#[derive(Debug, Clone, PartialEq)]
pub struct InnerClassDeclaration {
    pub(crate) form: Form<InnerClassState>,
    pub(crate) name: Option<Identifier>,
    pub(crate) has_extends: bool,
    pub(crate) base: Option<TypeNode>,
    pub(crate) has_colon: bool,
    pub(crate) members: Option<SyntaxList<ClassMember>>,
}

impl InnerClassDeclaration {
    pub fn name(&self) -> Option<&Identifier> {
        self.name.as_ref()
    }

    /// The type after `extends` in the header.
    pub fn base(&self) -> Option<&TypeNode> {
        self.base.as_ref()
    }
}

impl ClassMembers for InnerClassDeclaration {
    fn member_list(&self) -> Option<&SyntaxList<ClassMember>> {
        self.members.as_ref()
    }
}

impl SyntaxNode for InnerClassDeclaration {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(InnerClassState::Class, Some(Leaf::Keyword(Keyword::Class)))
            .slot(InnerClassState::Name, &self.name)
            .leaf(
                InnerClassState::Extends,
                self.has_extends.then_some(Leaf::Keyword(Keyword::Extends)),
            )
            .slot(InnerClassState::Base, &self.base)
            .leaf(
                InnerClassState::Colon,
                self.has_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(InnerClassState::Members, &self.members)
            .finish();
    }
}

pub(crate) struct InnerClassReader {
    indent: usize,
    class: InnerClassDeclaration,
}

impl InnerClassReader {
    pub fn new(indent: usize) -> Self {
        Self {
            indent,
            class: InnerClassDeclaration {
                form: Form::new(),
                name: None,
                has_extends: false,
                base: None,
                has_colon: false,
                members: None,
            },
        }
    }

    fn body(&self) -> Step {
        Step::Push(Box::new(BlockReader::<ClassMember>::nested(self.indent)))
    }
}

impl Resolve for InnerClassReader {
    fn name(&self) -> &'static str {
        "InnerClassDeclaration"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        let form = &mut self.class.form;
        let state = form.state();
        if is_space(c) && state > InnerClassState::Class && state < InnerClassState::Members {
            form.add_space(c);
            return Ok(Step::Consumed);
        }
        match state {
            InnerClassState::Class => Ok(Step::Push(Box::new(KeywordReader::new(Keyword::Class)))),
            InnerClassState::Name if is_ident_start(c) => {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            InnerClassState::Name => {
                form.set_state(InnerClassState::Extends)?;
                Ok(Step::Retry)
            }
            InnerClassState::Extends if is_ident_start(c) => {
                Ok(Step::Push(Box::new(KeywordReader::new(Keyword::Extends))))
            }
            InnerClassState::Base if TypeReader::starts(c) => {
                Ok(Step::Push(Box::new(TypeReader::new())))
            }
            InnerClassState::Extends | InnerClassState::Base | InnerClassState::Colon => {
                header_colon(form, c, InnerClassState::Members)
            }
            InnerClassState::Members => Ok(self.body()),
            InnerClassState::Completed => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.class.form.state() {
            InnerClassState::Members => Ok(self.body()),
            _ => Ok(Step::Pop),
        }
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        let form = &mut self.class.form;
        match (form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (InnerClassState::Class, Resolved::Keyword(Keyword::Class)) => {
                form.set_state(InnerClassState::Name)
            }
            (InnerClassState::Name, Resolved::Identifier(name)) => {
                self.class.name = Some(name);
                form.set_state(InnerClassState::Extends)
            }
            (InnerClassState::Extends, Resolved::Keyword(Keyword::Extends)) => {
                self.class.has_extends = true;
                form.set_state(InnerClassState::Base)
            }
            (InnerClassState::Base, Resolved::Type(base)) => {
                self.class.base = Some(base);
                form.set_state(InnerClassState::Colon)
            }
            (InnerClassState::Members, Resolved::Members(members)) => {
                self.class.members = Some(members);
                form.complete();
                Ok(())
            }
            (_, Resolved::Trivia(t)) => {
                form.add_before_active_token(t);
                Ok(())
            }
            (_, other) => Err(form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let mut class = self.class;
        class.has_colon = class.form.state() >= InnerClassState::Members;
        Ok(Resolved::Member(ClassMember::InnerClass(class)))
    }
}

impl_display!(ClassDeclaration, InnerClassDeclaration);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn inner_class_members() {
        let source = "extends Node\n\nclass Item extends Resource:\n\tvar id := 0\n\tfunc use():\n\t\tpass\n\nvar items = []\n";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        assert_eq!(class.variables().count(), 1);
        let inner = class.inner_classes().next().unwrap();
        assert_eq!(inner.name().unwrap().as_str(), "Item");
        assert_eq!(inner.base().unwrap().to_string(), "Resource");
        assert_eq!(inner.variables().count(), 1);
        assert_eq!(inner.methods().next().unwrap().name().unwrap().as_str(), "use");
    }

    #[test]
    fn nested_inner_classes() {
        let source = "class A:\n\tclass B:\n\t\tconst X = 1\n\tvar y\n";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        let a = class.inner_classes().next().unwrap();
        assert_eq!(a.variables().count(), 1);
        let b = a.inner_classes().next().unwrap();
        assert_eq!(b.constants().count(), 1);
    }

    #[test]
    fn pass_fills_empty_class_bodies() {
        let source = "class A:\n\tpass\nclass B extends A:\n\tpass\n";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        assert!(!class.has_invalid_tokens());
        let inner: Vec<_> = class.inner_classes().collect();
        assert_eq!(inner.len(), 2);
        for c in inner {
            assert!(matches!(c.members().next(), Some(ClassMember::Pass)));
            assert_eq!(c.variables().count(), 0);
        }
    }

    #[test]
    fn empty_file() {
        let class = Parser::new().parse("").unwrap();
        assert_eq!(class.members().count(), 0);
        assert!(class.extends().is_none());
        assert!(class.class_name().is_none());
        assert_eq!(class.to_string(), "");
    }
}
