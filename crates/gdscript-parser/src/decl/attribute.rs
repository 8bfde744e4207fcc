//! Annotations and the class-level `class_name` and `extends` lines.

use gdscript_core::ParseError;
use num_enum::IntoPrimitive;

use super::ClassMember;
use crate::expr::{Expression, ExpressionFlags};
use crate::form::{Form, impl_form_state};
use crate::list::{BracketedList, BracketedListReader};
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    Identifier, IdentifierReader, Keyword, KeywordReader, LineEnding, Punct, StringLiteral,
    StringReader, is_ident_start, is_space,
};
use crate::types::{TypeNode, TypeReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum AttributeState {
    At,
    Name,
    Arguments,
    Completed,
}

impl_form_state!(AttributeState, "AttributeDeclaration", At);

/// `@name` or `@name(args)`
#[derive(Debug, Clone, PartialEq)]
pub struct AttributeDeclaration {
    pub(crate) form: Form<AttributeState>,
    pub(crate) name: Option<Identifier>,
    pub(crate) arguments: Option<BracketedList<Expression>>,
}

impl AttributeDeclaration {
    pub fn name(&self) -> Option<&Identifier> {
        self.name.as_ref()
    }

    pub fn arguments(&self) -> impl Iterator<Item = &Expression> {
        self.arguments.iter().flat_map(BracketedList::items)
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.as_ref().is_some_and(|n| n.as_str() == name)
    }
}

impl SyntaxNode for AttributeDeclaration {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(AttributeState::At, Some(Leaf::Punct(Punct::At)))
            .slot(AttributeState::Name, &self.name)
            .slot(AttributeState::Arguments, &self.arguments)
            .finish();
    }
}

/// Reads an annotation, pushed at its `@`.
pub(crate) struct AttributeReader {
    attribute: AttributeDeclaration,
}

impl AttributeReader {
    pub fn new() -> Self {
        Self {
            attribute: AttributeDeclaration {
                form: Form::new(),
                name: None,
                arguments: None,
            },
        }
    }
}

impl Resolve for AttributeReader {
    fn name(&self) -> &'static str {
        "AttributeDeclaration"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        match (self.attribute.form.state(), c) {
            (AttributeState::At, '@') => {
                self.attribute.form.set_state(AttributeState::Name)?;
                Ok(Step::Consumed)
            }
            (AttributeState::Name, c) if is_ident_start(c) => {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            (AttributeState::Arguments, '(') => Ok(Step::Push(Box::new(
                BracketedListReader::<Expression>::new(Punct::OpenParen, ExpressionFlags::empty()),
            ))),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        let form = &mut self.attribute.form;
        match (form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (AttributeState::Name, Resolved::Identifier(name)) => {
                self.attribute.name = Some(name);
                form.set_state(AttributeState::Arguments)
            }
            (AttributeState::Arguments, Resolved::Expressions(list)) => {
                self.attribute.arguments = Some(list);
                form.complete();
                Ok(())
            }
            (_, other) => Err(form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::Member(ClassMember::Attribute(self.attribute)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum ClassNameState {
    Keyword,
    Name,
    Comma,
    Icon,
    Completed,
}

impl_form_state!(ClassNameState, "ClassNameAttribute", Keyword);

/// `class_name Name` with an optional `, "icon path"`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassNameAttribute {
    pub(crate) form: Form<ClassNameState>,
    pub(crate) name: Option<Identifier>,
    pub(crate) has_comma: bool,
    pub(crate) icon: Option<StringLiteral>,
}

impl ClassNameAttribute {
    pub fn name(&self) -> Option<&Identifier> {
        self.name.as_ref()
    }

    pub fn icon(&self) -> Option<&StringLiteral> {
        self.icon.as_ref()
    }
}

impl SyntaxNode for ClassNameAttribute {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(ClassNameState::Keyword, Some(Leaf::Keyword(Keyword::ClassName)))
            .slot(ClassNameState::Name, &self.name)
            .leaf(
                ClassNameState::Comma,
                self.has_comma.then_some(Leaf::Punct(Punct::Comma)),
            )
            .slot(ClassNameState::Icon, &self.icon)
            .finish();
    }
}

pub(crate) struct ClassNameReader {
    attribute: ClassNameAttribute,
}

impl ClassNameReader {
    pub fn new() -> Self {
        Self {
            attribute: ClassNameAttribute {
                form: Form::new(),
                name: None,
                has_comma: false,
                icon: None,
            },
        }
    }
}

impl Resolve for ClassNameReader {
    fn name(&self) -> &'static str {
        "ClassNameAttribute"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        let form = &mut self.attribute.form;
        let state = form.state();
        if is_space(c) && state > ClassNameState::Keyword && state < ClassNameState::Completed {
            form.add_space(c);
            return Ok(Step::Consumed);
        }
        match (state, c) {
            (ClassNameState::Keyword, _) => Ok(Step::Push(Box::new(KeywordReader::new(
                Keyword::ClassName,
            )))),
            (ClassNameState::Name, c) if is_ident_start(c) => {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            (ClassNameState::Comma, ',') => {
                self.attribute.has_comma = true;
                form.set_state(ClassNameState::Icon)?;
                Ok(Step::Consumed)
            }
            (ClassNameState::Icon, '"' | '\'') => Ok(Step::Push(Box::new(StringReader::new()))),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        let form = &mut self.attribute.form;
        match (form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (ClassNameState::Keyword, Resolved::Keyword(Keyword::ClassName)) => {
                form.set_state(ClassNameState::Name)
            }
            (ClassNameState::Name, Resolved::Identifier(name)) => {
                self.attribute.name = Some(name);
                form.set_state(ClassNameState::Comma)
            }
            (ClassNameState::Icon, Resolved::String(icon)) => {
                self.attribute.icon = Some(icon);
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
        Ok(Resolved::Member(ClassMember::ClassName(self.attribute)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum ExtendsState {
    Keyword,
    Type,
    Completed,
}

impl_form_state!(ExtendsState, "ExtendsAttribute", Keyword);

/// `extends Base`, `extends "res://path.gd"` or `extends "path.gd".Inner`
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendsAttribute {
    pub(crate) form: Form<ExtendsState>,
    pub(crate) base: Option<TypeNode>,
}

impl ExtendsAttribute {
    pub fn base(&self) -> Option<&TypeNode> {
        self.base.as_ref()
    }
}

impl SyntaxNode for ExtendsAttribute {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(ExtendsState::Keyword, Some(Leaf::Keyword(Keyword::Extends)))
            .slot(ExtendsState::Type, &self.base)
            .finish();
    }
}

pub(crate) struct ExtendsReader {
    attribute: ExtendsAttribute,
}

impl ExtendsReader {
    pub fn new() -> Self {
        Self {
            attribute: ExtendsAttribute {
                form: Form::new(),
                base: None,
            },
        }
    }
}

impl Resolve for ExtendsReader {
    fn name(&self) -> &'static str {
        "ExtendsAttribute"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        let form = &mut self.attribute.form;
        match form.state() {
            ExtendsState::Keyword => Ok(Step::Push(Box::new(KeywordReader::new(Keyword::Extends)))),
            ExtendsState::Type if is_space(c) => {
                form.add_space(c);
                Ok(Step::Consumed)
            }
            ExtendsState::Type if TypeReader::starts(c) => Ok(Step::Push(Box::new(TypeReader::new()))),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        let form = &mut self.attribute.form;
        match (form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (ExtendsState::Keyword, Resolved::Keyword(Keyword::Extends)) => {
                form.set_state(ExtendsState::Type)
            }
            (ExtendsState::Type, Resolved::Type(base)) => {
                self.attribute.base = Some(base);
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
        Ok(Resolved::Member(ClassMember::Extends(self.attribute)))
    }
}

impl_display!(AttributeDeclaration, ClassNameAttribute, ExtendsAttribute);
