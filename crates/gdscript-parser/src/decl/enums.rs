use gdscript_core::ParseError;
use num_enum::IntoPrimitive;

use super::ClassMember;
use crate::expr::{Expression, ExpressionFlags, ExpressionResolver, starts_expression};
use crate::form::{Form, impl_form_state};
use crate::list::{BracketedList, BracketedListReader, ListItem};
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    Identifier, IdentifierReader, Keyword, KeywordReader, LineEnding, Punct, is_ident_start,
    is_space,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum EnumState {
    Enum,
    Name,
    Values,
    Completed,
}

impl_form_state!(EnumState, "EnumDeclaration", Enum);

/// `enum Name { A, B = 2 }`; the name is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDeclaration {
    pub(crate) form: Form<EnumState>,
    pub(crate) name: Option<Identifier>,
    pub(crate) values: Option<BracketedList<EnumValue>>,
}

impl EnumDeclaration {
    pub fn name(&self) -> Option<&Identifier> {
        self.name.as_ref()
    }

    pub fn values(&self) -> impl Iterator<Item = &EnumValue> {
        self.values.iter().flat_map(BracketedList::items)
    }
}

impl SyntaxNode for EnumDeclaration {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(EnumState::Enum, Some(Leaf::Keyword(Keyword::Enum)))
            .slot(EnumState::Name, &self.name)
            .slot(EnumState::Values, &self.values)
            .finish();
    }
}

pub(crate) struct EnumReader {
    decl: EnumDeclaration,
}

impl EnumReader {
    pub fn new() -> Self {
        Self {
            decl: EnumDeclaration {
                form: Form::new(),
                name: None,
                values: None,
            },
        }
    }

    fn form(&mut self) -> &mut Form<EnumState> {
        &mut self.decl.form
    }
}

impl Resolve for EnumReader {
    fn name(&self) -> &'static str {
        "EnumDeclaration"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        let state = self.decl.form.state();
        if is_space(c) && state > EnumState::Enum && state < EnumState::Completed {
            self.form().add_space(c);
            return Ok(Step::Consumed);
        }
        match (state, c) {
            (EnumState::Enum, _) => Ok(Step::Push(Box::new(KeywordReader::new(Keyword::Enum)))),
            (EnumState::Name, c) if is_ident_start(c) => {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            (EnumState::Name | EnumState::Values, '{') => Ok(Step::Push(Box::new(
                BracketedListReader::<EnumValue>::new(Punct::OpenBrace, ExpressionFlags::empty()),
            ))),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.decl.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (EnumState::Enum, Resolved::Keyword(Keyword::Enum)) => {
                self.form().set_state(EnumState::Name)
            }
            (EnumState::Name, Resolved::Identifier(name)) => {
                self.decl.name = Some(name);
                self.form().set_state(EnumState::Values)
            }
            (_, Resolved::EnumValues(list)) => {
                self.decl.form.ensure(EnumState::Values, "EnumValues")?;
                self.decl.values = Some(list);
                self.form().complete();
                Ok(())
            }
            (_, Resolved::Trivia(t)) => {
                self.form().add_before_active_token(t);
                Ok(())
            }
            (_, other) => Err(self.decl.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::Member(ClassMember::Enum(self.decl)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum EnumValueState {
    Name,
    Assign,
    Value,
    Completed,
}

impl_form_state!(EnumValueState, "EnumValue", Name);

/// `NAME` or `NAME = value`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumValue {
    pub(crate) form: Form<EnumValueState>,
    pub(crate) name: Option<Identifier>,
    pub(crate) has_assign: bool,
    pub(crate) value: Option<Expression>,
}

impl EnumValue {
    pub fn name(&self) -> Option<&Identifier> {
        self.name.as_ref()
    }

    pub fn value(&self) -> Option<&Expression> {
        self.value.as_ref()
    }
}

impl SyntaxNode for EnumValue {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .slot(EnumValueState::Name, &self.name)
            .leaf(
                EnumValueState::Assign,
                self.has_assign.then_some(Leaf::Punct(Punct::Assign)),
            )
            .slot(EnumValueState::Value, &self.value)
            .finish();
    }
}

struct EnumValueReader {
    flags: ExpressionFlags,
    value: EnumValue,
}

impl Resolve for EnumValueReader {
    fn name(&self) -> &'static str {
        "EnumValue"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        let state = self.value.form.state();
        if is_space(c) && state > EnumValueState::Name && state < EnumValueState::Completed {
            self.value.form.add_space(c);
            return Ok(Step::Consumed);
        }
        match (state, c) {
            (EnumValueState::Name, c) if is_ident_start(c) => {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            (EnumValueState::Assign, '=') => {
                self.value.has_assign = true;
                self.value.form.set_state(EnumValueState::Value)?;
                Ok(Step::Consumed)
            }
            (EnumValueState::Value, c) if starts_expression(c) => {
                Ok(Step::Push(Box::new(ExpressionResolver::new(self.flags))))
            }
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.value.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (EnumValueState::Name, Resolved::Identifier(name)) => {
                self.value.name = Some(name);
                self.value.form.set_state(EnumValueState::Assign)
            }
            (EnumValueState::Value, Resolved::Expression(e)) => {
                self.value.value = Some(e);
                self.value.form.complete();
                Ok(())
            }
            (_, Resolved::Trivia(t)) => {
                self.value.form.add_before_active_token(t);
                Ok(())
            }
            (_, other) => Err(self.value.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::EnumValue(self.value))
    }
}

impl ListItem for EnumValue {
    fn starts(c: char) -> bool {
        is_ident_start(c)
    }

    fn reader(flags: ExpressionFlags, _cx: &ReadContext) -> Box<dyn Resolve> {
        Box::new(EnumValueReader {
            flags,
            value: EnumValue {
                form: Form::new(),
                name: None,
                has_assign: false,
                value: None,
            },
        })
    }

    fn from_resolved(value: Resolved) -> Option<Self> {
        match value {
            Resolved::EnumValue(v) => Some(v),
            _ => None,
        }
    }

    fn into_resolved(list: BracketedList<Self>) -> Resolved {
        Resolved::EnumValues(list)
    }
}

impl_display!(EnumDeclaration, EnumValue);

#[cfg(test)]
mod tests {
    use crate::decl::ClassMembers;
    use crate::parser::Parser;

    #[test]
    fn named_enum_over_lines() {
        let source = "enum State {\n\tIDLE,\n\tRUN = 4, # fast\n\tJUMP,\n}";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        let e = class.enums().next().unwrap();
        assert_eq!(e.name().unwrap().as_str(), "State");
        let names: Vec<_> = e.values().filter_map(|v| v.name()).map(|n| n.as_str()).collect();
        assert_eq!(names, ["IDLE", "RUN", "JUMP"]);
        assert_eq!(e.values().nth(1).unwrap().value().unwrap().to_string(), "4");
    }

    #[test]
    fn anonymous_enum() {
        let class = Parser::new().parse("enum {A, B}").unwrap();
        let e = class.enums().next().unwrap();
        assert!(e.name().is_none());
        assert_eq!(e.values().count(), 2);
    }
}
