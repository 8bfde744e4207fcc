//! `for` and `while` loops.

use gdscript_core::ParseError;
use num_enum::IntoPrimitive;

use super::Statement;
use crate::block::{BlockReader, header_colon};
use crate::expr::{Expression, ExpressionFlags, ExpressionResolver, starts_expression};
use crate::form::{Form, impl_form_state};
use crate::list::SyntaxList;
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    Identifier, IdentifierReader, Keyword, KeywordReader, LineEnding, Punct, is_ident_start,
    is_space,
};
use crate::types::{TypeNode, TypeReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum ForState {
    For,
    Variable,
    TypeColon,
    Type,
    In,
    Collection,
    Colon,
    Statements,
    Completed,
}

impl_form_state!(ForState, "ForStatement", For);

/// `for name[: Type] in collection: ...`
#[derive(Debug, Clone, PartialEq)]
pub struct ForStatement {
    pub(crate) form: Form<ForState>,
    pub(crate) variable: Option<Identifier>,
    pub(crate) has_type_colon: bool,
    pub(crate) type_node: Option<TypeNode>,
    pub(crate) has_in: bool,
    pub(crate) collection: Option<Expression>,
    pub(crate) has_colon: bool,
    pub(crate) statements: Option<SyntaxList<Statement>>,
}

impl ForStatement {
    pub fn variable(&self) -> Option<&Identifier> {
        self.variable.as_ref()
    }

    pub fn type_node(&self) -> Option<&TypeNode> {
        self.type_node.as_ref()
    }

    pub fn collection(&self) -> Option<&Expression> {
        self.collection.as_ref()
    }

    pub fn statements(&self) -> Option<&SyntaxList<Statement>> {
        self.statements.as_ref()
    }
}

impl SyntaxNode for ForStatement {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(ForState::For, Some(Leaf::Keyword(Keyword::For)))
            .slot(ForState::Variable, &self.variable)
            .leaf(
                ForState::TypeColon,
                self.has_type_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(ForState::Type, &self.type_node)
            .leaf(ForState::In, self.has_in.then_some(Leaf::Keyword(Keyword::In)))
            .slot(ForState::Collection, &self.collection)
            .leaf(
                ForState::Colon,
                self.has_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(ForState::Statements, &self.statements)
            .finish();
    }
}

pub(crate) struct ForReader {
    form: Form<ForState>,
    indent: usize,
    variable: Option<Identifier>,
    has_type_colon: bool,
    type_node: Option<TypeNode>,
    has_in: bool,
    collection: Option<Expression>,
    statements: Option<SyntaxList<Statement>>,
}

impl ForReader {
    pub fn new(indent: usize) -> Self {
        Self {
            form: Form::new(),
            indent,
            variable: None,
            has_type_colon: false,
            type_node: None,
            has_in: false,
            collection: None,
            statements: None,
        }
    }

    fn body(&self) -> Step {
        Step::Push(Box::new(BlockReader::<Statement>::nested(self.indent)))
    }
}

impl Resolve for ForReader {
    fn name(&self) -> &'static str {
        "ForStatement"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        let state = self.form.state();
        if is_space(c) && state < ForState::Statements {
            self.form.add_space(c);
            return Ok(Step::Consumed);
        }
        match state {
            ForState::For => Ok(Step::Push(Box::new(KeywordReader::new(Keyword::For)))),
            ForState::Variable if is_ident_start(c) => {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            ForState::Variable | ForState::TypeColon if c == ':' => {
                self.has_type_colon = true;
                self.form.set_state(ForState::Type)?;
                Ok(Step::Consumed)
            }
            ForState::Type if TypeReader::starts(c) => Ok(Step::Push(Box::new(TypeReader::new()))),
            ForState::Variable | ForState::TypeColon | ForState::Type | ForState::In
                if is_ident_start(c) =>
            {
                self.form.set_state(ForState::In)?;
                Ok(Step::Push(Box::new(KeywordReader::new(Keyword::In))))
            }
            ForState::Collection if starts_expression(c) => Ok(
                Step::Push(Box::new(ExpressionResolver::new(ExpressionFlags::empty()))),
            ),
            ForState::Statements => Ok(self.body()),
            ForState::Completed => Ok(Step::Pop),
            _ => header_colon(&mut self.form, c, ForState::Statements),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            ForState::Statements => Ok(self.body()),
            _ => Ok(Step::Pop),
        }
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (ForState::For, Resolved::Keyword(Keyword::For)) => {
                self.form.set_state(ForState::Variable)
            }
            (ForState::Variable, Resolved::Identifier(name)) => {
                self.variable = Some(name);
                self.form.set_state(ForState::TypeColon)
            }
            (ForState::Type, Resolved::Type(ty)) => {
                self.type_node = Some(ty);
                self.form.set_state(ForState::In)
            }
            (ForState::In, Resolved::Keyword(Keyword::In)) => {
                self.has_in = true;
                self.form.set_state(ForState::Collection)
            }
            (ForState::Collection, Resolved::Expression(e)) => {
                self.collection = Some(e);
                self.form.set_state(ForState::Colon)
            }
            (_, Resolved::Trivia(t)) => {
                self.form.add_before_active_token(t);
                Ok(())
            }
            (ForState::Statements, Resolved::Statements(list)) => {
                self.statements = Some(list);
                self.form.complete();
                Ok(())
            }
            (_, other) => Err(self.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let has_colon = self.form.state() >= ForState::Statements;
        Ok(Resolved::Statement(Statement::For(ForStatement {
            form: self.form,
            variable: self.variable,
            has_type_colon: self.has_type_colon,
            type_node: self.type_node,
            has_in: self.has_in,
            collection: self.collection,
            has_colon,
            statements: self.statements,
        })))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum WhileState {
    While,
    Condition,
    Colon,
    Statements,
    Completed,
}

impl_form_state!(WhileState, "WhileStatement", While);

/// `while condition: ...`
#[derive(Debug, Clone, PartialEq)]
pub struct WhileStatement {
    pub(crate) form: Form<WhileState>,
    pub(crate) condition: Option<Expression>,
    pub(crate) has_colon: bool,
    pub(crate) statements: Option<SyntaxList<Statement>>,
}

impl WhileStatement {
    pub fn condition(&self) -> Option<&Expression> {
        self.condition.as_ref()
    }

    pub fn statements(&self) -> Option<&SyntaxList<Statement>> {
        self.statements.as_ref()
    }
}

impl SyntaxNode for WhileStatement {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(WhileState::While, Some(Leaf::Keyword(Keyword::While)))
            .slot(WhileState::Condition, &self.condition)
            .leaf(
                WhileState::Colon,
                self.has_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(WhileState::Statements, &self.statements)
            .finish();
    }
}

pub(crate) struct WhileReader {
    form: Form<WhileState>,
    indent: usize,
    condition: Option<Expression>,
    statements: Option<SyntaxList<Statement>>,
}

impl WhileReader {
    pub fn new(indent: usize) -> Self {
        Self {
            form: Form::new(),
            indent,
            condition: None,
            statements: None,
        }
    }
}

impl Resolve for WhileReader {
    fn name(&self) -> &'static str {
        "WhileStatement"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            WhileState::While => Ok(Step::Push(Box::new(KeywordReader::new(Keyword::While)))),
            WhileState::Condition if starts_expression(c) => Ok(
                Step::Push(Box::new(ExpressionResolver::new(ExpressionFlags::empty()))),
            ),
            WhileState::Condition | WhileState::Colon => {
                header_colon(&mut self.form, c, WhileState::Statements)
            }
            WhileState::Statements => Ok(Step::Push(Box::new(
                BlockReader::<Statement>::nested(self.indent),
            ))),
            WhileState::Completed => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            WhileState::Statements => Ok(Step::Push(Box::new(
                BlockReader::<Statement>::nested(self.indent),
            ))),
            _ => Ok(Step::Pop),
        }
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (WhileState::While, Resolved::Keyword(Keyword::While)) => {
                self.form.set_state(WhileState::Condition)
            }
            (WhileState::Condition, Resolved::Expression(e)) => {
                self.condition = Some(e);
                self.form.set_state(WhileState::Colon)
            }
            (_, Resolved::Trivia(t)) => {
                self.form.add_before_active_token(t);
                Ok(())
            }
            (WhileState::Statements, Resolved::Statements(list)) => {
                self.statements = Some(list);
                self.form.complete();
                Ok(())
            }
            (_, other) => Err(self.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let has_colon = self.form.state() >= WhileState::Statements;
        Ok(Resolved::Statement(Statement::While(WhileStatement {
            form: self.form,
            condition: self.condition,
            has_colon,
            statements: self.statements,
        })))
    }
}

impl_display!(ForStatement, WhileStatement);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[test]
    fn typed_for_loop() {
        let source = "for i: int in range(3):\n\tprint(i)";
        let Statement::For(s) = Parser::new().parse_statement(source).unwrap() else {
            panic!("expected for");
        };
        assert_eq!(s.variable().unwrap().as_str(), "i");
        assert_eq!(s.type_node().unwrap().to_string(), "int");
        assert_eq!(s.collection().unwrap().to_string(), "range(3)");
        assert_eq!(s.statements().unwrap().len(), 1);
        assert_eq!(s.to_string(), source);
    }

    #[test]
    fn untyped_for_loop() {
        let source = "for item in items: total += item";
        let Statement::For(s) = Parser::new().parse_statement(source).unwrap() else {
            panic!("expected for");
        };
        assert!(s.type_node().is_none());
        assert!(s.has_in);
        assert_eq!(s.to_string(), source);
    }

    #[test]
    fn while_loop() {
        let source = "while n > 0:\n\tn -= 1\n\tif n == 2: break";
        let Statement::While(s) = Parser::new().parse_statement(source).unwrap() else {
            panic!("expected while");
        };
        assert_eq!(s.condition().unwrap().to_string(), "n > 0");
        assert_eq!(s.statements().unwrap().len(), 2);
        assert_eq!(s.to_string(), source);
    }
}
