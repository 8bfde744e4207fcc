//! Statements and the blocks they live in.

mod branch;
mod loops;
mod matching;

use gdscript_core::ParseError;
use num_enum::IntoPrimitive;

pub use branch::{ElseBranch, ElseBranchState, IfBranch, IfBranchState, IfStatement};
pub use loops::{ForState, ForStatement, WhileState, WhileStatement};
pub use matching::{MatchCase, MatchCaseState, MatchState, MatchStatement};

use crate::block::BlockItem;
use crate::decl::{AttributeDeclaration, AttributeReader, ClassMember, VariableDeclaration, VariableReader};
use crate::expr::{Expression, ExpressionFlags, ExpressionResolver, starts_expression};
use crate::form::{Form, impl_form_state};
use crate::list::SyntaxList;
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{Pending, ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    Keyword, KeywordReader, LineEnding, Punct, Trivia, is_ident_continue, is_ident_start, is_space,
};

/// A statement in a method body, accessor or branch.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(Expression),
    /// `var` or `const` local.
    Variable(VariableDeclaration),
    If(IfStatement),
    For(ForStatement),
    While(WhileStatement),
    Match(MatchStatement),
    Return(ReturnStatement),
    Pass,
    Break,
    Continue,
    Breakpoint,
    /// `@warning_ignore(...)` in front of a statement.
    Attribute(AttributeDeclaration),
}

impl Statement {
    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            Statement::Expression(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_variable(&self) -> Option<&VariableDeclaration> {
        match self {
            Statement::Variable(v) => Some(v),
            _ => None,
        }
    }

    /// The statement blocks nested directly inside this statement.
    pub fn blocks(&self) -> Vec<&SyntaxList<Statement>> {
        let mut out = Vec::new();
        match self {
            Statement::If(s) => {
                out.extend(s.if_branch().statements());
                out.extend(s.elif_branches().filter_map(IfBranch::statements));
                out.extend(s.else_branch().and_then(ElseBranch::statements));
            }
            Statement::For(s) => out.extend(s.statements()),
            Statement::While(s) => out.extend(s.statements()),
            Statement::Match(s) => out.extend(s.cases().filter_map(MatchCase::statements)),
            _ => {}
        }
        out
    }
}

impl SyntaxNode for Statement {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        match self {
            Statement::Expression(s) => s.walk(visit),
            Statement::Variable(s) => s.walk(visit),
            Statement::If(s) => s.walk(visit),
            Statement::For(s) => s.walk(visit),
            Statement::While(s) => s.walk(visit),
            Statement::Match(s) => s.walk(visit),
            Statement::Return(s) => s.walk(visit),
            Statement::Pass => visit(Leaf::Keyword(Keyword::Pass)),
            Statement::Break => visit(Leaf::Keyword(Keyword::Break)),
            Statement::Continue => visit(Leaf::Keyword(Keyword::Continue)),
            Statement::Breakpoint => visit(Leaf::Keyword(Keyword::Breakpoint)),
            Statement::Attribute(s) => s.walk(visit),
        }
    }
}

impl BlockItem for Statement {
    const NAME: &'static str = "Statements";
    const SEPARATOR: Punct = Punct::Semicolon;

    fn starts(c: char) -> bool {
        c == '@' || starts_expression(c)
    }

    fn reader(_cx: &ReadContext) -> Box<dyn Resolve> {
        Box::new(StatementResolver::new())
    }

    fn from_resolved(value: Resolved) -> Option<Self> {
        match value {
            Resolved::Statement(s) => Some(s),
            _ => None,
        }
    }

    fn into_resolved(list: SyntaxList<Self>) -> Resolved {
        Resolved::Statements(list)
    }

    fn shares_line(&self) -> bool {
        matches!(self, Statement::Attribute(_))
    }
}

/// Decides which statement starts here.
///
/// A leading word is buffered until it is complete, then replayed into the
/// reader for the statement it names, or into an expression.
pub(crate) struct StatementResolver {
    word: Pending,
    result: Option<Statement>,
}

impl StatementResolver {
    pub fn new() -> Self {
        Self {
            word: Pending::new(),
            result: None,
        }
    }

    fn dispatch_word(&mut self) -> Step {
        let indent = self
            .word
            .first_line()
            .map(|line| line.indentation)
            .unwrap_or_default();
        let reader: Box<dyn Resolve> = match self.word.text().as_str() {
            "var" | "const" => Box::new(VariableReader::local(indent)),
            "if" => Box::new(branch::IfReader::new(indent)),
            "for" => Box::new(loops::ForReader::new(indent)),
            "while" => Box::new(loops::WhileReader::new(indent)),
            "match" => Box::new(matching::MatchReader::new(indent)),
            "return" => Box::new(ReturnReader::new()),
            simple @ ("pass" | "break" | "continue" | "breakpoint") => {
                self.result = Some(match simple {
                    "pass" => Statement::Pass,
                    "break" => Statement::Break,
                    "continue" => Statement::Continue,
                    _ => Statement::Breakpoint,
                });
                self.word.take();
                return Step::Pop;
            }
            _ => Box::new(ExpressionResolver::new(ExpressionFlags::empty())),
        };
        Step::PushReplay(reader, self.word.take())
    }
}

impl Resolve for StatementResolver {
    fn name(&self) -> &'static str {
        "Statement"
    }

    fn handle_char(&mut self, c: char, cx: &ReadContext) -> Result<Step, ParseError> {
        if self.result.is_some() {
            return Ok(Step::Pop);
        }
        if !self.word.is_empty() {
            if is_ident_continue(c) {
                self.word.push_char(c, cx);
                return Ok(Step::Consumed);
            }
            return Ok(self.dispatch_word());
        }
        if c == '@' {
            return Ok(Step::Push(Box::new(AttributeReader::new())));
        }
        if is_ident_start(c) {
            self.word.push_char(c, cx);
            return Ok(Step::Consumed);
        }
        if starts_expression(c) {
            return Ok(Step::Push(Box::new(ExpressionResolver::new(
                ExpressionFlags::empty(),
            ))));
        }
        Ok(Step::Pop)
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.result.is_none() && !self.word.is_empty() {
            return Ok(self.dispatch_word());
        }
        Ok(Step::Pop)
    }

    fn handle_eof(&mut self, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.result.is_none() && !self.word.is_empty() {
            return Ok(self.dispatch_word());
        }
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        self.result = match value {
            Resolved::Skipped => return Ok(()),
            Resolved::Statement(s) => Some(s),
            Resolved::Expression(e) => Some(Statement::Expression(e)),
            Resolved::Member(ClassMember::Attribute(a)) => Some(Statement::Attribute(a)),
            other => {
                return Err(ParseError::invalid_state(
                    "Statement",
                    "Dispatch",
                    other.kind_name(),
                ));
            }
        };
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(match self.result {
            Some(s) => Resolved::Statement(s),
            None => Resolved::Skipped,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum ReturnState {
    Return,
    Value,
    Completed,
}

impl_form_state!(ReturnState, "ReturnStatement", Return);

/// `return` or `return value`
#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStatement {
    pub(crate) form: Form<ReturnState>,
    pub(crate) value: Option<Expression>,
}

impl ReturnStatement {
    pub fn value(&self) -> Option<&Expression> {
        self.value.as_ref()
    }
}

impl SyntaxNode for ReturnStatement {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(ReturnState::Return, Some(Leaf::Keyword(Keyword::Return)))
            .slot(ReturnState::Value, &self.value)
            .finish();
    }
}

struct ReturnReader {
    form: Form<ReturnState>,
    value: Option<Expression>,
}

impl ReturnReader {
    fn new() -> Self {
        Self {
            form: Form::new(),
            value: None,
        }
    }
}

impl Resolve for ReturnReader {
    fn name(&self) -> &'static str {
        "ReturnStatement"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            ReturnState::Return => Ok(Step::Push(Box::new(KeywordReader::new(Keyword::Return)))),
            ReturnState::Value if is_space(c) => {
                self.form.add_space(c);
                Ok(Step::Consumed)
            }
            ReturnState::Value if starts_expression(c) => Ok(Step::Push(
                Box::new(ExpressionResolver::new(ExpressionFlags::empty())),
            )),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn handle_continuation(
        &mut self,
        ending: LineEnding,
        _cx: &ReadContext,
    ) -> Result<Step, ParseError> {
        if self.form.state() != ReturnState::Value {
            return Ok(Step::Pop);
        }
        self.form.add_before_active_token(Trivia::Continuation(ending));
        Ok(Step::Consumed)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (ReturnState::Return, Resolved::Keyword(Keyword::Return)) => {
                self.form.set_state(ReturnState::Value)
            }
            (ReturnState::Value, Resolved::Expression(e)) => {
                self.value = Some(e);
                self.form.complete();
                Ok(())
            }
            (_, other) => Err(self.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::Statement(Statement::Return(ReturnStatement {
            form: self.form,
            value: self.value,
        })))
    }
}

impl_display!(Statement, ReturnStatement);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn statement(source: &str) -> Statement {
        Parser::new().parse_statement(source).unwrap()
    }

    #[test]
    fn keyword_statements() {
        assert_eq!(statement("pass"), Statement::Pass);
        assert_eq!(statement("break"), Statement::Break);
        assert_eq!(statement("continue"), Statement::Continue);
        assert_eq!(statement("breakpoint"), Statement::Breakpoint);
    }

    #[test]
    fn words_that_start_with_keywords_are_expressions() {
        let s = statement("passed = true");
        let e = s.as_expression().unwrap();
        assert_eq!(e.to_string(), "passed = true");
        assert!(e.as_dual().is_some());
    }

    #[test]
    fn return_with_and_without_value() {
        match statement("return  a + 1") {
            Statement::Return(r) => {
                assert_eq!(r.value().unwrap().to_string(), "a + 1");
                assert_eq!(r.to_string(), "return  a + 1");
            }
            other => panic!("unexpected {other:?}"),
        }
        match statement("return") {
            Statement::Return(r) => assert!(r.value().is_none()),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn statements_on_one_line() {
        let list = Parser::new().parse_statements("a = 1; b = 2;c()").unwrap();
        assert_eq!(list.len(), 3);
        assert_eq!(list.to_string(), "a = 1; b = 2;c()");
    }

    #[test]
    fn attribute_shares_the_line() {
        let list = Parser::new()
            .parse_statements("@warning_ignore(\"unused\") var x = 1")
            .unwrap();
        assert_eq!(list.len(), 2);
        assert!(matches!(list.first(), Some(Statement::Attribute(_))));
        assert!(matches!(list.last(), Some(Statement::Variable(_))));
    }
}
