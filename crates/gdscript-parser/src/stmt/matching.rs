//! `match` statements and their cases.

use gdscript_core::ParseError;
use num_enum::IntoPrimitive;

use super::Statement;
use crate::block::{BlockItem, BlockReader, header_colon};
use crate::expr::{Expression, ExpressionFlags, ExpressionResolver, starts_expression};
use crate::form::{Form, impl_form_state};
use crate::list::SyntaxList;
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    InvalidTokenReader, Keyword, KeywordReader, LineEnding, Punct, Terminator, is_ident_start,
    is_space,
};

const PATTERN_FLAGS: ExpressionFlags = ExpressionFlags::PATTERN.union(ExpressionFlags::NO_ASSIGNMENT);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum MatchState {
    Match,
    Value,
    Colon,
    Cases,
    Completed,
}

impl_form_state!(MatchState, "MatchStatement", Match);

/// `match value:` followed by an indented block of cases.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchStatement {
    pub(crate) form: Form<MatchState>,
    pub(crate) value: Option<Expression>,
    pub(crate) has_colon: bool,
    pub(crate) cases: Option<SyntaxList<MatchCase>>,
}

impl MatchStatement {
    pub fn value(&self) -> Option<&Expression> {
        self.value.as_ref()
    }

    pub fn cases(&self) -> impl Iterator<Item = &MatchCase> {
        self.cases.iter().flat_map(SyntaxList::items)
    }
}

impl SyntaxNode for MatchStatement {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(MatchState::Match, Some(Leaf::Keyword(Keyword::Match)))
            .slot(MatchState::Value, &self.value)
            .leaf(
                MatchState::Colon,
                self.has_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(MatchState::Cases, &self.cases)
            .finish();
    }
}

pub(crate) struct MatchReader {
    form: Form<MatchState>,
    indent: usize,
    value: Option<Expression>,
    cases: Option<SyntaxList<MatchCase>>,
}

impl MatchReader {
    pub fn new(indent: usize) -> Self {
        Self {
            form: Form::new(),
            indent,
            value: None,
            cases: None,
        }
    }
}

impl Resolve for MatchReader {
    fn name(&self) -> &'static str {
        "MatchStatement"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            MatchState::Match => Ok(Step::Push(Box::new(KeywordReader::new(Keyword::Match)))),
            MatchState::Value if starts_expression(c) => Ok(Step::Push(
                Box::new(ExpressionResolver::new(ExpressionFlags::empty())),
            )),
            MatchState::Value | MatchState::Colon => {
                header_colon(&mut self.form, c, MatchState::Cases)
            }
            MatchState::Cases => Ok(Step::Push(Box::new(BlockReader::<MatchCase>::nested(
                self.indent,
            )))),
            MatchState::Completed => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            MatchState::Cases => Ok(Step::Push(Box::new(BlockReader::<MatchCase>::nested(
                self.indent,
            )))),
            _ => Ok(Step::Pop),
        }
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (MatchState::Match, Resolved::Keyword(Keyword::Match)) => {
                self.form.set_state(MatchState::Value)
            }
            (MatchState::Value, Resolved::Expression(e)) => {
                self.value = Some(e);
                self.form.set_state(MatchState::Colon)
            }
            (_, Resolved::Trivia(t)) => {
                self.form.add_before_active_token(t);
                Ok(())
            }
            (MatchState::Cases, Resolved::MatchCases(cases)) => {
                self.cases = Some(cases);
                self.form.complete();
                Ok(())
            }
            (_, other) => Err(self.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let has_colon = self.form.state() >= MatchState::Cases;
        Ok(Resolved::Statement(Statement::Match(MatchStatement {
            form: self.form,
            value: self.value,
            has_colon,
            cases: self.cases,
        })))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum MatchCaseState {
    Patterns,
    When,
    Guard,
    Colon,
    Statements,
    Completed,
}

impl_form_state!(MatchCaseState, "MatchCase", Patterns);

/// One arm of a `match`: `pattern, pattern when guard: ...`
#[derive(Debug, Clone, PartialEq)]
pub struct MatchCase {
    pub(crate) form: Form<MatchCaseState>,
    pub(crate) patterns: SyntaxList<Expression>,
    pub(crate) has_when: bool,
    pub(crate) guard: Option<Expression>,
    pub(crate) has_colon: bool,
    pub(crate) statements: Option<SyntaxList<Statement>>,
}

impl MatchCase {
    pub fn patterns(&self) -> impl DoubleEndedIterator<Item = &Expression> {
        self.patterns.items()
    }

    /// The `when` condition, if the case has one.
    pub fn guard(&self) -> Option<&Expression> {
        self.guard.as_ref()
    }

    pub fn statements(&self) -> Option<&SyntaxList<Statement>> {
        self.statements.as_ref()
    }

    /// Whether any pattern is the `_` wildcard.
    pub fn is_wildcard(&self) -> bool {
        self.patterns()
            .any(|p| matches!(p, Expression::MatchWildcard(_)))
    }
}

impl SyntaxNode for MatchCase {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .slot(MatchCaseState::Patterns, &self.patterns)
            .leaf(
                MatchCaseState::When,
                self.has_when.then_some(Leaf::Keyword(Keyword::When)),
            )
            .slot(MatchCaseState::Guard, &self.guard)
            .leaf(
                MatchCaseState::Colon,
                self.has_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(MatchCaseState::Statements, &self.statements)
            .finish();
    }
}

impl BlockItem for MatchCase {
    const NAME: &'static str = "MatchCases";
    const SEPARATOR: Punct = Punct::Semicolon;

    fn starts(c: char) -> bool {
        starts_expression(c)
    }

    fn reader(cx: &ReadContext) -> Box<dyn Resolve> {
        Box::new(MatchCaseReader::new(cx.indentation()))
    }

    fn from_resolved(value: Resolved) -> Option<Self> {
        match value {
            Resolved::MatchCase(case) => Some(case),
            _ => None,
        }
    }

    fn into_resolved(list: SyntaxList<Self>) -> Resolved {
        Resolved::MatchCases(list)
    }
}

struct MatchCaseReader {
    form: Form<MatchCaseState>,
    indent: usize,
    patterns: SyntaxList<Expression>,
    expect_pattern: bool,
    has_when: bool,
    guard: Option<Expression>,
    statements: Option<SyntaxList<Statement>>,
}

impl MatchCaseReader {
    fn new(indent: usize) -> Self {
        Self {
            form: Form::new(),
            indent,
            patterns: SyntaxList::new(),
            expect_pattern: true,
            has_when: false,
            guard: None,
            statements: None,
        }
    }

    fn handle_pattern_char(&mut self, c: char) -> Result<Step, ParseError> {
        if is_space(c) {
            self.patterns.push_space(c);
            return Ok(Step::Consumed);
        }
        match c {
            ',' => {
                self.patterns.push_separator(Punct::Comma);
                self.expect_pattern = true;
                Ok(Step::Consumed)
            }
            ':' | '#' => header_colon(&mut self.form, c, MatchCaseState::Statements),
            c if self.expect_pattern && starts_expression(c) => {
                Ok(Step::Push(Box::new(ExpressionResolver::new(PATTERN_FLAGS))))
            }
            c if !self.expect_pattern && is_ident_start(c) => {
                self.form.set_state(MatchCaseState::When)?;
                Ok(Step::Push(Box::new(KeywordReader::new(Keyword::When))))
            }
            _ => Ok(Step::Push(Box::new(InvalidTokenReader::new(
                Terminator::chars(":,"),
            )))),
        }
    }
}

impl Resolve for MatchCaseReader {
    fn name(&self) -> &'static str {
        "MatchCase"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            MatchCaseState::Patterns => self.handle_pattern_char(c),
            MatchCaseState::When if is_ident_start(c) => {
                Ok(Step::Push(Box::new(KeywordReader::new(Keyword::When))))
            }
            MatchCaseState::Guard if starts_expression(c) => Ok(
                Step::Push(Box::new(ExpressionResolver::new(ExpressionFlags::empty()))),
            ),
            MatchCaseState::When | MatchCaseState::Guard | MatchCaseState::Colon => {
                header_colon(&mut self.form, c, MatchCaseState::Statements)
            }
            MatchCaseState::Statements => Ok(Step::Push(Box::new(
                BlockReader::<Statement>::nested(self.indent),
            ))),
            MatchCaseState::Completed => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            MatchCaseState::Statements => Ok(Step::Push(Box::new(
                BlockReader::<Statement>::nested(self.indent),
            ))),
            _ => Ok(Step::Pop),
        }
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (MatchCaseState::Patterns, Resolved::Expression(pattern)) => {
                self.patterns.push_item(pattern);
                self.expect_pattern = false;
                Ok(())
            }
            (MatchCaseState::Patterns, Resolved::Trivia(t)) => {
                self.patterns.push_trivia(t);
                Ok(())
            }
            (MatchCaseState::When, Resolved::Keyword(Keyword::When)) => {
                self.has_when = true;
                self.form.set_state(MatchCaseState::Guard)
            }
            (MatchCaseState::Guard, Resolved::Expression(guard)) => {
                self.guard = Some(guard);
                self.form.set_state(MatchCaseState::Colon)
            }
            (_, Resolved::Trivia(t)) => {
                self.form.add_before_active_token(t);
                Ok(())
            }
            (MatchCaseState::Statements, Resolved::Statements(list)) => {
                self.statements = Some(list);
                self.form.complete();
                Ok(())
            }
            (_, other) => Err(self.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let has_colon = self.form.state() >= MatchCaseState::Statements;
        Ok(Resolved::MatchCase(MatchCase {
            form: self.form,
            patterns: self.patterns,
            has_when: self.has_when,
            guard: self.guard,
            has_colon,
            statements: self.statements,
        }))
    }
}

impl_display!(MatchStatement, MatchCase);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    const SOURCE: &str = "match x:\n\t1, 2:\n\t\tpass\n\t[var a, ..] when a > 0:\n\t\tprint(a)\n\t{\"k\": var v}:\n\t\tpass\n\t_:\n\t\tpass";

    fn parse() -> MatchStatement {
        match Parser::new().parse_statement(SOURCE).unwrap() {
            Statement::Match(m) => m,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn round_trip() {
        assert_eq!(parse().to_string(), SOURCE);
    }

    #[test]
    fn cases_and_patterns() {
        let m = parse();
        assert_eq!(m.value().unwrap().to_string(), "x");
        let cases: Vec<_> = m.cases().collect();
        assert_eq!(cases.len(), 4);
        assert_eq!(cases[0].patterns().count(), 2);
        assert_eq!(cases[1].guard().unwrap().to_string(), "a > 0");
        let Some(Expression::Array(array)) = cases[1].patterns().next() else {
            panic!("expected array pattern");
        };
        let items: Vec<_> = array.items().collect();
        assert!(matches!(items[0], Expression::MatchBinding(b) if b.name().unwrap().as_str() == "a"));
        assert_eq!(items[1], &Expression::MatchRest);
        assert!(cases[3].is_wildcard());
        assert!(!m.has_invalid_tokens());
    }
}
