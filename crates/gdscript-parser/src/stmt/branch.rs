//! `if` / `elif` / `else`.

use gdscript_core::ParseError;
use num_enum::IntoPrimitive;

use super::Statement;
use crate::block::{BlockReader, header_colon};
use crate::expr::{Expression, ExpressionFlags, ExpressionResolver, starts_expression};
use crate::form::{Form, impl_form_state};
use crate::list::SyntaxList;
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{Pending, ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    Keyword, KeywordReader, LineEnding, Punct, is_ident_continue, is_ident_start, is_space,
};

/// An `if` with its `elif` and `else` branches.
#[derive(Debug, Clone, PartialEq)]
pub struct IfStatement {
    pub(crate) if_branch: IfBranch,
    /// The `elif` branches, with the line breaks and indentation in front
    /// of each `elif` and of the `else`.
    pub(crate) elif_branches: SyntaxList<IfBranch>,
    pub(crate) else_branch: Option<ElseBranch>,
}

impl IfStatement {
    pub fn if_branch(&self) -> &IfBranch {
        &self.if_branch
    }

    pub fn elif_branches(&self) -> impl DoubleEndedIterator<Item = &IfBranch> {
        self.elif_branches.items()
    }

    pub fn else_branch(&self) -> Option<&ElseBranch> {
        self.else_branch.as_ref()
    }
}

impl SyntaxNode for IfStatement {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.if_branch.walk(visit);
        self.elif_branches.walk(visit);
        self.else_branch.walk(visit);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum IfBranchState {
    Keyword,
    Condition,
    Colon,
    Statements,
    Completed,
}

impl_form_state!(IfBranchState, "IfBranch", Keyword);

/// `if condition: ...` or `elif condition: ...`
#[derive(Debug, Clone, PartialEq)]
pub struct IfBranch {
    pub(crate) form: Form<IfBranchState>,
    pub(crate) keyword: Keyword,
    pub(crate) condition: Option<Expression>,
    pub(crate) has_colon: bool,
    pub(crate) statements: Option<SyntaxList<Statement>>,
}

impl IfBranch {
    /// `if` or `elif`
    pub fn keyword(&self) -> Keyword {
        self.keyword
    }

    pub fn condition(&self) -> Option<&Expression> {
        self.condition.as_ref()
    }

    pub fn statements(&self) -> Option<&SyntaxList<Statement>> {
        self.statements.as_ref()
    }
}

impl SyntaxNode for IfBranch {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(IfBranchState::Keyword, Some(Leaf::Keyword(self.keyword)))
            .slot(IfBranchState::Condition, &self.condition)
            .leaf(
                IfBranchState::Colon,
                self.has_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(IfBranchState::Statements, &self.statements)
            .finish();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum ElseBranchState {
    Keyword,
    Colon,
    Statements,
    Completed,
}

impl_form_state!(ElseBranchState, "ElseBranch", Keyword);

/// `else: ...`
#[derive(Debug, Clone, PartialEq)]
pub struct ElseBranch {
    pub(crate) form: Form<ElseBranchState>,
    pub(crate) has_colon: bool,
    pub(crate) statements: Option<SyntaxList<Statement>>,
}

impl ElseBranch {
    pub fn statements(&self) -> Option<&SyntaxList<Statement>> {
        self.statements.as_ref()
    }
}

impl SyntaxNode for ElseBranch {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(ElseBranchState::Keyword, Some(Leaf::Keyword(Keyword::Else)))
            .leaf(
                ElseBranchState::Colon,
                self.has_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(ElseBranchState::Statements, &self.statements)
            .finish();
    }
}

impl_display!(IfStatement, IfBranch, ElseBranch);

/// Reads an `if` statement.
///
/// After each branch the next line is buffered until its first word shows
/// whether it continues the statement with `elif` or `else` at the same
/// indentation. Anything else is handed back to the enclosing block.
pub(crate) struct IfReader {
    indent: usize,
    if_branch: Option<IfBranch>,
    elif_branches: SyntaxList<IfBranch>,
    else_branch: Option<ElseBranch>,
    pending: Pending,
    word_start: Option<usize>,
}

impl IfReader {
    pub fn new(indent: usize) -> Self {
        Self {
            indent,
            if_branch: None,
            elif_branches: SyntaxList::new(),
            else_branch: None,
            pending: Pending::new(),
            word_start: None,
        }
    }

    fn decide_word(&mut self, start: usize) -> Step {
        self.word_start = None;
        let branch: Box<dyn Resolve> = match self.pending.text_from(start).as_str() {
            "elif" => Box::new(IfBranchReader::new(Keyword::Elif, self.indent)),
            "else" => Box::new(ElseBranchReader::new(self.indent)),
            _ => return Step::PopReplay(self.pending.take()),
        };
        let word = self.pending.split_off(start);
        let lead = self.pending.take().into_trivia();
        self.elif_branches.extend_trivia(lead);
        Step::PushReplay(branch, word)
    }
}

impl Resolve for IfReader {
    fn name(&self) -> &'static str {
        "IfStatement"
    }

    fn handle_char(&mut self, c: char, cx: &ReadContext) -> Result<Step, ParseError> {
        if self.if_branch.is_none() {
            return Ok(Step::Push(Box::new(IfBranchReader::new(
                Keyword::If,
                self.indent,
            ))));
        }
        if self.else_branch.is_some() {
            return Ok(Step::PopReplay(self.pending.take()));
        }
        if let Some(start) = self.word_start {
            if is_ident_continue(c) {
                self.pending.push_char(c, cx);
                return Ok(Step::Consumed);
            }
            return Ok(self.decide_word(start));
        }
        if is_space(c) {
            self.pending.push_char(c, cx);
            return Ok(Step::Consumed);
        }
        if is_ident_start(c) && cx.at_line_start() && cx.indentation() == self.indent {
            self.word_start = Some(self.pending.len());
            self.pending.push_char(c, cx);
            return Ok(Step::Consumed);
        }
        Ok(Step::PopReplay(self.pending.take()))
    }

    fn handle_new_line(&mut self, ending: LineEnding, cx: &ReadContext) -> Result<Step, ParseError> {
        if self.else_branch.is_some() {
            return Ok(Step::PopReplay(self.pending.take()));
        }
        if let Some(start) = self.word_start {
            return Ok(self.decide_word(start));
        }
        self.pending.push_new_line(ending, cx);
        Ok(Step::Consumed)
    }

    fn handle_continuation(
        &mut self,
        _ending: LineEnding,
        cx: &ReadContext,
    ) -> Result<Step, ParseError> {
        self.handle_eof(cx)
    }

    fn handle_eof(&mut self, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.word_start {
            Some(start) if self.else_branch.is_none() => Ok(self.decide_word(start)),
            _ => Ok(Step::PopReplay(self.pending.take())),
        }
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match value {
            Resolved::Skipped => {}
            Resolved::IfBranch(branch) if self.if_branch.is_none() => {
                self.if_branch = Some(branch);
            }
            Resolved::IfBranch(branch) => self.elif_branches.push_item(branch),
            Resolved::ElseBranch(branch) => self.else_branch = Some(branch),
            other => {
                return Err(ParseError::invalid_state(
                    "IfStatement",
                    "Branches",
                    other.kind_name(),
                ));
            }
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let if_branch = self
            .if_branch
            .ok_or_else(|| ParseError::invalid_state("IfStatement", "Completed", "no branch"))?;
        Ok(Resolved::Statement(Statement::If(IfStatement {
            if_branch,
            elif_branches: self.elif_branches,
            else_branch: self.else_branch,
        })))
    }
}

/// Reads one `if` or `elif` branch.
struct IfBranchReader {
    form: Form<IfBranchState>,
    keyword: Keyword,
    indent: usize,
    condition: Option<Expression>,
    statements: Option<SyntaxList<Statement>>,
}

impl IfBranchReader {
    fn new(keyword: Keyword, indent: usize) -> Self {
        Self {
            form: Form::new(),
            keyword,
            indent,
            condition: None,
            statements: None,
        }
    }
}

impl Resolve for IfBranchReader {
    fn name(&self) -> &'static str {
        "IfBranch"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            IfBranchState::Keyword => Ok(Step::Push(Box::new(KeywordReader::new(self.keyword)))),
            IfBranchState::Condition if starts_expression(c) => Ok(
                Step::Push(Box::new(ExpressionResolver::new(ExpressionFlags::empty()))),
            ),
            IfBranchState::Condition | IfBranchState::Colon => {
                header_colon(&mut self.form, c, IfBranchState::Statements)
            }
            IfBranchState::Statements => Ok(Step::Push(Box::new(
                BlockReader::<Statement>::nested(self.indent),
            ))),
            IfBranchState::Completed => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            IfBranchState::Statements => Ok(Step::Push(Box::new(
                BlockReader::<Statement>::nested(self.indent),
            ))),
            _ => Ok(Step::Pop),
        }
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (IfBranchState::Keyword, Resolved::Keyword(_)) => {
                self.form.set_state(IfBranchState::Condition)
            }
            (IfBranchState::Condition, Resolved::Expression(e)) => {
                self.condition = Some(e);
                self.form.set_state(IfBranchState::Colon)
            }
            (_, Resolved::Trivia(t)) => {
                self.form.add_before_active_token(t);
                Ok(())
            }
            (IfBranchState::Statements, Resolved::Statements(list)) => {
                self.statements = Some(list);
                self.form.complete();
                Ok(())
            }
            (_, other) => Err(self.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let has_colon = self.form.state() >= IfBranchState::Statements;
        Ok(Resolved::IfBranch(IfBranch {
            form: self.form,
            keyword: self.keyword,
            condition: self.condition,
            has_colon,
            statements: self.statements,
        }))
    }
}

/// Reads an `else` branch.
struct ElseBranchReader {
    form: Form<ElseBranchState>,
    indent: usize,
    statements: Option<SyntaxList<Statement>>,
}

impl ElseBranchReader {
    fn new(indent: usize) -> Self {
        Self {
            form: Form::new(),
            indent,
            statements: None,
        }
    }
}

impl Resolve for ElseBranchReader {
    fn name(&self) -> &'static str {
        "ElseBranch"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            ElseBranchState::Keyword => Ok(Step::Push(Box::new(KeywordReader::new(Keyword::Else)))),
            ElseBranchState::Colon => header_colon(&mut self.form, c, ElseBranchState::Statements),
            ElseBranchState::Statements => Ok(Step::Push(Box::new(
                BlockReader::<Statement>::nested(self.indent),
            ))),
            ElseBranchState::Completed => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            ElseBranchState::Statements => Ok(Step::Push(Box::new(
                BlockReader::<Statement>::nested(self.indent),
            ))),
            _ => Ok(Step::Pop),
        }
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (ElseBranchState::Keyword, Resolved::Keyword(Keyword::Else)) => {
                self.form.set_state(ElseBranchState::Colon)
            }
            (_, Resolved::Trivia(t)) => {
                self.form.add_before_active_token(t);
                Ok(())
            }
            (ElseBranchState::Statements, Resolved::Statements(list)) => {
                self.statements = Some(list);
                self.form.complete();
                Ok(())
            }
            (_, other) => Err(self.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let has_colon = self.form.state() >= ElseBranchState::Statements;
        Ok(Resolved::ElseBranch(ElseBranch {
            form: self.form,
            has_colon,
            statements: self.statements,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    fn if_statement(source: &str) -> IfStatement {
        match Parser::new().parse_statement(source).unwrap() {
            Statement::If(s) => s,
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn full_chain() {
        let source = "if a:\n\tx()\nelif b:\n\ty()\nelif c: z()\nelse:\n\tpass";
        let s = if_statement(source);
        assert_eq!(s.to_string(), source);
        assert_eq!(s.if_branch().condition().unwrap().to_string(), "a");
        let conditions: Vec<_> = s
            .elif_branches()
            .map(|b| b.condition().unwrap().to_string())
            .collect();
        assert_eq!(conditions, ["b", "c"]);
        let body = s.else_branch().unwrap().statements().unwrap();
        assert_eq!(body.first(), Some(&Statement::Pass));
    }

    #[test]
    fn inline_branches() {
        let source = "if a: return 1\nelse: return 2";
        let s = if_statement(source);
        assert_eq!(s.to_string(), source);
        assert!(s.else_branch().is_some());
    }

    #[test]
    fn deeper_else_belongs_elsewhere() {
        let list = Parser::new()
            .parse_statements("if a:\n\tif b:\n\t\tpass\n\telse:\n\t\tpass\nx()")
            .unwrap();
        assert_eq!(list.len(), 2);
        let Some(Statement::If(outer)) = list.first() else {
            panic!("expected if");
        };
        assert!(outer.else_branch().is_none());
        let inner = outer.if_branch().statements().unwrap().first().unwrap();
        assert!(matches!(inner, Statement::If(s) if s.else_branch().is_some()));
    }

    #[test]
    fn missing_colon_is_kept() {
        let list = Parser::new().parse_statements("if a\n\tpass").unwrap();
        assert_eq!(list.to_string(), "if a\n\tpass");
        let Some(Statement::If(s)) = list.first() else {
            panic!("expected if");
        };
        assert!(!s.if_branch().has_colon);
    }
}
