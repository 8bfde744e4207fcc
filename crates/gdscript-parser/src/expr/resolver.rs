//! The expression resolver.
//!
//! Reads one expression a character at a time. Operands are dispatched on
//! their first character; whatever follows an operand is buffered until it
//! is clear whether it continues the expression (an operator, a postfix, a
//! ternary) or belongs to the enclosing node, in which case it is handed
//! back untouched.

use gdscript_core::ParseError;

use super::chain::{self, ChainItem, missing_operand};
use super::ops::{DualOperator, DualOperatorKind, SingleOperatorKind, is_symbol_prefix};
use super::readers::{GetNodeReader, MatchBindingReader};
use super::{
    CallExpression, CallState, Expression, ExpressionFlags, IndexerExpression, IndexerState,
    KeyValue, MemberExpression, MemberState,
};
use crate::decl::MethodReader;
use crate::form::Form;
use crate::list::BracketedListReader;
use crate::reader::{Pending, ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    CommentReader, Identifier, IdentifierReader, InvalidToken, InvalidTokenReader, LineEnding,
    NumberReader, Punct, Space, StringReader, Terminator, Trivia, is_ident_continue, is_ident_start,
    is_operator_char, is_space,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Expecting an operand or a prefix operator.
    Operand,
    /// Reading a word in operand position.
    OperandWord,
    /// After a `.` in operand position.
    Dot,
    /// After an operand; buffering until something decides.
    AfterOperand,
    /// Inside a comment after an operand. Only inside brackets.
    Comment,
    /// Reading an operator symbol.
    Symbol,
    /// Reading a word after an operand.
    Word,
    /// After `is` or `not`, before a possible second word.
    PairGap,
    /// Reading the word after `is` or `not`.
    PairWord,
    /// After `.`, before the member name.
    MemberName,
    /// After the `if` of a ternary, before its condition.
    TernaryCondition,
    /// After a ternary's condition, before `else`.
    TernaryElse,
    /// Reading the word after a ternary's condition.
    TernaryElseWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pair {
    Is,
    Not,
}

/// An operand taken back off the chain while its postfix is read.
#[derive(Debug)]
enum Held {
    Call {
        lead: Vec<Trivia>,
        callee: Expression,
        gap: Vec<Trivia>,
    },
    Index {
        lead: Vec<Trivia>,
        target: Expression,
        gap: Vec<Trivia>,
    },
    Member {
        lead: Vec<Trivia>,
        member: MemberExpression,
    },
}

#[derive(Debug)]
struct TernaryParts {
    lead: Vec<Trivia>,
    condition_lead: Vec<Trivia>,
    condition: Option<Expression>,
}

/// Reads one expression. Pushed at a character that starts an expression.
pub(crate) struct ExpressionResolver {
    flags: ExpressionFlags,
    phase: Phase,
    chain: Vec<ChainItem>,
    /// Trivia in front of the next chain item.
    lead: Vec<Trivia>,
    /// Raw inputs not yet known to belong to this expression.
    pending: Pending,
    /// Where the current symbol or word starts in `pending`.
    mark: usize,
    pair: Pair,
    /// Where the gap after the first word of a pair starts in `pending`.
    gap_start: usize,
    /// Where the second word of a pair starts in `pending`.
    word_start: usize,
    held: Option<Held>,
    ternary: Option<TernaryParts>,
}

impl ExpressionResolver {
    pub fn new(flags: ExpressionFlags) -> Self {
        Self {
            flags,
            phase: Phase::Operand,
            chain: Vec::new(),
            lead: Vec::new(),
            pending: Pending::new(),
            mark: 0,
            pair: Pair::Is,
            gap_start: 0,
            word_start: 0,
            held: None,
            ternary: None,
        }
    }

    fn in_brackets(&self) -> bool {
        self.flags.contains(ExpressionFlags::IN_BRACKETS)
    }

    fn push_lead(&mut self, trivia: Trivia) {
        if let (Trivia::Space(space), Some(Trivia::Space(prev))) = (&trivia, self.lead.last_mut()) {
            prev.push_str(space.as_str());
            return;
        }
        self.lead.push(trivia);
    }

    fn push_operand(&mut self, expr: Expression) {
        let lead = std::mem::take(&mut self.lead);
        self.chain.push(ChainItem::Operand { lead, expr });
        self.phase = Phase::AfterOperand;
    }

    /// Take the last operand back off the chain.
    fn take_operand(&mut self) -> Result<(Vec<Trivia>, Expression), ParseError> {
        match self.chain.pop() {
            Some(ChainItem::Operand { lead, expr }) => Ok((lead, expr)),
            _ => Err(ParseError::invalid_state(
                "ExpressionResolver",
                self.phase,
                "postfix",
            )),
        }
    }

    /// Trivia buffered in front of `mark`, dropping the rest of the buffer.
    fn lead_before_mark(&mut self) -> Vec<Trivia> {
        let mut pending = self.pending.take();
        let _word = pending.split_off(self.mark);
        pending.into_trivia()
    }

    fn commit_binary(&mut self, op: DualOperator) {
        let lead = self.lead_before_mark();
        self.chain.push(ChainItem::Binary { lead, op });
        self.phase = Phase::Operand;
    }

    // ---- operand position ----

    fn handle_operand(&mut self, c: char, cx: &ReadContext) -> Result<Step, ParseError> {
        if is_space(c) {
            self.push_lead(Trivia::Space(Space::from_char(c)));
            return Ok(Step::Consumed);
        }
        if c.is_ascii_digit() {
            return Ok(Step::Push(Box::new(NumberReader::new())));
        }
        if is_ident_start(c) {
            self.pending.push_char(c, cx);
            self.phase = Phase::OperandWord;
            return Ok(Step::Consumed);
        }
        if let Some(op) = SingleOperatorKind::from_char(c) {
            let lead = std::mem::take(&mut self.lead);
            self.chain.push(ChainItem::Prefix { lead, op });
            return Ok(Step::Consumed);
        }
        let inner = self.flags & ExpressionFlags::PATTERN;
        match c {
            '"' | '\'' => Ok(Step::Push(Box::new(StringReader::new()))),
            '&' | '^' => Ok(Step::Push(Box::new(StringReader::prefixed()))),
            '$' | '%' => Ok(Step::Push(Box::new(GetNodeReader::new()))),
            '[' => Ok(Step::Push(Box::new(BracketedListReader::<Expression>::new(
                Punct::OpenBracket,
                inner,
            )))),
            '(' => Ok(Step::Push(Box::new(BracketedListReader::<Expression>::new(
                Punct::OpenParen,
                inner,
            )))),
            '{' => Ok(Step::Push(Box::new(BracketedListReader::<KeyValue>::new(
                Punct::OpenBrace,
                inner,
            )))),
            '.' => {
                self.pending.push_char(c, cx);
                self.phase = Phase::Dot;
                Ok(Step::Consumed)
            }
            '#' if self.in_brackets() => Ok(Step::Push(Box::new(CommentReader::new()))),
            _ if self.chain.is_empty() || matches!(c, ',' | ')' | ']' | '}' | ':' | ';' | '=' | '#') => {
                Ok(Step::Pop)
            }
            _ => Ok(Step::Push(Box::new(InvalidTokenReader::new(
                Terminator::chars(",)]}:;=").or_space(),
            )))),
        }
    }

    /// Decide what a word in operand position is.
    fn resolve_operand_word(&mut self) -> Result<Step, ParseError> {
        let word = self.pending.text();
        let pattern = self.flags.contains(ExpressionFlags::PATTERN);
        match word.as_str() {
            "not" | "await" => {
                self.pending.take();
                let op = if word == "not" {
                    SingleOperatorKind::NotWord
                } else {
                    SingleOperatorKind::Await
                };
                let lead = std::mem::take(&mut self.lead);
                self.chain.push(ChainItem::Prefix { lead, op });
                self.phase = Phase::Operand;
                Ok(Step::Retry)
            }
            "true" | "false" => {
                self.pending.take();
                self.push_operand(Expression::Bool(word == "true"));
                Ok(Step::Retry)
            }
            "func" => {
                let indent = self
                    .pending
                    .first_line()
                    .map(|line| line.indentation)
                    .unwrap_or_default();
                Ok(Step::PushReplay(
                    Box::new(MethodReader::lambda(indent)),
                    self.pending.take(),
                ))
            }
            "var" if pattern => Ok(Step::PushReplay(
                Box::new(MatchBindingReader::new()),
                self.pending.take(),
            )),
            "_" if pattern => {
                self.pending.take();
                self.push_operand(Expression::MatchWildcard(Identifier::new(word)));
                Ok(Step::Retry)
            }
            _ => {
                self.pending.take();
                self.push_operand(Expression::Identifier(Identifier::new(word)));
                Ok(Step::Retry)
            }
        }
    }

    /// After a `.` in operand position: a float such as `.5`, or a `..`
    /// rest pattern.
    fn handle_dot(&mut self, c: char) -> Step {
        if c.is_ascii_digit() {
            self.phase = Phase::Operand;
            return Step::PushReplay(Box::new(NumberReader::new()), self.pending.take());
        }
        let text = self.pending.take().text();
        if c == '.' && self.flags.contains(ExpressionFlags::PATTERN) {
            self.push_operand(Expression::MatchRest);
            Step::Consumed
        } else {
            self.push_operand(Expression::Invalid(Trivia::Invalid(
                InvalidToken::new(text),
            )));
            Step::Retry
        }
    }

    // ---- after an operand ----

    fn handle_after_operand(&mut self, c: char, cx: &ReadContext) -> Result<Step, ParseError> {
        if is_space(c) {
            self.pending.push_char(c, cx);
            return Ok(Step::Consumed);
        }
        match c {
            '#' if self.in_brackets() => {
                self.pending.push_char(c, cx);
                self.phase = Phase::Comment;
                Ok(Step::Consumed)
            }
            '(' => {
                let gap = self.pending.take().into_trivia();
                let (lead, callee) = self.take_operand()?;
                self.held = Some(Held::Call { lead, callee, gap });
                Ok(Step::Push(Box::new(BracketedListReader::<Expression>::new(
                    Punct::OpenParen,
                    ExpressionFlags::empty(),
                ))))
            }
            '[' => {
                let gap = self.pending.take().into_trivia();
                let (lead, target) = self.take_operand()?;
                self.held = Some(Held::Index { lead, target, gap });
                Ok(Step::Push(Box::new(BracketedListReader::<Expression>::new(
                    Punct::OpenBracket,
                    ExpressionFlags::empty(),
                ))))
            }
            '.' => {
                let gap = self.pending.take().into_trivia();
                let (lead, object) = self.take_operand()?;
                let mut form = Form::new();
                form.set_state(MemberState::Dot)?;
                form.extend_trivia(gap);
                form.set_state(MemberState::Name)?;
                let member = MemberExpression {
                    form,
                    object: Box::new(object),
                    name: None,
                };
                self.held = Some(Held::Member { lead, member });
                self.phase = Phase::MemberName;
                Ok(Step::Consumed)
            }
            c if is_operator_char(c) => {
                self.mark = self.pending.len();
                self.pending.push_char(c, cx);
                self.phase = Phase::Symbol;
                Ok(Step::Consumed)
            }
            c if is_ident_start(c) => {
                self.mark = self.pending.len();
                self.pending.push_char(c, cx);
                self.phase = Phase::Word;
                Ok(Step::Consumed)
            }
            _ => Ok(Step::PopReplay(self.pending.take())),
        }
    }

    fn resolve_symbol(&mut self) -> Step {
        let symbol = self.pending.text_from(self.mark);
        let no_assignment = self.flags.contains(ExpressionFlags::NO_ASSIGNMENT);
        match DualOperatorKind::from_symbol(&symbol) {
            Some(kind) if !(no_assignment && kind.is_assignment()) => {
                self.commit_binary(DualOperator::new(kind));
                Step::Retry
            }
            _ => Step::PopReplay(self.pending.take()),
        }
    }

    fn resolve_word(&mut self) -> Step {
        let word = self.pending.text_from(self.mark);
        match word.as_str() {
            "is" | "not" => {
                self.pair = if word == "is" { Pair::Is } else { Pair::Not };
                self.gap_start = self.pending.len();
                self.phase = Phase::PairGap;
                Step::Retry
            }
            "if" if !self.flags.contains(ExpressionFlags::NO_TERNARY) => {
                let lead = self.lead_before_mark();
                self.ternary = Some(TernaryParts {
                    lead,
                    condition_lead: Vec::new(),
                    condition: None,
                });
                self.phase = Phase::TernaryCondition;
                Step::Retry
            }
            _ => match DualOperatorKind::from_word(&word) {
                Some(kind) => {
                    self.commit_binary(DualOperator::word(kind));
                    Step::Retry
                }
                None => Step::PopReplay(self.pending.take()),
            },
        }
    }

    /// Decide between `is`, `is not` and `not in` once the second word is known.
    fn resolve_pair(&mut self, second: Option<String>) -> Step {
        let kind = match self.pair {
            Pair::Is => DualOperatorKind::Is,
            Pair::Not => DualOperatorKind::In,
        };
        let negates = match (self.pair, second.as_deref()) {
            (Pair::Is, Some("not")) | (Pair::Not, Some("in")) => true,
            _ => false,
        };
        if negates {
            let gap = Space::new(
                &self
                    .pending
                    .text_from(self.gap_start)
                    .chars()
                    .take(self.word_start - self.gap_start)
                    .collect::<String>(),
            );
            self.commit_binary(DualOperator::negated(kind, gap));
            return Step::Retry;
        }
        match self.pair {
            Pair::Is => {
                let rest = self.pending.split_off(self.gap_start);
                self.commit_binary(DualOperator::word(kind));
                Step::Replay(rest)
            }
            Pair::Not => Step::PopReplay(self.pending.take()),
        }
    }

    // ---- postfix and ternary ----

    fn close_member(&mut self) {
        if let Some(Held::Member { lead, mut member }) = self.held.take() {
            member.form.complete();
            self.lead = lead;
            self.push_operand(Expression::Member(member));
        }
    }

    fn close_postfix(&mut self, list: crate::list::BracketedList<Expression>) -> Result<(), ParseError> {
        match self.held.take() {
            Some(Held::Call { lead, callee, gap }) => {
                let mut form = Form::new();
                form.set_state(CallState::Arguments)?;
                form.extend_trivia(gap);
                form.complete();
                self.lead = lead;
                self.push_operand(Expression::Call(CallExpression {
                    form,
                    callee: Box::new(callee),
                    arguments: list,
                }));
                Ok(())
            }
            Some(Held::Index { lead, target, gap }) => {
                let mut form = Form::new();
                form.set_state(IndexerState::Index)?;
                form.extend_trivia(gap);
                form.complete();
                self.lead = lead;
                self.push_operand(Expression::Indexer(IndexerExpression {
                    form,
                    target: Box::new(target),
                    index: list,
                }));
                Ok(())
            }
            other => {
                self.held = other;
                Err(ParseError::invalid_state(
                    "ExpressionResolver",
                    self.phase,
                    "expression list",
                ))
            }
        }
    }

    fn close_ternary(&mut self, else_lead: Option<Vec<Trivia>>) {
        if let Some(parts) = self.ternary.take() {
            let has_else = else_lead.is_some();
            self.chain.push(ChainItem::Ternary {
                lead: parts.lead,
                condition_lead: parts.condition_lead,
                condition: parts.condition.unwrap_or_else(missing_operand),
                else_lead: else_lead.unwrap_or_default(),
                has_else,
            });
            self.phase = Phase::Operand;
        }
    }

    fn handle_ternary_condition(&mut self, c: char) -> Step {
        let parts = match self.ternary.as_mut() {
            Some(parts) => parts,
            None => return Step::Pop,
        };
        if is_space(c) {
            match parts.condition_lead.last_mut() {
                Some(Trivia::Space(space)) => space.push(c),
                _ => parts.condition_lead.push(Trivia::Space(Space::from_char(c))),
            }
            return Step::Consumed;
        }
        if c == '#' && self.in_brackets() {
            return Step::Push(Box::new(CommentReader::new()));
        }
        let flags = (self.flags & (ExpressionFlags::IN_BRACKETS | ExpressionFlags::NO_ASSIGNMENT))
            | ExpressionFlags::NO_TERNARY;
        if super::starts_expression(c) {
            return Step::Push(Box::new(ExpressionResolver::new(flags)));
        }
        self.stop()
    }

    fn resolve_ternary_else(&mut self) -> Step {
        if self.pending.text_from(self.mark) == "else" {
            let else_lead = self.lead_before_mark();
            self.close_ternary(Some(else_lead));
            Step::Retry
        } else {
            self.stop()
        }
    }

    /// Settle the word or symbol being read when no character can extend it.
    fn close_token(&mut self) -> Result<Step, ParseError> {
        match self.phase {
            Phase::OperandWord => self.resolve_operand_word(),
            Phase::Dot => {
                let text = self.pending.take().text();
                self.push_operand(Expression::Invalid(Trivia::Invalid(
                    InvalidToken::new(text),
                )));
                Ok(Step::Retry)
            }
            Phase::Symbol => Ok(self.resolve_symbol()),
            Phase::Word => Ok(self.resolve_word()),
            Phase::PairGap => Ok(self.resolve_pair(None)),
            Phase::PairWord => {
                let second = self.pending.text_from(self.word_start);
                Ok(self.resolve_pair(Some(second)))
            }
            Phase::TernaryElseWord => Ok(self.resolve_ternary_else()),
            _ => Ok(self.stop()),
        }
    }

    /// End the expression, handing back whatever is still undecided.
    fn stop(&mut self) -> Step {
        self.close_member();
        self.close_ternary(None);
        Step::PopReplay(self.pending.take())
    }
}

impl Resolve for ExpressionResolver {
    fn name(&self) -> &'static str {
        "ExpressionResolver"
    }

    fn handle_char(&mut self, c: char, cx: &ReadContext) -> Result<Step, ParseError> {
        match self.phase {
            Phase::Operand => self.handle_operand(c, cx),
            Phase::OperandWord if is_ident_continue(c) => {
                self.pending.push_char(c, cx);
                Ok(Step::Consumed)
            }
            Phase::OperandWord if matches!(c, '"' | '\'') && self.pending.text() == "r" => {
                self.phase = Phase::Operand;
                Ok(Step::PushReplay(
                    Box::new(StringReader::prefixed()),
                    self.pending.take(),
                ))
            }
            Phase::OperandWord => self.resolve_operand_word(),
            Phase::Dot => Ok(self.handle_dot(c)),
            Phase::AfterOperand => self.handle_after_operand(c, cx),
            Phase::Comment => {
                self.pending.push_char(c, cx);
                Ok(Step::Consumed)
            }
            Phase::Symbol => {
                let mut symbol = self.pending.text_from(self.mark);
                symbol.push(c);
                if is_symbol_prefix(&symbol) {
                    self.pending.push_char(c, cx);
                    Ok(Step::Consumed)
                } else {
                    Ok(self.resolve_symbol())
                }
            }
            Phase::Word if is_ident_continue(c) => {
                self.pending.push_char(c, cx);
                Ok(Step::Consumed)
            }
            Phase::Word => Ok(self.resolve_word()),
            Phase::PairGap if is_space(c) => {
                self.pending.push_char(c, cx);
                Ok(Step::Consumed)
            }
            Phase::PairGap if is_ident_start(c) => {
                self.word_start = self.pending.len();
                self.pending.push_char(c, cx);
                self.phase = Phase::PairWord;
                Ok(Step::Consumed)
            }
            Phase::PairGap => Ok(self.resolve_pair(None)),
            Phase::PairWord if is_ident_continue(c) => {
                self.pending.push_char(c, cx);
                Ok(Step::Consumed)
            }
            Phase::PairWord => {
                let second = self.pending.text_from(self.word_start);
                Ok(self.resolve_pair(Some(second)))
            }
            Phase::MemberName if is_space(c) => {
                if let Some(Held::Member { member, .. }) = self.held.as_mut() {
                    member.form.add_space(c);
                }
                Ok(Step::Consumed)
            }
            Phase::MemberName if is_ident_start(c) => {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            Phase::MemberName => {
                self.close_member();
                Ok(Step::Retry)
            }
            Phase::TernaryCondition => Ok(self.handle_ternary_condition(c)),
            Phase::TernaryElse if is_space(c) => {
                self.pending.push_char(c, cx);
                Ok(Step::Consumed)
            }
            Phase::TernaryElse if is_ident_start(c) => {
                self.mark = self.pending.len();
                self.pending.push_char(c, cx);
                self.phase = Phase::TernaryElseWord;
                Ok(Step::Consumed)
            }
            Phase::TernaryElse => Ok(self.stop()),
            Phase::TernaryElseWord if is_ident_continue(c) => {
                self.pending.push_char(c, cx);
                Ok(Step::Consumed)
            }
            Phase::TernaryElseWord => Ok(self.resolve_ternary_else()),
        }
    }

    fn handle_new_line(&mut self, ending: LineEnding, cx: &ReadContext) -> Result<Step, ParseError> {
        let in_brackets = self.in_brackets();
        match self.phase {
            Phase::Operand if in_brackets => {
                self.push_lead(Trivia::NewLine(ending));
                Ok(Step::Consumed)
            }
            Phase::AfterOperand | Phase::TernaryElse if in_brackets => {
                self.pending.push_new_line(ending, cx);
                Ok(Step::Consumed)
            }
            Phase::Comment => {
                self.pending.push_new_line(ending, cx);
                self.phase = Phase::AfterOperand;
                Ok(Step::Consumed)
            }
            Phase::MemberName if in_brackets => {
                if let Some(Held::Member { member, .. }) = self.held.as_mut() {
                    member.form.add_before_active_token(Trivia::NewLine(ending));
                }
                Ok(Step::Consumed)
            }
            Phase::TernaryCondition if in_brackets => {
                if let Some(parts) = self.ternary.as_mut() {
                    parts.condition_lead.push(Trivia::NewLine(ending));
                }
                Ok(Step::Consumed)
            }
            _ => self.close_token(),
        }
    }

    fn handle_continuation(
        &mut self,
        ending: LineEnding,
        cx: &ReadContext,
    ) -> Result<Step, ParseError> {
        let continuation = Trivia::Continuation(ending);
        match self.phase {
            Phase::Operand => {
                self.push_lead(continuation);
                Ok(Step::Consumed)
            }
            Phase::AfterOperand | Phase::TernaryElse => {
                self.pending.push_continuation(ending, cx);
                Ok(Step::Consumed)
            }
            Phase::MemberName => {
                if let Some(Held::Member { member, .. }) = self.held.as_mut() {
                    member.form.add_before_active_token(continuation);
                }
                Ok(Step::Consumed)
            }
            Phase::TernaryCondition => {
                if let Some(parts) = self.ternary.as_mut() {
                    parts.condition_lead.push(continuation);
                }
                Ok(Step::Consumed)
            }
            _ => self.close_token(),
        }
    }

    fn handle_eof(&mut self, _cx: &ReadContext) -> Result<Step, ParseError> {
        self.close_token()
    }

    fn keeps_backslash(&self) -> bool {
        self.phase == Phase::Comment
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.phase, value) {
            (_, Resolved::Skipped) => Ok(()),
            (Phase::MemberName, Resolved::Identifier(name)) => {
                if let Some(Held::Member { member, .. }) = self.held.as_mut() {
                    member.name = Some(name);
                }
                self.close_member();
                Ok(())
            }
            (Phase::AfterOperand, Resolved::Expressions(list)) => self.close_postfix(list),
            (Phase::TernaryCondition, Resolved::Trivia(t)) => {
                if let Some(parts) = self.ternary.as_mut() {
                    parts.condition_lead.push(t);
                }
                Ok(())
            }
            (Phase::TernaryCondition, Resolved::Expression(condition)) => {
                if let Some(parts) = self.ternary.as_mut() {
                    parts.condition = Some(condition);
                }
                self.phase = Phase::TernaryElse;
                Ok(())
            }
            (Phase::Operand | Phase::OperandWord, value) => {
                match value {
                    Resolved::Number(n) => self.push_operand(Expression::Number(n)),
                    Resolved::String(s) => self.push_operand(Expression::String(s)),
                    Resolved::Expression(e) => self.push_operand(e),
                    Resolved::Expressions(list) if list.open() == Punct::OpenBracket => {
                        self.push_operand(Expression::Array(list))
                    }
                    Resolved::Expressions(list) => self.push_operand(Expression::Bracket(list)),
                    Resolved::KeyValues(list) => self.push_operand(Expression::Dictionary(list)),
                    Resolved::Trivia(t @ Trivia::Invalid(_)) => {
                        self.push_operand(Expression::Invalid(t))
                    }
                    Resolved::Trivia(t) => self.push_lead(t),
                    other => {
                        return Err(ParseError::invalid_state(
                            "ExpressionResolver",
                            self.phase,
                            other.kind_name(),
                        ));
                    }
                }
                Ok(())
            }
            (phase, other) => Err(ParseError::invalid_state(
                "ExpressionResolver",
                phase,
                other.kind_name(),
            )),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let mut this = *self;
        this.close_member();
        this.close_ternary(None);
        if !this.pending.is_empty() {
            return Err(ParseError::invalid_state(
                "ExpressionResolver",
                this.phase,
                "buffered input",
            ));
        }
        if this.chain.is_empty() {
            return Ok(Resolved::Skipped);
        }
        if this.chain.last().is_some_and(ChainItem::wants_operand) {
            let lead = std::mem::take(&mut this.lead);
            this.chain.push(ChainItem::Operand {
                lead,
                expr: missing_operand(),
            });
        }
        let (lead, expr) = chain::build(this.chain)?;
        if !lead.is_empty() {
            return Err(ParseError::invalid_state(
                "ExpressionResolver",
                "Completed",
                "leading trivia",
            ));
        }
        Ok(Resolved::Expression(expr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::SyntaxNode;
    use crate::parser::Parser;

    fn expression(source: &str) -> Expression {
        let expr = Parser::new().parse_expression(source).unwrap();
        assert_eq!(expr.to_source(), source);
        expr
    }

    #[test]
    fn precedence_is_reassociated() {
        let expr = expression("a + b * c - d");
        let sub = expr.as_dual().unwrap();
        assert_eq!(sub.kind(), DualOperatorKind::Sub);
        assert_eq!(sub.left().to_source(), "a + b * c");
        assert_eq!(sub.right().to_source().trim(), "d");
    }

    #[test]
    fn brackets_are_not_reassociated() {
        let expr = expression("(a + b) * c");
        let mul = expr.as_dual().unwrap();
        assert_eq!(mul.kind(), DualOperatorKind::Mul);
        let Expression::Bracket(inner) = mul.left() else {
            panic!("expected a bracket, got {:?}", mul.left());
        };
        let add = inner.first().unwrap().as_dual().unwrap();
        assert_eq!(add.kind(), DualOperatorKind::Add);
        assert_eq!(expr.to_source(), "(a + b) * c");
    }

    #[test]
    fn continuation_joins_operands() {
        let expr = expression("a +\\\n    b * \\\r\n c");
        let add = expr.as_dual().unwrap();
        assert_eq!(add.kind(), DualOperatorKind::Add);
        assert_eq!(add.right().as_dual().unwrap().kind(), DualOperatorKind::Mul);
        assert!(!expr.has_invalid_tokens());
    }

    #[test]
    fn raw_string_operand() {
        let expr = expression("r\"\\d+\" + r");
        let add = expr.as_dual().unwrap();
        let raw = add.left().as_string().unwrap();
        assert_eq!(raw.prefix(), Some(crate::tokens::StringPrefix::Raw));
        assert_eq!(raw.content(), "\\d+");
        assert_eq!(add.right().as_identifier().unwrap().as_str(), "r");
    }

    #[test]
    fn word_operators() {
        let expr = expression("x is not Node and y not in items");
        let and = expr.as_dual().unwrap();
        assert_eq!(and.kind(), DualOperatorKind::And);
        assert_eq!(and.left().as_dual().unwrap().kind(), DualOperatorKind::Is);
        let not_in = and.right().as_dual().unwrap();
        assert_eq!(not_in.kind(), DualOperatorKind::In);
        assert!(not_in.is_not_in());
    }

    #[test]
    fn lone_is_keeps_following_word() {
        let expr = expression("value is int");
        let is = expr.as_dual().unwrap();
        assert_eq!(is.kind(), DualOperatorKind::Is);
        assert_eq!(is.right().to_source().trim(), "int");
    }

    #[test]
    fn ternary() {
        let expr = expression("a if ok else b");
        let Expression::Ternary(t) = &expr else {
            panic!("expected ternary, got {expr:?}");
        };
        assert_eq!(t.true_value().to_source(), "a");
        assert_eq!(t.condition().to_source().trim(), "ok");
        assert_eq!(t.false_value().to_source().trim(), "b");
    }

    #[test]
    fn postfix_chain() {
        let expr = expression("node.get_child(0).items[2]");
        let Expression::Indexer(indexer) = &expr else {
            panic!("expected indexer, got {expr:?}");
        };
        assert_eq!(indexer.index().unwrap().to_source().trim(), "2");
        let Expression::Member(member) = indexer.target() else {
            panic!("expected member access");
        };
        assert_eq!(member.name().unwrap().as_str(), "items");
        let call = member.object().as_call().unwrap();
        assert_eq!(call.arguments().len(), 1);
        assert!(call.name().is_none());
        let Expression::Member(callee) = call.callee() else {
            panic!("expected member callee");
        };
        assert_eq!(callee.name().unwrap().as_str(), "get_child");
    }

    #[test]
    fn get_node() {
        let Expression::GetNode(path) = expression("$Player/Sprite") else {
            panic!("expected get node");
        };
        assert_eq!(path.path(), Some("Player/Sprite"));
        assert!(!path.is_unique());

        let Expression::GetNode(unique) = expression("%Label") else {
            panic!("expected get node");
        };
        assert!(unique.is_unique());
    }

    #[test]
    fn brackets_span_lines() {
        let expr = expression("[\n\t1, # one\n\t2,\n]");
        let Expression::Array(list) = &expr else {
            panic!("expected array, got {expr:?}");
        };
        assert_eq!(list.len(), 2);
        assert!(!expr.has_invalid_tokens());
    }

    #[test]
    fn dictionaries() {
        let expr = expression("{\"a\": 1, b = 2}");
        let Expression::Dictionary(list) = &expr else {
            panic!("expected dictionary, got {expr:?}");
        };
        let pairs: Vec<_> = list.items().collect();
        assert_eq!(pairs.len(), 2);
        assert!(!pairs[0].is_assign_form());
        assert!(pairs[1].is_assign_form());
        assert_eq!(pairs[1].value().unwrap().to_source().trim(), "2");
    }

    #[test]
    fn prefix_words() {
        let expr = expression("await not done");
        let await_expr = expr.as_single().unwrap();
        assert_eq!(await_expr.operator(), SingleOperatorKind::Await);
        let not = await_expr.operand().as_single().unwrap();
        assert_eq!(not.operator(), SingleOperatorKind::NotWord);
    }

    #[test]
    fn literals() {
        assert_eq!(expression("true"), Expression::Bool(true));
        assert!(expression("0x1F").as_number().is_some());
        assert!(expression("&\"name\"").as_string().is_some());
    }
}
