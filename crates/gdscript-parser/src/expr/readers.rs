//! Readers for the operands and list entries that have a fixed shape.

use gdscript_core::ParseError;

use super::chain::missing_operand;
use super::{
    Expression, ExpressionFlags, ExpressionResolver, GetNodeExpression, KeyValue, KeyValueState,
    MatchBindingExpression, MatchBindingState, NodeTarget, starts_expression,
};
use crate::form::Form;
use crate::list::{BracketedList, ListItem};
use crate::reader::{ReadContext, Resolve, Resolved, Step};
use crate::tokens::{
    CommentReader, IdentifierReader, Keyword, KeywordReader, LineEnding, NodePathReader, Punct,
    StringReader, Trivia, is_ident_start, is_node_path_char, is_space,
};

/// Reads `$Path/To/Node`, `$"path"`, `%Unique` or `%"Unique"`.
pub(crate) struct GetNodeReader {
    sigil: Option<Punct>,
    target: Option<NodeTarget>,
}

impl GetNodeReader {
    pub fn new() -> Self {
        Self {
            sigil: None,
            target: None,
        }
    }
}

impl Resolve for GetNodeReader {
    fn name(&self) -> &'static str {
        "GetNode"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.sigil.is_none() {
            self.sigil = Punct::from_char(c);
            return Ok(Step::Consumed);
        }
        if self.target.is_some() {
            return Ok(Step::Pop);
        }
        match c {
            '"' | '\'' => Ok(Step::Push(Box::new(StringReader::new()))),
            c if is_node_path_char(c) => Ok(Step::Push(Box::new(NodePathReader::new()))),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match value {
            Resolved::Skipped => {}
            Resolved::String(s) => self.target = Some(NodeTarget::String(s)),
            Resolved::NodePath(p) => self.target = Some(NodeTarget::Path(p)),
            other => {
                return Err(ParseError::invalid_state(
                    "GetNode",
                    "Target",
                    other.kind_name(),
                ));
            }
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::Expression(Expression::GetNode(GetNodeExpression {
            sigil: self.sigil.unwrap_or(Punct::Dollar),
            target: self.target,
        })))
    }
}

/// Reads one dictionary entry: `key: value` or `key = value`.
pub(crate) struct KeyValueReader {
    form: Form<KeyValueState>,
    flags: ExpressionFlags,
    key: Option<Expression>,
    separator: Option<Punct>,
    value: Option<Expression>,
}

impl KeyValueReader {
    pub fn new(flags: ExpressionFlags) -> Self {
        Self {
            form: Form::new(),
            flags: flags | ExpressionFlags::IN_BRACKETS,
            key: None,
            separator: None,
            value: None,
        }
    }
}

impl Resolve for KeyValueReader {
    fn name(&self) -> &'static str {
        "KeyValue"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            KeyValueState::Key => Ok(Step::Push(Box::new(ExpressionResolver::new(
                self.flags | ExpressionFlags::NO_ASSIGNMENT,
            )))),
            KeyValueState::Separator | KeyValueState::Value if is_space(c) => {
                self.form.add_space(c);
                Ok(Step::Consumed)
            }
            KeyValueState::Separator | KeyValueState::Value if c == '#' => {
                Ok(Step::Push(Box::new(CommentReader::new())))
            }
            KeyValueState::Separator if c == ':' || c == '=' => {
                self.separator = Punct::from_char(c);
                self.form.set_state(KeyValueState::Value)?;
                Ok(Step::Consumed)
            }
            KeyValueState::Value if starts_expression(c) => {
                Ok(Step::Push(Box::new(ExpressionResolver::new(self.flags))))
            }
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            KeyValueState::Separator | KeyValueState::Value => {
                self.form.add_before_active_token(Trivia::NewLine(ending));
                Ok(Step::Consumed)
            }
            _ => Ok(Step::Pop),
        }
    }

    fn handle_continuation(
        &mut self,
        ending: LineEnding,
        _cx: &ReadContext,
    ) -> Result<Step, ParseError> {
        match self.form.state() {
            KeyValueState::Separator | KeyValueState::Value => {
                self.form.add_before_active_token(Trivia::Continuation(ending));
                Ok(Step::Consumed)
            }
            _ => Ok(Step::Pop),
        }
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (_, Resolved::Trivia(t)) => {
                self.form.add_before_active_token(t);
                Ok(())
            }
            (KeyValueState::Key, Resolved::Expression(key)) => {
                self.key = Some(key);
                self.form.set_state(KeyValueState::Separator)
            }
            (KeyValueState::Value, Resolved::Expression(value)) => {
                self.value = Some(value);
                self.form.complete();
                Ok(())
            }
            (_, other) => Err(self.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::KeyValue(KeyValue {
            form: self.form,
            key: self.key.unwrap_or_else(missing_operand),
            separator: self.separator,
            value: self.value,
        }))
    }
}

/// Reads `var name` in a match pattern. Pushed at the `v`.
pub(crate) struct MatchBindingReader {
    form: Form<MatchBindingState>,
    name: Option<crate::tokens::Identifier>,
}

impl MatchBindingReader {
    pub fn new() -> Self {
        Self {
            form: Form::new(),
            name: None,
        }
    }
}

impl Resolve for MatchBindingReader {
    fn name(&self) -> &'static str {
        "MatchBinding"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.form.state() {
            MatchBindingState::Var => Ok(Step::Push(Box::new(KeywordReader::new(Keyword::Var)))),
            MatchBindingState::Name if is_space(c) => {
                self.form.add_space(c);
                Ok(Step::Consumed)
            }
            MatchBindingState::Name if is_ident_start(c) => {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (MatchBindingState::Var, Resolved::Keyword(Keyword::Var)) => {
                self.form.set_state(MatchBindingState::Name)
            }
            (MatchBindingState::Name, Resolved::Identifier(name)) => {
                self.name = Some(name);
                self.form.complete();
                Ok(())
            }
            (_, other) => Err(self.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::Expression(Expression::MatchBinding(
            MatchBindingExpression {
                form: self.form,
                name: self.name,
            },
        )))
    }
}

impl ListItem for Expression {
    fn starts(c: char) -> bool {
        starts_expression(c)
    }

    fn reader(flags: ExpressionFlags, _cx: &ReadContext) -> Box<dyn Resolve> {
        Box::new(ExpressionResolver::new(flags))
    }

    fn from_resolved(value: Resolved) -> Option<Self> {
        match value {
            Resolved::Expression(e) => Some(e),
            _ => None,
        }
    }

    fn into_resolved(list: BracketedList<Self>) -> Resolved {
        Resolved::Expressions(list)
    }
}

impl ListItem for KeyValue {
    fn starts(c: char) -> bool {
        starts_expression(c)
    }

    fn reader(flags: ExpressionFlags, _cx: &ReadContext) -> Box<dyn Resolve> {
        Box::new(KeyValueReader::new(flags))
    }

    fn from_resolved(value: Resolved) -> Option<Self> {
        match value {
            Resolved::KeyValue(kv) => Some(kv),
            _ => None,
        }
    }

    fn into_resolved(list: BracketedList<Self>) -> Resolved {
        Resolved::KeyValues(list)
    }
}
