//! `var` and `const` declarations, with their accessors.

use gdscript_core::ParseError;
use num_enum::IntoPrimitive;

use super::ClassMember;
use crate::block::{BlockItem, BlockReader};
use crate::expr::{Expression, ExpressionFlags, ExpressionResolver, starts_expression};
use crate::form::{Form, impl_form_state};
use crate::list::SyntaxList;
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{Pending, ReadContext, Resolve, Resolved, Step};
use crate::stmt::Statement;
use crate::tokens::{
    Identifier, IdentifierReader, InvalidToken, Keyword, LineEnding, Punct, Trivia,
    is_ident_continue, is_ident_start, is_space,
};
use crate::types::{TypeNode, TypeReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum VariableState {
    Static,
    Keyword,
    Name,
    TypeColon,
    Type,
    Assign,
    Initializer,
    AccessorColon,
    Accessors,
    Completed,
}

impl_form_state!(VariableState, "VariableDeclaration", Static);

/// `[static] var name[: Type][ = value][: accessors]`, or `const`.
///
/// Local variables in statement blocks use the same node without
/// accessors.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableDeclaration {
    pub(crate) form: Form<VariableState>,
    pub(crate) is_static: bool,
    pub(crate) keyword: Keyword,
    pub(crate) name: Option<Identifier>,
    pub(crate) has_type_colon: bool,
    pub(crate) type_node: Option<TypeNode>,
    pub(crate) has_assign: bool,
    pub(crate) initializer: Option<Expression>,
    pub(crate) has_accessor_colon: bool,
    pub(crate) accessors: Option<SyntaxList<Accessor>>,
}

impl VariableDeclaration {
    pub fn name(&self) -> Option<&Identifier> {
        self.name.as_ref()
    }

    pub fn is_const(&self) -> bool {
        self.keyword == Keyword::Const
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    /// The declared type. `None` when untyped or inferred with `:=`.
    pub fn type_node(&self) -> Option<&TypeNode> {
        self.type_node.as_ref()
    }

    /// Whether the type is inferred from the initializer, as in `x := 1`.
    pub fn is_inferred(&self) -> bool {
        self.has_type_colon && self.type_node.is_none() && self.has_assign
    }

    pub fn initializer(&self) -> Option<&Expression> {
        self.initializer.as_ref()
    }

    pub fn accessors(&self) -> impl Iterator<Item = &Accessor> {
        self.accessors.iter().flat_map(SyntaxList::items)
    }

    pub fn getter(&self) -> Option<&Accessor> {
        self.accessors().find(|a| a.keyword == Some(Keyword::Get))
    }

    pub fn setter(&self) -> Option<&Accessor> {
        self.accessors().find(|a| a.keyword == Some(Keyword::Set))
    }
}

impl SyntaxNode for VariableDeclaration {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(
                VariableState::Static,
                self.is_static.then_some(Leaf::Keyword(Keyword::Static)),
            )
            .leaf(VariableState::Keyword, Some(Leaf::Keyword(self.keyword)))
            .slot(VariableState::Name, &self.name)
            .leaf(
                VariableState::TypeColon,
                self.has_type_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(VariableState::Type, &self.type_node)
            .leaf(
                VariableState::Assign,
                self.has_assign.then_some(Leaf::Punct(Punct::Assign)),
            )
            .slot(VariableState::Initializer, &self.initializer)
            .leaf(
                VariableState::AccessorColon,
                self.has_accessor_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(VariableState::Accessors, &self.accessors)
            .finish();
    }
}

/// Reads a variable or constant, at class level or as a local.
pub(crate) struct VariableReader {
    form: Form<VariableState>,
    local: bool,
    indent: usize,
    /// A word after the type colon, until it shows whether it is a type or
    /// an accessor.
    word: Pending,
    decl: VariableDeclaration,
}

impl VariableReader {
    /// A class member.
    pub fn member(indent: usize) -> Self {
        Self::new(false, indent)
    }

    /// A local variable statement.
    pub fn local(indent: usize) -> Self {
        Self::new(true, indent)
    }

    fn new(local: bool, indent: usize) -> Self {
        Self {
            form: Form::new(),
            local,
            indent,
            word: Pending::new(),
            decl: VariableDeclaration {
                form: Form::new(),
                is_static: false,
                keyword: Keyword::Var,
                name: None,
                has_type_colon: false,
                type_node: None,
                has_assign: false,
                initializer: None,
                has_accessor_colon: false,
                accessors: None,
            },
        }
    }

    fn accessor_block(&self) -> Box<dyn Resolve> {
        Box::new(BlockReader::<Accessor>::nested(self.indent))
    }

    /// The word after the type colon is complete.
    fn resolve_word(&mut self) -> Result<Step, ParseError> {
        let word = self.word.take();
        if !self.local && matches!(word.text().as_str(), "get" | "set") {
            self.form.set_state(VariableState::Accessors)?;
            return Ok(Step::PushReplay(self.accessor_block(), word));
        }
        Ok(Step::PushReplay(Box::new(TypeReader::new()), word))
    }

    fn receive_word(&mut self, word: Identifier) -> Result<(), ParseError> {
        match word.as_str() {
            "static" if self.form.state() == VariableState::Static => {
                self.decl.is_static = true;
                self.form.set_state(VariableState::Keyword)
            }
            "var" => {
                self.decl.keyword = Keyword::Var;
                self.form.set_state(VariableState::Name)
            }
            "const" => {
                self.decl.keyword = Keyword::Const;
                self.form.set_state(VariableState::Name)
            }
            other => {
                self.form
                    .add_before_active_token(Trivia::Invalid(InvalidToken::new(other)));
                Ok(())
            }
        }
    }
}

impl Resolve for VariableReader {
    fn name(&self) -> &'static str {
        "VariableDeclaration"
    }

    fn handle_char(&mut self, c: char, cx: &ReadContext) -> Result<Step, ParseError> {
        if !self.word.is_empty() {
            if is_ident_continue(c) {
                self.word.push_char(c, cx);
                return Ok(Step::Consumed);
            }
            return self.resolve_word();
        }
        let state = self.form.state();
        // Only reachable after a multi-line lambda initializer.
        if cx.at_line_start() && state > VariableState::Keyword && state < VariableState::Accessors {
            return Ok(Step::Pop);
        }
        if is_space(c) && state > VariableState::Static && state < VariableState::Accessors {
            self.form.add_space(c);
            return Ok(Step::Consumed);
        }
        let accessors = !self.local;
        match state {
            VariableState::Static | VariableState::Keyword | VariableState::Name
                if is_ident_start(c) =>
            {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            VariableState::Name => {
                self.form.set_state(VariableState::TypeColon)?;
                Ok(Step::Retry)
            }
            VariableState::TypeColon if c == ':' => {
                self.decl.has_type_colon = true;
                self.form.set_state(VariableState::Type)?;
                Ok(Step::Consumed)
            }
            VariableState::TypeColon | VariableState::Type if c == '=' => {
                self.form.set_state(VariableState::Assign)?;
                Ok(Step::Retry)
            }
            VariableState::Type if is_ident_start(c) => {
                self.word.push_char(c, cx);
                Ok(Step::Consumed)
            }
            VariableState::Assign if c == '=' => {
                self.decl.has_assign = true;
                self.form.set_state(VariableState::Initializer)?;
                Ok(Step::Consumed)
            }
            VariableState::Initializer if starts_expression(c) => Ok(
                Step::Push(Box::new(ExpressionResolver::new(ExpressionFlags::empty()))),
            ),
            VariableState::Assign | VariableState::Initializer | VariableState::AccessorColon
                if c == ':' && accessors =>
            {
                self.decl.has_accessor_colon = true;
                self.form.set_state(VariableState::Accessors)?;
                Ok(Step::Consumed)
            }
            VariableState::Accessors => Ok(Step::Push(self.accessor_block())),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        if !self.word.is_empty() {
            return self.resolve_word();
        }
        match self.form.state() {
            // `var x:` with the accessors on the following lines.
            VariableState::Type if !self.local => {
                self.form.set_state(VariableState::Accessors)?;
                Ok(Step::Push(self.accessor_block()))
            }
            VariableState::Accessors => Ok(Step::Push(self.accessor_block())),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_continuation(
        &mut self,
        ending: LineEnding,
        cx: &ReadContext,
    ) -> Result<Step, ParseError> {
        let state = self.form.state();
        if self.word.is_empty() && state > VariableState::Static && state < VariableState::Accessors {
            self.form.add_before_active_token(Trivia::Continuation(ending));
            return Ok(Step::Consumed);
        }
        self.handle_new_line(ending, cx)
    }

    fn handle_eof(&mut self, _cx: &ReadContext) -> Result<Step, ParseError> {
        if !self.word.is_empty() {
            return self.resolve_word();
        }
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (_, Resolved::Identifier(word)) if self.form.is_or_lower(VariableState::Keyword) => {
                self.receive_word(word)
            }
            (VariableState::Name, Resolved::Identifier(name)) => {
                self.decl.name = Some(name);
                self.form.set_state(VariableState::TypeColon)
            }
            (VariableState::Type, Resolved::Type(ty)) => {
                self.decl.type_node = Some(ty);
                self.form.set_state(VariableState::Assign)
            }
            (VariableState::Initializer, Resolved::Expression(e)) => {
                self.decl.initializer = Some(e);
                self.form.set_state(VariableState::AccessorColon)
            }
            (VariableState::Accessors, Resolved::Accessors(list)) => {
                self.decl.accessors = Some(list);
                self.form.complete();
                Ok(())
            }
            (_, Resolved::Trivia(t)) => {
                self.form.add_before_active_token(t);
                Ok(())
            }
            (_, other) => Err(self.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let this = *self;
        let decl = VariableDeclaration {
            form: this.form,
            ..this.decl
        };
        Ok(if this.local {
            Resolved::Statement(Statement::Variable(decl))
        } else {
            Resolved::Member(ClassMember::Variable(decl))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum AccessorState {
    Keyword,
    OpenBracket,
    Parameter,
    CloseBracket,
    Assign,
    Method,
    Colon,
    Statements,
    Completed,
}

impl_form_state!(AccessorState, "Accessor", Keyword);

/// A `get` or `set` accessor: `get = method`, `get: body` or
/// `set(value): body`.
#[derive(Debug, Clone, PartialEq)]
pub struct Accessor {
    pub(crate) form: Form<AccessorState>,
    pub(crate) keyword: Option<Keyword>,
    pub(crate) has_open: bool,
    pub(crate) parameter: Option<Identifier>,
    pub(crate) has_close: bool,
    pub(crate) has_assign: bool,
    pub(crate) method: Option<Identifier>,
    pub(crate) has_colon: bool,
    pub(crate) statements: Option<SyntaxList<Statement>>,
}

impl Accessor {
    pub fn is_getter(&self) -> bool {
        self.keyword == Some(Keyword::Get)
    }

    pub fn is_setter(&self) -> bool {
        self.keyword == Some(Keyword::Set)
    }

    /// The value parameter of a setter body.
    pub fn parameter(&self) -> Option<&Identifier> {
        self.parameter.as_ref()
    }

    /// The method named by `get = method`.
    pub fn method(&self) -> Option<&Identifier> {
        self.method.as_ref()
    }

    pub fn statements(&self) -> Option<&SyntaxList<Statement>> {
        self.statements.as_ref()
    }
}

impl SyntaxNode for Accessor {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(AccessorState::Keyword, self.keyword.map(Leaf::Keyword))
            .leaf(
                AccessorState::OpenBracket,
                self.has_open.then_some(Leaf::Punct(Punct::OpenParen)),
            )
            .slot(AccessorState::Parameter, &self.parameter)
            .leaf(
                AccessorState::CloseBracket,
                self.has_close.then_some(Leaf::Punct(Punct::CloseParen)),
            )
            .leaf(
                AccessorState::Assign,
                self.has_assign.then_some(Leaf::Punct(Punct::Assign)),
            )
            .slot(AccessorState::Method, &self.method)
            .leaf(
                AccessorState::Colon,
                self.has_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(AccessorState::Statements, &self.statements)
            .finish();
    }
}

impl BlockItem for Accessor {
    const NAME: &'static str = "Accessors";
    const SEPARATOR: Punct = Punct::Comma;

    fn starts(c: char) -> bool {
        is_ident_start(c)
    }

    fn reader(cx: &ReadContext) -> Box<dyn Resolve> {
        Box::new(AccessorReader::new(cx.indentation()))
    }

    fn from_resolved(value: Resolved) -> Option<Self> {
        match value {
            Resolved::Accessor(a) => Some(a),
            _ => None,
        }
    }

    fn into_resolved(list: SyntaxList<Self>) -> Resolved {
        Resolved::Accessors(list)
    }
}

struct AccessorReader {
    indent: usize,
    accessor: Accessor,
}

impl AccessorReader {
    fn new(indent: usize) -> Self {
        Self {
            indent,
            accessor: Accessor {
                form: Form::new(),
                keyword: None,
                has_open: false,
                parameter: None,
                has_close: false,
                has_assign: false,
                method: None,
                has_colon: false,
                statements: None,
            },
        }
    }

    fn form(&mut self) -> &mut Form<AccessorState> {
        &mut self.accessor.form
    }
}

impl Resolve for AccessorReader {
    fn name(&self) -> &'static str {
        "Accessor"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        let state = self.accessor.form.state();
        if is_space(c) && state < AccessorState::Statements {
            self.form().add_space(c);
            return Ok(Step::Consumed);
        }
        match (state, c) {
            (AccessorState::Keyword | AccessorState::Parameter | AccessorState::Method, c)
                if is_ident_start(c) =>
            {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            (AccessorState::Keyword, _) => {
                self.form().set_state(AccessorState::OpenBracket)?;
                Ok(Step::Retry)
            }
            (AccessorState::OpenBracket, '(') => {
                self.accessor.has_open = true;
                self.form().set_state(AccessorState::Parameter)?;
                Ok(Step::Consumed)
            }
            (AccessorState::Parameter | AccessorState::CloseBracket, ')') => {
                self.accessor.has_close = true;
                self.form().set_state(AccessorState::Assign)?;
                Ok(Step::Consumed)
            }
            (AccessorState::OpenBracket | AccessorState::Assign, '=') => {
                self.accessor.has_assign = true;
                self.form().set_state(AccessorState::Method)?;
                Ok(Step::Consumed)
            }
            (
                AccessorState::OpenBracket | AccessorState::CloseBracket | AccessorState::Assign,
                ':',
            )
            | (AccessorState::Colon, ':') => {
                self.accessor.has_colon = true;
                self.form().set_state(AccessorState::Statements)?;
                Ok(Step::Consumed)
            }
            (AccessorState::Statements, _) => Ok(Step::Push(Box::new(
                BlockReader::<Statement>::nested(self.indent),
            ))),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.accessor.form.state() {
            AccessorState::Statements => Ok(Step::Push(Box::new(
                BlockReader::<Statement>::nested(self.indent),
            ))),
            _ => Ok(Step::Pop),
        }
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.accessor.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (AccessorState::Keyword, Resolved::Identifier(word)) => {
                match word.as_str() {
                    "get" => self.accessor.keyword = Some(Keyword::Get),
                    "set" => self.accessor.keyword = Some(Keyword::Set),
                    other => {
                        let invalid = Trivia::Invalid(InvalidToken::new(other));
                        self.form().add_before_active_token(invalid);
                        return Ok(());
                    }
                }
                self.form().set_state(AccessorState::OpenBracket)
            }
            (AccessorState::Parameter, Resolved::Identifier(name)) => {
                self.accessor.parameter = Some(name);
                self.form().set_state(AccessorState::CloseBracket)
            }
            (AccessorState::Method, Resolved::Identifier(name)) => {
                self.accessor.method = Some(name);
                self.form().complete();
                Ok(())
            }
            (AccessorState::Statements, Resolved::Statements(list)) => {
                self.accessor.statements = Some(list);
                self.form().complete();
                Ok(())
            }
            (_, Resolved::Trivia(t)) => {
                self.form().add_before_active_token(t);
                Ok(())
            }
            (_, other) => Err(self.accessor.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::Accessor(self.accessor))
    }
}

impl_display!(VariableDeclaration, Accessor);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::ClassMembers;
    use crate::parser::Parser;

    fn variable(source: &str) -> VariableDeclaration {
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        class.variables().next().unwrap().clone()
    }

    #[test]
    fn typed_with_initializer() {
        let v = variable("var x: int = 5");
        assert_eq!(v.name().unwrap().as_str(), "x");
        assert_eq!(v.type_node().unwrap().to_string(), "int");
        assert_eq!(v.initializer().unwrap().to_string(), "5");
        assert!(!v.is_const());
        assert!(!v.is_inferred());
    }

    #[test]
    fn inferred_and_static() {
        let v = variable("static var count := 0");
        assert!(v.is_static());
        assert!(v.is_inferred());
        assert!(v.type_node().is_none());
    }

    #[test]
    fn constant() {
        let v = variable("const SPEED = 10.5");
        assert!(v.is_const());
        assert_eq!(v.initializer().unwrap().to_string(), "10.5");
    }

    #[test]
    fn inline_accessors() {
        let v = variable("var hp: int = 3: get = get_hp, set = set_hp");
        assert_eq!(v.getter().unwrap().method().unwrap().as_str(), "get_hp");
        assert_eq!(v.setter().unwrap().method().unwrap().as_str(), "set_hp");
    }

    #[test]
    fn accessor_block() {
        let source = "var hp: int:\n\tget:\n\t\treturn hp\n\tset(value):\n\t\thp = value\nvar other";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        let vars: Vec<_> = class.variables().collect();
        assert_eq!(vars.len(), 2);
        let setter = vars[0].setter().unwrap();
        assert_eq!(setter.parameter().unwrap().as_str(), "value");
        assert_eq!(setter.statements().unwrap().len(), 1);
        assert_eq!(vars[0].getter().unwrap().statements().unwrap().len(), 1);
    }

    #[test]
    fn untyped_accessor_block() {
        let source = "var hp:\n\tget = _get_hp";
        let v = variable(source);
        assert!(v.type_node().is_none());
        assert_eq!(v.getter().unwrap().method().unwrap().as_str(), "_get_hp");
    }
}
