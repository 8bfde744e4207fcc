//! Methods, lambdas and their parameters.

use gdscript_core::ParseError;
use num_enum::IntoPrimitive;

use super::ClassMember;
use crate::block::{BlockReader, header_colon};
use crate::expr::{Expression, ExpressionFlags, ExpressionResolver, starts_expression};
use crate::form::{Form, impl_form_state};
use crate::list::{BracketedList, BracketedListReader, ListItem, SyntaxList};
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::reader::{ReadContext, Resolve, Resolved, Step};
use crate::stmt::Statement;
use crate::tokens::{Identifier, IdentifierReader, InvalidToken, Keyword, LineEnding, Punct, Trivia, is_ident_start, is_space};
use crate::types::{TypeNode, TypeReader};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum MethodState {
    Static,
    Func,
    Name,
    Parameters,
    Arrow,
    ReturnType,
    Colon,
    Statements,
    Completed,
}

impl_form_state!(MethodState, "MethodDeclaration", Static);

/// `[static] func name(params) [-> Type]: body`
///
/// Lambdas share the node; their name is optional.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodDeclaration {
    pub(crate) form: Form<MethodState>,
    pub(crate) is_static: bool,
    pub(crate) name: Option<Identifier>,
    pub(crate) parameters: Option<BracketedList<Parameter>>,
    pub(crate) has_arrow: bool,
    pub(crate) return_type: Option<TypeNode>,
    pub(crate) has_colon: bool,
    pub(crate) statements: Option<SyntaxList<Statement>>,
}

impl MethodDeclaration {
    pub fn name(&self) -> Option<&Identifier> {
        self.name.as_ref()
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn parameters(&self) -> impl Iterator<Item = &Parameter> {
        self.parameters.iter().flat_map(BracketedList::items)
    }

    pub fn return_type(&self) -> Option<&TypeNode> {
        self.return_type.as_ref()
    }

    pub fn statements(&self) -> Option<&SyntaxList<Statement>> {
        self.statements.as_ref()
    }

    pub fn has_colon(&self) -> bool {
        self.has_colon
    }
}

impl SyntaxNode for MethodDeclaration {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(
                MethodState::Static,
                self.is_static.then_some(Leaf::Keyword(Keyword::Static)),
            )
            .leaf(MethodState::Func, Some(Leaf::Keyword(Keyword::Func)))
            .slot(MethodState::Name, &self.name)
            .slot(MethodState::Parameters, &self.parameters)
            .leaf(
                MethodState::Arrow,
                self.has_arrow.then_some(Leaf::Punct(Punct::Arrow)),
            )
            .slot(MethodState::ReturnType, &self.return_type)
            .leaf(
                MethodState::Colon,
                self.has_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(MethodState::Statements, &self.statements)
            .finish();
    }
}

/// Reads a method member or a lambda, starting at `static` or `func`.
pub(crate) struct MethodReader {
    lambda: bool,
    indent: usize,
    /// A `-` was read in front of the return type.
    arrow_dash: bool,
    method: MethodDeclaration,
}

impl MethodReader {
    pub fn member(indent: usize) -> Self {
        Self::new(false, indent)
    }

    pub fn lambda(indent: usize) -> Self {
        Self::new(true, indent)
    }

    fn new(lambda: bool, indent: usize) -> Self {
        Self {
            lambda,
            indent,
            arrow_dash: false,
            method: MethodDeclaration {
                form: Form::new(),
                is_static: false,
                name: None,
                parameters: None,
                has_arrow: false,
                return_type: None,
                has_colon: false,
                statements: None,
            },
        }
    }

    fn form(&mut self) -> &mut Form<MethodState> {
        &mut self.method.form
    }

    fn body(&self) -> Step {
        Step::Push(Box::new(BlockReader::<Statement>::nested(self.indent)))
    }

    /// A `-` that turned out not to start `->`.
    fn drop_dash(&mut self) {
        self.arrow_dash = false;
        self.form()
            .add_before_active_token(Trivia::Invalid(InvalidToken::new("-")));
    }

    fn receive_word(&mut self, word: Identifier) -> Result<(), ParseError> {
        match (self.method.form.state(), word.as_str()) {
            (MethodState::Static, "static") => {
                self.method.is_static = true;
                self.form().set_state(MethodState::Func)
            }
            (MethodState::Static | MethodState::Func, "func") => {
                self.form().set_state(MethodState::Name)
            }
            (MethodState::Name, _) => {
                self.method.name = Some(word);
                self.form().set_state(MethodState::Parameters)
            }
            (_, other) => {
                let invalid = Trivia::Invalid(InvalidToken::new(other));
                self.form().add_before_active_token(invalid);
                Ok(())
            }
        }
    }
}

impl Resolve for MethodReader {
    fn name(&self) -> &'static str {
        "MethodDeclaration"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        let state = self.method.form.state();
        if self.arrow_dash {
            if c == '>' {
                self.arrow_dash = false;
                self.method.has_arrow = true;
                self.form().set_state(MethodState::ReturnType)?;
                return Ok(Step::Consumed);
            }
            self.drop_dash();
        }
        if is_space(c) && state > MethodState::Static && state < MethodState::Statements {
            self.form().add_space(c);
            return Ok(Step::Consumed);
        }
        match state {
            MethodState::Static | MethodState::Func | MethodState::Name if is_ident_start(c) => {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            MethodState::Static => Ok(Step::Pop),
            MethodState::Func | MethodState::Name => {
                self.form().set_state(MethodState::Parameters)?;
                Ok(Step::Retry)
            }
            MethodState::Parameters if c == '(' => Ok(Step::Push(Box::new(
                BracketedListReader::<Parameter>::new(Punct::OpenParen, ExpressionFlags::empty()),
            ))),
            MethodState::Parameters | MethodState::Arrow if c == '-' => {
                self.form().set_state(MethodState::Arrow)?;
                self.arrow_dash = true;
                Ok(Step::Consumed)
            }
            MethodState::ReturnType if TypeReader::starts(c) => {
                Ok(Step::Push(Box::new(TypeReader::new())))
            }
            MethodState::Parameters
            | MethodState::Arrow
            | MethodState::ReturnType
            | MethodState::Colon => {
                if self.lambda && matches!(c, ')' | ']' | '}' | ',') {
                    return Ok(Step::Pop);
                }
                header_colon(self.form(), c, MethodState::Statements)
            }
            MethodState::Statements => Ok(self.body()),
            MethodState::Completed => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.arrow_dash {
            self.drop_dash();
        }
        match self.method.form.state() {
            MethodState::Statements => Ok(self.body()),
            _ => Ok(Step::Pop),
        }
    }

    fn handle_eof(&mut self, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.arrow_dash {
            self.drop_dash();
        }
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.method.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (_, Resolved::Identifier(word)) if self.method.form.is_or_lower(MethodState::Name) => {
                self.receive_word(word)
            }
            (MethodState::Parameters, Resolved::Parameters(list)) => {
                self.method.parameters = Some(list);
                self.form().set_state(MethodState::Arrow)
            }
            (MethodState::ReturnType, Resolved::Type(ty)) => {
                self.method.return_type = Some(ty);
                self.form().set_state(MethodState::Colon)
            }
            (MethodState::Statements, Resolved::Statements(list)) => {
                self.method.has_colon = true;
                self.method.statements = Some(list);
                self.form().complete();
                Ok(())
            }
            (_, Resolved::Trivia(t)) => {
                self.form().add_before_active_token(t);
                Ok(())
            }
            (_, other) => Err(self.method.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        let mut method = self.method;
        method.has_colon = method.form.state() >= MethodState::Statements;
        Ok(if self.lambda {
            Resolved::Expression(Expression::Lambda(Box::new(method)))
        } else {
            Resolved::Member(ClassMember::Method(method))
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum ParameterState {
    Name,
    Colon,
    Type,
    Assign,
    Default,
    Completed,
}

impl_form_state!(ParameterState, "Parameter", Name);

/// `name[: Type][ = default]`, also `name := default`.
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub(crate) form: Form<ParameterState>,
    pub(crate) name: Option<Identifier>,
    pub(crate) has_colon: bool,
    pub(crate) type_node: Option<TypeNode>,
    pub(crate) has_assign: bool,
    pub(crate) default: Option<Expression>,
}

impl Parameter {
    pub fn name(&self) -> Option<&Identifier> {
        self.name.as_ref()
    }

    pub fn type_node(&self) -> Option<&TypeNode> {
        self.type_node.as_ref()
    }

    pub fn default(&self) -> Option<&Expression> {
        self.default.as_ref()
    }
}

impl SyntaxNode for Parameter {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .slot(ParameterState::Name, &self.name)
            .leaf(
                ParameterState::Colon,
                self.has_colon.then_some(Leaf::Punct(Punct::Colon)),
            )
            .slot(ParameterState::Type, &self.type_node)
            .leaf(
                ParameterState::Assign,
                self.has_assign.then_some(Leaf::Punct(Punct::Assign)),
            )
            .slot(ParameterState::Default, &self.default)
            .finish();
    }
}

struct ParameterReader {
    flags: ExpressionFlags,
    parameter: Parameter,
}

impl ParameterReader {
    fn new(flags: ExpressionFlags) -> Self {
        Self {
            flags,
            parameter: Parameter {
                form: Form::new(),
                name: None,
                has_colon: false,
                type_node: None,
                has_assign: false,
                default: None,
            },
        }
    }

    fn form(&mut self) -> &mut Form<ParameterState> {
        &mut self.parameter.form
    }
}

impl Resolve for ParameterReader {
    fn name(&self) -> &'static str {
        "Parameter"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        let state = self.parameter.form.state();
        if is_space(c) && state > ParameterState::Name && state < ParameterState::Completed {
            self.form().add_space(c);
            return Ok(Step::Consumed);
        }
        match (state, c) {
            (ParameterState::Name, c) if is_ident_start(c) => {
                Ok(Step::Push(Box::new(IdentifierReader::new())))
            }
            (ParameterState::Colon, ':') => {
                self.parameter.has_colon = true;
                self.form().set_state(ParameterState::Type)?;
                Ok(Step::Consumed)
            }
            (ParameterState::Colon | ParameterState::Type | ParameterState::Assign, '=') => {
                self.parameter.has_assign = true;
                self.form().set_state(ParameterState::Default)?;
                Ok(Step::Consumed)
            }
            (ParameterState::Type, c) if TypeReader::starts(c) => {
                Ok(Step::Push(Box::new(TypeReader::new())))
            }
            (ParameterState::Default, c) if starts_expression(c) => {
                Ok(Step::Push(Box::new(ExpressionResolver::new(self.flags))))
            }
            _ => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match (self.parameter.form.state(), value) {
            (_, Resolved::Skipped) => Ok(()),
            (ParameterState::Name, Resolved::Identifier(name)) => {
                self.parameter.name = Some(name);
                self.form().set_state(ParameterState::Colon)
            }
            (ParameterState::Type, Resolved::Type(ty)) => {
                self.parameter.type_node = Some(ty);
                self.form().set_state(ParameterState::Assign)
            }
            (ParameterState::Default, Resolved::Expression(e)) => {
                self.parameter.default = Some(e);
                self.form().complete();
                Ok(())
            }
            (_, Resolved::Trivia(t)) => {
                self.form().add_before_active_token(t);
                Ok(())
            }
            (_, other) => Err(self.parameter.form.invalid(other.kind_name())),
        }
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::Parameter(self.parameter))
    }
}

impl ListItem for Parameter {
    fn starts(c: char) -> bool {
        is_ident_start(c)
    }

    fn reader(flags: ExpressionFlags, _cx: &ReadContext) -> Box<dyn Resolve> {
        Box::new(ParameterReader::new(flags))
    }

    fn from_resolved(value: Resolved) -> Option<Self> {
        match value {
            Resolved::Parameter(p) => Some(p),
            _ => None,
        }
    }

    fn into_resolved(list: BracketedList<Self>) -> Resolved {
        Resolved::Parameters(list)
    }
}

impl_display!(MethodDeclaration, Parameter);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::ClassMembers;
    use crate::parser::Parser;

    fn method(source: &str) -> MethodDeclaration {
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        class.methods().next().unwrap().clone()
    }

    #[test]
    fn block_body() {
        let m = method("func bar():\n\tpass\n\treturn 1\n");
        assert_eq!(m.name().unwrap().as_str(), "bar");
        assert_eq!(m.parameters().count(), 0);
        assert_eq!(m.statements().unwrap().len(), 2);
        assert!(m.has_colon());
    }

    #[test]
    fn parameters_and_return_type() {
        let m = method("static func add(a: int, b := 2, c = 3) -> int: return a + b + c");
        assert!(m.is_static());
        let params: Vec<_> = m.parameters().collect();
        assert_eq!(params.len(), 3);
        assert_eq!(params[0].name().unwrap().as_str(), "a");
        assert_eq!(params[0].type_node().unwrap().to_string(), "int");
        assert_eq!(params[1].default().unwrap().to_string(), "2");
        assert!(params[1].type_node().is_none());
        assert_eq!(params[2].default().unwrap().to_string(), "3");
        assert_eq!(m.return_type().unwrap().to_string(), "int");
        assert_eq!(m.statements().unwrap().len(), 1);
    }

    #[test]
    fn parameters_across_lines() {
        let m = method("func f(\n\ta,\n\tb: String\n):\n\tpass");
        assert_eq!(m.parameters().count(), 2);
    }

    #[test]
    fn missing_colon_is_kept() {
        let source = "func f() pass";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        assert!(class.has_invalid_tokens());
    }

    #[test]
    fn lambda_inline_and_block() {
        let e = Parser::new()
            .parse_expression("func(x: int) -> int: return x * 2")
            .unwrap();
        match &e {
            Expression::Lambda(m) => {
                assert!(m.name().is_none());
                assert_eq!(m.parameters().count(), 1);
                assert_eq!(m.statements().unwrap().len(), 1);
            }
            other => panic!("expected lambda, got {other:?}"),
        }

        let source = "func f():\n\tvar cb = func named():\n\t\tprint(1)\n\t\treturn 2\n\tcb.call()";
        let m = method(source);
        assert_eq!(m.statements().unwrap().len(), 2);
    }

    #[test]
    fn lambda_as_argument() {
        let source = "button.pressed.connect(func(): print(\"hi\"))";
        let e = Parser::new().parse_expression(source).unwrap();
        assert_eq!(e.to_string(), source);
        assert!(!e.has_invalid_tokens());
    }
}
