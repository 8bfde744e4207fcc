//! Entry points of the parser.

use gdscript_core::ParseError;

use crate::block::BlockReader;
use crate::decl::{ClassDeclaration, ClassMember};
use crate::expr::{Expression, ExpressionFlags, ExpressionResolver};
use crate::list::SyntaxList;
use crate::reader::{ReadContext, ReadSettings, Reader, Resolve, Resolved, Step};
use crate::stmt::{Statement, StatementResolver};
use crate::tokens::{LineEnding, is_space};

/// Parses GDScript source into lossless syntax trees.
///
/// Malformed source does not fail a parse: it is kept as invalid tokens in
/// the tree. An `Err` means the grammar engine broke one of its own rules.
///
/// ```
/// use gdscript_parser::{ClassMembers, Parser};
///
/// let source = "extends Node\nvar x: int = 5\n";
/// let class = Parser::new().parse(source).unwrap();
/// assert_eq!(class.to_string(), source);
/// assert_eq!(class.variables().count(), 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Parser {
    settings: ReadSettings,
}

impl Parser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: ReadSettings) -> Self {
        Self { settings }
    }

    /// Parse a whole file. The root is always a class, even without a
    /// `class_name` line.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse(&self, source: &str) -> Result<ClassDeclaration, ParseError> {
        tracing::debug!(len = source.len(), "parsing class");
        let root = BlockReader::<ClassMember>::root();
        match self.run(Box::new(root), source)? {
            Resolved::Members(members) => {
                tracing::debug!(members = members.len(), "parsed class");
                Ok(ClassDeclaration { members })
            }
            other => Err(unexpected("class members", &other)),
        }
    }

    /// Parse the lines of a method body without the method around them.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_statements(&self, source: &str) -> Result<SyntaxList<Statement>, ParseError> {
        tracing::debug!(len = source.len(), "parsing statements");
        let root = BlockReader::<Statement>::root();
        match self.run(Box::new(root), source)? {
            Resolved::Statements(list) => Ok(list),
            other => Err(unexpected("statements", &other)),
        }
    }

    /// Parse exactly one statement. Anything around it, leading or
    /// trailing whitespace included, is an [`ParseError::UnexpectedRoot`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_statement(&self, source: &str) -> Result<Statement, ParseError> {
        tracing::debug!(len = source.len(), "parsing statement");
        let entry = Entry::new("statement", start_statement);
        match self.run(Box::new(entry), source)? {
            Resolved::Statement(statement) => Ok(statement),
            other => Err(unexpected("statement", &other)),
        }
    }

    /// Parse exactly one expression, with the same strictness as
    /// [`Parser::parse_statement`].
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn parse_expression(&self, source: &str) -> Result<Expression, ParseError> {
        tracing::debug!(len = source.len(), "parsing expression");
        let entry = Entry::new("expression", start_expression);
        match self.run(Box::new(entry), source)? {
            Resolved::Expression(expression) => Ok(expression),
            other => Err(unexpected("expression", &other)),
        }
    }

    fn run(&self, root: Box<dyn Resolve>, source: &str) -> Result<Resolved, ParseError> {
        let mut reader = Reader::new(root, self.settings);
        reader.read(source)?;
        reader.finish()
    }
}

fn start_statement() -> Box<dyn Resolve> {
    Box::new(StatementResolver::new())
}

fn start_expression() -> Box<dyn Resolve> {
    Box::new(ExpressionResolver::new(ExpressionFlags::empty()))
}

fn unexpected(expected: &'static str, found: &Resolved) -> ParseError {
    ParseError::UnexpectedRoot {
        expected,
        found: found.kind_name(),
    }
}

/// Root frame for the sub-grammar entry points.
///
/// Pushes one starter node at the first input and records whether any
/// input was left over once it popped.
struct Entry {
    expected: &'static str,
    start: fn() -> Box<dyn Resolve>,
    started: bool,
    value: Option<Resolved>,
    stray: bool,
}

impl Entry {
    fn new(expected: &'static str, start: fn() -> Box<dyn Resolve>) -> Self {
        Self {
            expected,
            start,
            started: false,
            value: None,
            stray: false,
        }
    }
}

impl Resolve for Entry {
    fn name(&self) -> &'static str {
        "Entry"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        if !self.started && !is_space(c) {
            self.started = true;
            return Ok(Step::Push((self.start)()));
        }
        self.stray = true;
        Ok(Step::Consumed)
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        self.stray = true;
        Ok(Step::Consumed)
    }

    fn handle_continuation(
        &mut self,
        _ending: LineEnding,
        _cx: &ReadContext,
    ) -> Result<Step, ParseError> {
        self.stray = true;
        Ok(Step::Consumed)
    }

    fn handle_eof(&mut self, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Consumed)
    }

    fn receive(&mut self, value: Resolved) -> Result<(), ParseError> {
        match value {
            Resolved::Skipped => {}
            Resolved::Trivia(_) => self.stray = true,
            value if self.value.is_none() => self.value = Some(value),
            _ => self.stray = true,
        }
        Ok(())
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        match self.value {
            Some(value) if !self.stray => Ok(value),
            Some(_) => Err(ParseError::UnexpectedRoot {
                expected: self.expected,
                found: "trailing input",
            }),
            None => Err(ParseError::UnexpectedRoot {
                expected: self.expected,
                found: "nothing",
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decl::ClassMembers;
    use crate::node::SyntaxNode;
    use gdscript_core::ParseErrorKind;

    #[test]
    fn class_with_members() {
        let source = "class_name Foo\nextends Node\nvar x: int = 5\nfunc bar():\n\tpass";
        let class = Parser::new().parse(source).unwrap();
        assert_eq!(class.to_string(), source);
        assert!(!class.has_invalid_tokens());

        let vars: Vec<_> = class.variables().collect();
        assert_eq!(vars.len(), 1);
        assert_eq!(vars[0].name().unwrap().as_str(), "x");
        assert_eq!(vars[0].type_node().unwrap().to_string(), "int");
        assert_eq!(vars[0].initializer().unwrap().to_string(), "5");

        let methods: Vec<_> = class.methods().collect();
        assert_eq!(methods.len(), 1);
        assert_eq!(methods[0].name().unwrap().as_str(), "bar");
        let body = methods[0].statements().unwrap();
        assert_eq!(body.len(), 1);
        assert_eq!(body.first(), Some(&Statement::Pass));

        assert_eq!(class.class_name().unwrap().name().unwrap().as_str(), "Foo");
        assert_eq!(class.extends().unwrap().to_string(), "Node");
    }

    #[test]
    fn line_endings_are_kept() {
        for source in ["var a\r\nvar b\r\n", "var a\rvar b", "var a\n\n\nvar b\n"] {
            let class = Parser::new().parse(source).unwrap();
            assert_eq!(class.to_string(), source);
            assert_eq!(class.variables().count(), 2);
        }
    }

    #[test]
    fn expression_entry_is_strict() {
        let parser = Parser::new();
        assert!(parser.parse_expression("a + b").is_ok());
        for source in ["", "a + b\n", "a)", "  a"] {
            let err = parser.parse_expression(source).unwrap_err();
            assert_eq!(err.kind(), ParseErrorKind::UnexpectedRoot, "{source:?}");
        }
    }

    #[test]
    fn statement_entry_is_strict() {
        let parser = Parser::new();
        assert!(parser.parse_statement("x += 1").is_ok());
        assert_eq!(
            parser.parse_statement("").unwrap_err().kind(),
            ParseErrorKind::UnexpectedRoot
        );
        assert_eq!(
            parser.parse_statement("pass\npass").unwrap_err().kind(),
            ParseErrorKind::UnexpectedRoot
        );
    }

    #[test]
    fn stall_guard_is_configurable() {
        let parser = Parser::with_settings(ReadSettings {
            max_dispatch_per_input: 1,
        });
        let err = parser.parse("var x = 1").unwrap_err();
        assert_eq!(err.kind(), ParseErrorKind::Stalled);
    }
}
