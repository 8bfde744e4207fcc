//! Lossless GDScript syntax trees.
//!
//! This crate re-exports [`gdscript_parser`] and adds one-call helpers for
//! the common entry points. Every tree keeps the source's spacing, comments
//! and line endings, so printing it gives the input back unchanged.
//!
//! ```
//! use gdscript::ClassMembers;
//!
//! let source = "class_name Foo\nextends Node\nvar x: int = 5\nfunc bar():\n\tpass";
//! let class = gdscript::parse(source).unwrap();
//!
//! assert_eq!(class.to_string(), source);
//! let x = class.variables().next().unwrap();
//! assert_eq!(x.name().unwrap().as_str(), "x");
//! assert_eq!(x.type_node().unwrap().to_string(), "int");
//! ```

pub use gdscript_parser::*;

/// Parse a whole file with the default settings.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn parse(source: &str) -> Result<ClassDeclaration, ParseError> {
    Parser::new().parse(source)
}

/// Parse exactly one expression with the default settings.
pub fn parse_expression(source: &str) -> Result<Expression, ParseError> {
    Parser::new().parse_expression(source)
}

/// Parse exactly one statement with the default settings.
pub fn parse_statement(source: &str) -> Result<Statement, ParseError> {
    Parser::new().parse_statement(source)
}
