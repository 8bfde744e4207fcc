//! GDScript parser crate.
//!
//! This crate reads GDScript source into a lossless syntax tree. It
//! includes:
//! - A character-at-a-time stack machine that drives the parse
//! - Token types, trivia included, for every byte of the source
//! - Syntax nodes for classes, members, statements, expressions and types
//! - Typed queries over class members
//! - A visitor for structural traversal
//!
//! Printing any node reproduces its source exactly, so
//! `parse(text).to_string() == text` holds for every input, malformed ones
//! included.
//!
//! # Example
//!
//! ```
//! use gdscript_parser::{ClassMembers, Parser};
//!
//! let source = "extends Node\n\nsignal hit(damage: int)\n\nfunc _ready():\n\tprint(\"ready\")\n";
//! let class = Parser::new().parse(source).unwrap();
//!
//! assert_eq!(class.to_string(), source);
//! assert_eq!(class.extends().unwrap().to_string(), "Node");
//! assert_eq!(class.signals().count(), 1);
//! assert_eq!(class.methods().count(), 1);
//! ```

mod block;
mod form;
mod parser;
mod reader;

pub mod decl;
pub mod expr;
pub mod list;
pub mod node;
pub mod stmt;
pub mod tokens;
pub mod types;
pub mod visitor;

// Re-export error types from core
pub use gdscript_core::{LineInfo, ParseError, ParseErrorKind, Position};

pub use decl::*;
pub use expr::*;
pub use list::{BracketedList, ListPart, SyntaxList};
pub use node::{Leaf, SyntaxNode};
pub use parser::Parser;
pub use reader::ReadSettings;
pub use stmt::*;
pub use tokens::{
    Bounder, Comment, Identifier, InvalidToken, Keyword, LineEnding, NodePath, Number, NumberKind,
    Punct, Space, StringLiteral, StringPrefix, Trivia,
};
pub use types::{GenericType, SubType, TypeNode};
