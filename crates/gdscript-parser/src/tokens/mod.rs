//! Token primitives: the atomic units of source text.
//!
//! Each token type owns its text and, where the grammar needs one, a reader
//! that consumes the characters belonging to it and stops at the first one
//! that does not.

mod chars;
mod identifier;
mod keyword;
mod node_path;
mod number;
mod punct;
mod string;
mod trivia;

pub use chars::{is_ident_continue, is_ident_start, is_node_path_char, is_operator_char, is_space};
pub use identifier::Identifier;
pub use keyword::Keyword;
pub use node_path::NodePath;
pub use number::{Number, NumberKind};
pub use punct::Punct;
pub use string::{Bounder, StringLiteral, StringPrefix};
pub use trivia::{Comment, InvalidToken, LineEnding, Space, Trivia};

pub(crate) use identifier::{IdentifierReader, KeywordReader};
pub(crate) use node_path::NodePathReader;
pub(crate) use number::NumberReader;
pub(crate) use string::StringReader;
pub(crate) use trivia::{CommentReader, InvalidTokenReader, Terminator};
