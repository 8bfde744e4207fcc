use std::fmt;

use gdscript_core::ParseError;

use super::chars::is_ident_continue;
use super::keyword::Keyword;
use super::trivia::{InvalidToken, LineEnding, Trivia};
use crate::node::{Leaf, SyntaxNode};
use crate::reader::{ReadContext, Resolve, Resolved, Step};

/// A name: variable, method, type, member or enum value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Identifier {
    name: String,
}

impl Identifier {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl SyntaxNode for Identifier {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        visit(Leaf::Identifier(self));
    }
}

impl PartialEq<str> for Identifier {
    fn eq(&self, other: &str) -> bool {
        self.name == other
    }
}

impl PartialEq<&str> for Identifier {
    fn eq(&self, other: &&str) -> bool {
        self.name == *other
    }
}

/// Reads one identifier. The character that ends it is left for the parent.
#[derive(Debug, Default)]
pub(crate) struct IdentifierReader {
    name: String,
}

impl IdentifierReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Resolve for IdentifierReader {
    fn name(&self) -> &'static str {
        "Identifier"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        if is_ident_continue(c) {
            self.name.push(c);
            Ok(Step::Consumed)
        } else {
            Ok(Step::Pop)
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        if self.name.is_empty() {
            Ok(Resolved::Skipped)
        } else {
            Ok(Resolved::Identifier(Identifier::new(self.name)))
        }
    }
}

/// Reads a word that must be `expected`.
///
/// Any other word is handed back as an invalid span.
#[derive(Debug)]
pub(crate) struct KeywordReader {
    expected: Keyword,
    text: String,
}

impl KeywordReader {
    pub fn new(expected: Keyword) -> Self {
        Self {
            expected,
            text: String::new(),
        }
    }
}

impl Resolve for KeywordReader {
    fn name(&self) -> &'static str {
        "Keyword"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        if is_ident_continue(c) {
            self.text.push(c);
            Ok(Step::Consumed)
        } else {
            Ok(Step::Pop)
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        if self.text.is_empty() {
            Ok(Resolved::Skipped)
        } else if self.text == self.expected.as_str() {
            Ok(Resolved::Keyword(self.expected))
        } else {
            Ok(Resolved::Trivia(Trivia::Invalid(InvalidToken::new(self.text))))
        }
    }
}
