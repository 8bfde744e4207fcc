//! Trivia: spaces, line endings, comments and invalid spans.
//!
//! None of these carry grammatical meaning, but all of them are kept so
//! the tree prints back to its exact source.

use std::fmt;

use gdscript_core::ParseError;

use super::chars::is_space;
use crate::node::{Leaf, SyntaxNode};
use crate::reader::{ReadContext, Resolve, Resolved, Step};

/// The bytes that ended a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineEnding {
    /// `\n`
    Lf,
    /// `\r\n`
    CrLf,
    /// A lone `\r`
    Cr,
}

impl LineEnding {
    /// The source text of this line ending.
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
            LineEnding::Cr => "\r",
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.as_str().len()
    }
}

/// A run of spaces and tabs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Space {
    text: String,
}

impl Space {
    /// Create a space run. Characters other than spaces and tabs are dropped.
    pub fn new(text: &str) -> Self {
        Self {
            text: text.chars().filter(|c| is_space(*c)).collect(),
        }
    }

    pub(crate) fn from_char(c: char) -> Self {
        Self {
            text: c.to_string(),
        }
    }

    pub(crate) fn push(&mut self, c: char) {
        self.text.push(c);
    }

    pub(crate) fn push_str(&mut self, s: &str) {
        self.text.push_str(s);
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Number of characters in the run.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A `#` comment, up to but not including the line ending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    text: String,
}

impl Comment {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The full comment text, `#` included.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The comment text after the leading `#` characters.
    pub fn content(&self) -> &str {
        self.text.trim_start_matches('#')
    }

    /// Whether this is a `##` documentation comment.
    pub fn is_doc(&self) -> bool {
        self.text.starts_with("##")
    }
}

/// A span of source the grammar could not place.
///
/// Invalid spans never abort a parse. They are stored as trivia in front of
/// whatever slot was being filled when they were read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidToken {
    text: String,
}

impl InvalidToken {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

/// Anything the grammar skips over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Trivia {
    Space(Space),
    NewLine(LineEnding),
    Comment(Comment),
    Invalid(InvalidToken),
    /// A `\` joining its line with the next, together with that line ending.
    Continuation(LineEnding),
}

impl Trivia {
    /// Whether this trivia is a line ending.
    pub fn is_new_line(&self) -> bool {
        matches!(self, Trivia::NewLine(_))
    }
}

impl fmt::Display for Trivia {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trivia::Space(t) => f.write_str(t.as_str()),
            Trivia::NewLine(t) => f.write_str(t.as_str()),
            Trivia::Comment(t) => f.write_str(t.as_str()),
            Trivia::Invalid(t) => f.write_str(t.as_str()),
            Trivia::Continuation(t) => write!(f, "\\{}", t.as_str()),
        }
    }
}

impl SyntaxNode for Trivia {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        visit(Leaf::Trivia(self));
    }
}

/// Reads a `#` comment up to the end of its line.
#[derive(Debug, Default)]
pub(crate) struct CommentReader {
    text: String,
}

impl CommentReader {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Resolve for CommentReader {
    fn name(&self) -> &'static str {
        "Comment"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        self.text.push(c);
        Ok(Step::Consumed)
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn keeps_backslash(&self) -> bool {
        true
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        Ok(Resolved::Trivia(Trivia::Comment(Comment::new(self.text))))
    }
}

/// Where an invalid span stops.
///
/// A line ending always stops it. The character that stops it is not part
/// of the span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Terminator {
    chars: &'static str,
    spaces: bool,
}

impl Terminator {
    /// Stop at any of `chars`.
    pub const fn chars(chars: &'static str) -> Self {
        Self {
            chars,
            spaces: false,
        }
    }

    /// Also stop at spaces and tabs.
    pub const fn or_space(mut self) -> Self {
        self.spaces = true;
        self
    }

    pub fn matches(&self, c: char) -> bool {
        self.chars.contains(c) || (self.spaces && is_space(c))
    }
}

/// Collects characters into an [`InvalidToken`] until its terminator.
pub(crate) struct InvalidTokenReader {
    text: String,
    stop: Terminator,
}

impl InvalidTokenReader {
    pub fn new(stop: Terminator) -> Self {
        Self {
            text: String::new(),
            stop,
        }
    }
}

impl Resolve for InvalidTokenReader {
    fn name(&self) -> &'static str {
        "InvalidToken"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        // The first character is always taken so the reader makes progress.
        if !self.text.is_empty() && (self.stop.matches(c) || c == '#') {
            return Ok(Step::Pop);
        }
        self.text.push(c);
        Ok(Step::Consumed)
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        if self.text.is_empty() {
            return Ok(Resolved::Skipped);
        }
        Ok(Resolved::Trivia(Trivia::Invalid(InvalidToken::new(self.text))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_endings() {
        assert_eq!(LineEnding::Lf.as_str(), "\n");
        assert_eq!(LineEnding::CrLf.as_str(), "\r\n");
        assert_eq!(LineEnding::Cr.len(), 1);
        assert_eq!(LineEnding::CrLf.len(), 2);
    }

    #[test]
    fn space_keeps_only_blanks() {
        let space = Space::new(" \tx ");
        assert_eq!(space.as_str(), " \t ");
        assert_eq!(space.len(), 3);
    }

    #[test]
    fn comment_content() {
        let doc = Comment::new("## Documented");
        assert!(doc.is_doc());
        assert_eq!(doc.content(), " Documented");

        let plain = Comment::new("# note");
        assert!(!plain.is_doc());
    }

    #[test]
    fn terminator_matching() {
        let stop = Terminator::chars(",)").or_space();
        assert!(stop.matches(','));
        assert!(stop.matches(' '));
        assert!(!stop.matches('a'));

        assert!(!Terminator::chars("{").matches(' '));
    }

    #[test]
    fn trivia_display() {
        assert_eq!(Trivia::NewLine(LineEnding::CrLf).to_string(), "\r\n");
        assert_eq!(Trivia::Invalid(InvalidToken::new("?!")).to_string(), "?!");
        assert_eq!(Trivia::Continuation(LineEnding::Lf).to_string(), "\\\n");
    }
}
