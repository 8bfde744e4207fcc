use std::fmt;

use gdscript_core::ParseError;

use super::trivia::{InvalidToken, LineEnding, Trivia};
use crate::node::{Leaf, SyntaxNode};
use crate::reader::{ReadContext, Resolve, Resolved, Step};

/// The quotes around a string literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bounder {
    /// `"..."`
    Double,
    /// `'...'`
    Single,
    /// `"""..."""`
    TripleDouble,
    /// `'''...'''`
    TripleSingle,
}

impl Bounder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Bounder::Double => "\"",
            Bounder::Single => "'",
            Bounder::TripleDouble => "\"\"\"",
            Bounder::TripleSingle => "'''",
        }
    }

    pub fn quote(&self) -> char {
        match self {
            Bounder::Double | Bounder::TripleDouble => '"',
            Bounder::Single | Bounder::TripleSingle => '\'',
        }
    }

    /// Whether the literal may span lines.
    pub fn is_multiline(&self) -> bool {
        matches!(self, Bounder::TripleDouble | Bounder::TripleSingle)
    }
}

/// The prefix that turns a string into another literal type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StringPrefix {
    /// `&"name"`, a StringName.
    StringName,
    /// `^"path"`, a NodePath.
    NodePath,
    /// `r"text"`, a raw string whose escapes are not processed.
    Raw,
}

impl StringPrefix {
    pub fn as_char(&self) -> char {
        match self {
            StringPrefix::StringName => '&',
            StringPrefix::NodePath => '^',
            StringPrefix::Raw => 'r',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '&' => Some(StringPrefix::StringName),
            '^' => Some(StringPrefix::NodePath),
            'r' => Some(StringPrefix::Raw),
            _ => None,
        }
    }
}

/// A string literal. Escape sequences are kept as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringLiteral {
    prefix: Option<StringPrefix>,
    bounder: Bounder,
    content: String,
    terminated: bool,
}

impl StringLiteral {
    /// A terminated literal.
    pub fn new(bounder: Bounder, content: impl Into<String>) -> Self {
        Self {
            prefix: None,
            bounder,
            content: content.into(),
            terminated: true,
        }
    }

    pub fn with_prefix(mut self, prefix: StringPrefix) -> Self {
        self.prefix = Some(prefix);
        self
    }

    pub fn prefix(&self) -> Option<StringPrefix> {
        self.prefix
    }

    pub fn bounder(&self) -> Bounder {
        self.bounder
    }

    /// The raw text between the quotes.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Whether the closing quotes were found.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }
}

impl fmt::Display for StringLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(prefix) = self.prefix {
            write!(f, "{}", prefix.as_char())?;
        }
        f.write_str(self.bounder.as_str())?;
        f.write_str(&self.content)?;
        if self.terminated {
            f.write_str(self.bounder.as_str())?;
        }
        Ok(())
    }
}

impl SyntaxNode for StringLiteral {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        visit(Leaf::String(self));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Prefix,
    Open,
    /// One quote seen; a second one means `""` or the start of `"""`.
    SecondQuote,
    /// Two quotes seen; a third one opens a triple-quoted string.
    ThirdQuote,
    Content,
    Escape,
    Done,
}

/// Reads a string literal, optionally prefixed with `&`, `^` or `r`.
///
/// A backslash always takes the next character with it, so `\"` never
/// closes a string, raw or not.
#[derive(Debug)]
pub(crate) struct StringReader {
    phase: Phase,
    prefix: Option<StringPrefix>,
    bounder: Bounder,
    content: String,
    /// Closing quotes seen in a row inside a triple-quoted string.
    closing: usize,
    terminated: bool,
}

impl StringReader {
    pub fn new() -> Self {
        Self {
            phase: Phase::Open,
            prefix: None,
            bounder: Bounder::Double,
            content: String::new(),
            closing: 0,
            terminated: false,
        }
    }

    /// A reader whose first character is a `&`, `^` or `r` prefix.
    pub fn prefixed() -> Self {
        Self {
            phase: Phase::Prefix,
            ..Self::new()
        }
    }

    fn flush_closing(&mut self) {
        for _ in 0..self.closing {
            self.content.push(self.bounder.quote());
        }
        self.closing = 0;
    }
}

impl Resolve for StringReader {
    fn name(&self) -> &'static str {
        "String"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.phase {
            Phase::Prefix => {
                self.prefix = StringPrefix::from_char(c);
                self.phase = Phase::Open;
                Ok(Step::Consumed)
            }
            Phase::Open => {
                if c != '"' && c != '\'' {
                    return Ok(Step::Pop);
                }
                self.bounder = if c == '"' {
                    Bounder::Double
                } else {
                    Bounder::Single
                };
                self.phase = Phase::SecondQuote;
                Ok(Step::Consumed)
            }
            Phase::SecondQuote if c == self.bounder.quote() => {
                self.phase = Phase::ThirdQuote;
                Ok(Step::Consumed)
            }
            Phase::SecondQuote => {
                self.phase = Phase::Content;
                Ok(Step::Retry)
            }
            Phase::ThirdQuote if c == self.bounder.quote() => {
                self.bounder = if c == '"' {
                    Bounder::TripleDouble
                } else {
                    Bounder::TripleSingle
                };
                self.phase = Phase::Content;
                Ok(Step::Consumed)
            }
            Phase::ThirdQuote => {
                // `""`: an empty string.
                self.terminated = true;
                self.phase = Phase::Done;
                Ok(Step::Pop)
            }
            Phase::Content if self.bounder.is_multiline() => {
                if c == self.bounder.quote() {
                    self.closing += 1;
                    if self.closing == 3 {
                        self.closing = 0;
                        self.terminated = true;
                        self.phase = Phase::Done;
                    }
                    return Ok(Step::Consumed);
                }
                self.flush_closing();
                if c == '\\' {
                    self.phase = Phase::Escape;
                }
                self.content.push(c);
                Ok(Step::Consumed)
            }
            Phase::Content => {
                if c == self.bounder.quote() {
                    self.terminated = true;
                    self.phase = Phase::Done;
                } else {
                    if c == '\\' {
                        self.phase = Phase::Escape;
                    }
                    self.content.push(c);
                }
                Ok(Step::Consumed)
            }
            Phase::Escape => {
                self.content.push(c);
                self.phase = Phase::Content;
                Ok(Step::Consumed)
            }
            Phase::Done => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.phase {
            Phase::Content | Phase::Escape if self.bounder.is_multiline() => {
                self.flush_closing();
                self.content.push_str(ending.as_str());
                self.phase = Phase::Content;
                Ok(Step::Consumed)
            }
            Phase::ThirdQuote => {
                self.terminated = true;
                self.phase = Phase::Done;
                Ok(Step::Pop)
            }
            _ => Ok(Step::Pop),
        }
    }

    fn handle_eof(&mut self, _cx: &ReadContext) -> Result<Step, ParseError> {
        if self.phase == Phase::ThirdQuote {
            self.terminated = true;
        }
        Ok(Step::Pop)
    }

    fn keeps_backslash(&self) -> bool {
        matches!(
            self.phase,
            Phase::SecondQuote | Phase::Content | Phase::Escape
        )
    }

    fn finish(mut self: Box<Self>) -> Result<Resolved, ParseError> {
        if self.phase == Phase::Open {
            // A prefix with no quote after it.
            return Ok(match self.prefix {
                Some(prefix) => Resolved::Trivia(Trivia::Invalid(InvalidToken::new(
                    prefix.as_char().to_string(),
                ))),
                None => Resolved::Skipped,
            });
        }
        self.flush_closing();
        Ok(Resolved::String(StringLiteral {
            prefix: self.prefix,
            bounder: self.bounder,
            content: self.content,
            terminated: self.terminated,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdscript_core::LineInfo;

    fn read(mut reader: StringReader, text: &str) -> (Resolved, String) {
        let cx = ReadContext::new(LineInfo::START);
        let mut rest = String::new();
        let mut done = false;
        for c in text.chars() {
            if done {
                rest.push(c);
                continue;
            }
            let step = if c == '\n' {
                reader.handle_new_line(LineEnding::Lf, &cx).unwrap()
            } else {
                reader.handle_char(c, &cx).unwrap()
            };
            match step {
                Step::Consumed => {}
                Step::Retry => {
                    let step = reader.handle_char(c, &cx).unwrap();
                    assert!(matches!(step, Step::Consumed));
                }
                _ => {
                    done = true;
                    rest.push(c);
                }
            }
        }
        if !done {
            reader.handle_eof(&cx).unwrap();
        }
        (Box::new(reader).finish().unwrap(), rest)
    }

    fn string(resolved: Resolved) -> StringLiteral {
        match resolved {
            Resolved::String(s) => s,
            other => panic!("unexpected {}", other.kind_name()),
        }
    }

    #[test]
    fn simple_strings() {
        let (s, rest) = read(StringReader::new(), "\"hello\" + x");
        let s = string(s);
        assert_eq!(s.content(), "hello");
        assert_eq!(s.bounder(), Bounder::Double);
        assert_eq!(rest, " + x");

        let s = string(read(StringReader::new(), "'a\\'b'").0);
        assert_eq!(s.content(), "a\\'b");
        assert_eq!(s.to_string(), "'a\\'b'");
    }

    #[test]
    fn empty_and_triple() {
        let (s, rest) = read(StringReader::new(), "\"\")");
        let s = string(s);
        assert!(s.is_terminated());
        assert_eq!(s.content(), "");
        assert_eq!(rest, ")");

        let s = string(read(StringReader::new(), "\"\"\"a\n\"b\"\"\"\"").0);
        assert_eq!(s.bounder(), Bounder::TripleDouble);
        assert_eq!(s.content(), "a\n\"b");
        assert_eq!(s.to_string(), "\"\"\"a\n\"b\"\"\"");
    }

    #[test]
    fn prefixes() {
        let s = string(read(StringReader::prefixed(), "&\"name\"").0);
        assert_eq!(s.prefix(), Some(StringPrefix::StringName));
        assert_eq!(s.to_string(), "&\"name\"");

        let s = string(read(StringReader::prefixed(), "^'path'").0);
        assert_eq!(s.prefix(), Some(StringPrefix::NodePath));

        let s = string(read(StringReader::prefixed(), "r\"C:\\dir\\\"x\"").0);
        assert_eq!(s.prefix(), Some(StringPrefix::Raw));
        assert_eq!(s.content(), "C:\\dir\\\"x");
        assert_eq!(s.to_string(), "r\"C:\\dir\\\"x\"");

        match read(StringReader::prefixed(), "&x").0 {
            Resolved::Trivia(t) => assert_eq!(t.to_string(), "&"),
            other => panic!("unexpected {}", other.kind_name()),
        }
    }

    #[test]
    fn unterminated_stops_at_line_end() {
        let (s, rest) = read(StringReader::new(), "\"open\nnext");
        let s = string(s);
        assert!(!s.is_terminated());
        assert_eq!(s.to_string(), "\"open");
        assert_eq!(rest, "\nnext");
    }
}
