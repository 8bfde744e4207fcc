use std::fmt;

use gdscript_core::ParseError;

use super::trivia::LineEnding;
use crate::node::{Leaf, SyntaxNode};
use crate::reader::{ReadContext, Resolve, Resolved, Step};

/// The notation a number literal was written in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberKind {
    Int,
    Float,
    Hexadecimal,
    Binary,
}

/// A number literal, kept exactly as written.
///
/// `0xFF` and `1_000` stay `0xFF` and `1_000`; [`Number::value`] is there
/// for callers that want the numeric value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Number {
    text: String,
    kind: NumberKind,
}

impl Number {
    pub fn new(text: impl Into<String>, kind: NumberKind) -> Self {
        Self {
            text: text.into(),
            kind,
        }
    }

    /// The literal's source text.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn kind(&self) -> NumberKind {
        self.kind
    }

    /// The numeric value, or `None` if the text does not form one.
    ///
    /// Hexadecimal and binary literals are 64-bit patterns: `0xFFFFFFFFFFFFFFFF`
    /// is `-1`, as in a two's complement `int`.
    pub fn value(&self) -> Option<f64> {
        let digits: String = self.text.chars().filter(|c| *c != '_').collect();
        match self.kind {
            NumberKind::Int => digits.parse::<i64>().ok().map(|v| v as f64),
            NumberKind::Float => digits.parse::<f64>().ok(),
            NumberKind::Hexadecimal => bits(digits.get(2..)?, 16),
            NumberKind::Binary => bits(digits.get(2..)?, 2),
        }
    }
}

fn bits(digits: &str, radix: u32) -> Option<f64> {
    u64::from_str_radix(digits, radix)
        .ok()
        .map(|v| v as i64 as f64)
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl SyntaxNode for Number {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        visit(Leaf::Number(self));
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Part {
    /// Leading digits.
    Integer,
    /// After a leading `0`; `x` or `b` may follow.
    Zero,
    Hex,
    Binary,
    Fraction,
    /// Just after `e`; a sign may follow.
    ExponentSign,
    Exponent,
}

/// Reads a number literal starting with a digit.
#[derive(Debug)]
pub(crate) struct NumberReader {
    text: String,
    part: Part,
}

impl NumberReader {
    pub fn new() -> Self {
        Self {
            text: String::new(),
            part: Part::Integer,
        }
    }

    fn kind(&self) -> NumberKind {
        match self.part {
            Part::Integer | Part::Zero => NumberKind::Int,
            Part::Hex => NumberKind::Hexadecimal,
            Part::Binary => NumberKind::Binary,
            Part::Fraction | Part::ExponentSign | Part::Exponent => NumberKind::Float,
        }
    }

    fn accepts(&self, c: char) -> Option<Part> {
        let digit_or_sep = |radix: u32| c == '_' || c.is_digit(radix);
        match self.part {
            Part::Integer if self.text.is_empty() && c == '0' => Some(Part::Zero),
            Part::Integer | Part::Zero if digit_or_sep(10) => Some(Part::Integer),
            Part::Zero if matches!(c, 'x' | 'X') => Some(Part::Hex),
            Part::Zero if matches!(c, 'b' | 'B') => Some(Part::Binary),
            Part::Integer | Part::Zero if c == '.' => Some(Part::Fraction),
            Part::Integer | Part::Zero | Part::Fraction if matches!(c, 'e' | 'E') => {
                Some(Part::ExponentSign)
            }
            Part::Fraction if digit_or_sep(10) => Some(Part::Fraction),
            Part::Hex if digit_or_sep(16) => Some(Part::Hex),
            Part::Binary if digit_or_sep(2) => Some(Part::Binary),
            Part::ExponentSign if matches!(c, '+' | '-') || c.is_ascii_digit() => {
                Some(Part::Exponent)
            }
            Part::Exponent if digit_or_sep(10) => Some(Part::Exponent),
            _ => None,
        }
    }
}

impl Resolve for NumberReader {
    fn name(&self) -> &'static str {
        "Number"
    }

    fn handle_char(&mut self, c: char, _cx: &ReadContext) -> Result<Step, ParseError> {
        match self.accepts(c) {
            Some(part) => {
                self.text.push(c);
                self.part = part;
                Ok(Step::Consumed)
            }
            None => Ok(Step::Pop),
        }
    }

    fn handle_new_line(&mut self, _ending: LineEnding, _cx: &ReadContext) -> Result<Step, ParseError> {
        Ok(Step::Pop)
    }

    fn finish(self: Box<Self>) -> Result<Resolved, ParseError> {
        if self.text.is_empty() {
            return Ok(Resolved::Skipped);
        }
        let kind = self.kind();
        Ok(Resolved::Number(Number::new(self.text, kind)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gdscript_core::LineInfo;

    fn read(text: &str) -> (Number, usize) {
        let cx = ReadContext::new(LineInfo::START);
        let mut reader = Box::new(NumberReader::new());
        let mut consumed = 0;
        for c in text.chars() {
            match reader.handle_char(c, &cx).unwrap() {
                Step::Consumed => consumed += 1,
                _ => break,
            }
        }
        match reader.finish().unwrap() {
            Resolved::Number(n) => (n, consumed),
            other => panic!("unexpected {}", other.kind_name()),
        }
    }

    #[test]
    fn decimal_forms() {
        assert_eq!(read("42").0.kind(), NumberKind::Int);
        assert_eq!(read("1_000_000").0.text(), "1_000_000");
        assert_eq!(read("1_000_000").0.value(), Some(1_000_000.0));
        assert_eq!(read("0").0.kind(), NumberKind::Int);
        assert_eq!(read("3.25").0.kind(), NumberKind::Float);
        assert_eq!(read("1e-5").0.kind(), NumberKind::Float);
        assert_eq!(read("2.5E+3").0.value(), Some(2500.0));
    }

    #[test]
    fn leading_dot_fraction() {
        let (n, consumed) = read(".5");
        assert_eq!(n.kind(), NumberKind::Float);
        assert_eq!(n.text(), ".5");
        assert_eq!(n.value(), Some(0.5));
        assert_eq!(consumed, 2);
        assert_eq!(read(".25e2").0.value(), Some(25.0));
    }

    #[test]
    fn prefixed_forms() {
        let (hex, _) = read("0xFF");
        assert_eq!(hex.kind(), NumberKind::Hexadecimal);
        assert_eq!(hex.text(), "0xFF");
        assert_eq!(hex.value(), Some(255.0));

        let (bin, _) = read("0b1010");
        assert_eq!(bin.kind(), NumberKind::Binary);
        assert_eq!(bin.value(), Some(10.0));

        assert_eq!(read("0x7FFFFFFFFFFFFFFF").0.value(), Some(i64::MAX as f64));
        assert_eq!(read("0xFFFFFFFFFFFFFFFF").0.value(), Some(-1.0));
        assert_eq!(read("0x1_0000_0000_0000_0000").0.value(), None);
    }

    #[test]
    fn stops_at_foreign_characters() {
        let (n, consumed) = read("12)");
        assert_eq!(n.text(), "12");
        assert_eq!(consumed, 2);

        let (n, consumed) = read("0b12");
        assert_eq!(n.text(), "0b1");
        assert_eq!(consumed, 3);
    }
}
