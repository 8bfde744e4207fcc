use std::fmt;

use crate::node::{Leaf, SyntaxNode};

/// Single- and double-character punctuation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Punct {
    Colon,
    Comma,
    Dot,
    DoubleDot,
    Semicolon,
    Assign,
    Arrow,
    At,
    Dollar,
    Percent,
    OpenParen,
    CloseParen,
    OpenBracket,
    CloseBracket,
    OpenBrace,
    CloseBrace,
}

impl Punct {
    pub fn as_str(&self) -> &'static str {
        match self {
            Punct::Colon => ":",
            Punct::Comma => ",",
            Punct::Dot => ".",
            Punct::DoubleDot => "..",
            Punct::Semicolon => ";",
            Punct::Assign => "=",
            Punct::Arrow => "->",
            Punct::At => "@",
            Punct::Dollar => "$",
            Punct::Percent => "%",
            Punct::OpenParen => "(",
            Punct::CloseParen => ")",
            Punct::OpenBracket => "[",
            Punct::CloseBracket => "]",
            Punct::OpenBrace => "{",
            Punct::CloseBrace => "}",
        }
    }

    /// The punctuation spelled by a single character.
    pub fn from_char(c: char) -> Option<Punct> {
        Some(match c {
            ':' => Punct::Colon,
            ',' => Punct::Comma,
            '.' => Punct::Dot,
            ';' => Punct::Semicolon,
            '=' => Punct::Assign,
            '@' => Punct::At,
            '$' => Punct::Dollar,
            '%' => Punct::Percent,
            '(' => Punct::OpenParen,
            ')' => Punct::CloseParen,
            '[' => Punct::OpenBracket,
            ']' => Punct::CloseBracket,
            '{' => Punct::OpenBrace,
            '}' => Punct::CloseBrace,
            _ => return None,
        })
    }

    /// The closing counterpart of an opening bracket.
    pub fn closing(&self) -> Option<Punct> {
        match self {
            Punct::OpenParen => Some(Punct::CloseParen),
            Punct::OpenBracket => Some(Punct::CloseBracket),
            Punct::OpenBrace => Some(Punct::CloseBrace),
            _ => None,
        }
    }
}

impl fmt::Display for Punct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyntaxNode for Punct {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        visit(Leaf::Punct(*self));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brackets_pair_up() {
        assert_eq!(Punct::OpenParen.closing(), Some(Punct::CloseParen));
        assert_eq!(Punct::OpenBrace.closing(), Some(Punct::CloseBrace));
        assert_eq!(Punct::Comma.closing(), None);
    }

    #[test]
    fn single_chars() {
        for c in ":,.;=@$%()[]{}".chars() {
            let punct = Punct::from_char(c).unwrap();
            assert_eq!(punct.as_str(), c.to_string());
        }
        assert_eq!(Punct::from_char('-'), None);
    }
}
