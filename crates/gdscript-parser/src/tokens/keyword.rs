use std::fmt;

use crate::node::{Leaf, SyntaxNode};

/// Reserved and contextual words.
///
/// `get`, `set`, `when` and `tool` are only keywords where the grammar
/// expects them; elsewhere they read as identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Var,
    Const,
    Static,
    Func,
    Class,
    ClassName,
    Extends,
    Signal,
    Enum,
    If,
    Elif,
    Else,
    For,
    While,
    Match,
    When,
    Return,
    Pass,
    Break,
    Continue,
    Breakpoint,
    In,
    Is,
    As,
    Not,
    And,
    Or,
    Await,
    True,
    False,
    Tool,
    Get,
    Set,
}

impl Keyword {
    pub fn as_str(&self) -> &'static str {
        use Keyword::*;
        match self {
            Var => "var",
            Const => "const",
            Static => "static",
            Func => "func",
            Class => "class",
            ClassName => "class_name",
            Extends => "extends",
            Signal => "signal",
            Enum => "enum",
            If => "if",
            Elif => "elif",
            Else => "else",
            For => "for",
            While => "while",
            Match => "match",
            When => "when",
            Return => "return",
            Pass => "pass",
            Break => "break",
            Continue => "continue",
            Breakpoint => "breakpoint",
            In => "in",
            Is => "is",
            As => "as",
            Not => "not",
            And => "and",
            Or => "or",
            Await => "await",
            True => "true",
            False => "false",
            Tool => "tool",
            Get => "get",
            Set => "set",
        }
    }

    /// Look up the keyword spelled `word`.
    pub fn from_word(word: &str) -> Option<Keyword> {
        use Keyword::*;
        Some(match word {
            "var" => Var,
            "const" => Const,
            "static" => Static,
            "func" => Func,
            "class" => Class,
            "class_name" => ClassName,
            "extends" => Extends,
            "signal" => Signal,
            "enum" => Enum,
            "if" => If,
            "elif" => Elif,
            "else" => Else,
            "for" => For,
            "while" => While,
            "match" => Match,
            "when" => When,
            "return" => Return,
            "pass" => Pass,
            "break" => Break,
            "continue" => Continue,
            "breakpoint" => Breakpoint,
            "in" => In,
            "is" => Is,
            "as" => As,
            "not" => Not,
            "and" => And,
            "or" => Or,
            "await" => Await,
            "true" => True,
            "false" => False,
            "tool" => Tool,
            "get" => Get,
            "set" => Set,
            _ => return None,
        })
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SyntaxNode for Keyword {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        visit(Leaf::Keyword(*self));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_round_trip() {
        for kw in [
            Keyword::Var,
            Keyword::ClassName,
            Keyword::Breakpoint,
            Keyword::Await,
            Keyword::Set,
        ] {
            assert_eq!(Keyword::from_word(kw.as_str()), Some(kw));
        }
    }

    #[test]
    fn non_keywords() {
        assert_eq!(Keyword::from_word("self"), None);
        assert_eq!(Keyword::from_word("Var"), None);
        assert_eq!(Keyword::from_word("preload"), None);
    }
}
