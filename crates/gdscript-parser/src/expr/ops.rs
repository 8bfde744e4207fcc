//! Operator definitions for GDScript expressions.
//!
//! Provides enums for binary ("dual") and unary ("single") operators along
//! with the precedence and associativity used to re-associate operator
//! chains.

use std::fmt;

use crate::tokens::Space;

/// Binary operators.
///
/// Organized by precedence from lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DualOperatorKind {
    // Assignment (precedence 1)
    /// `=`
    Assign,
    /// `+=`
    AddAssign,
    /// `-=`
    SubAssign,
    /// `*=`
    MulAssign,
    /// `/=`
    DivAssign,
    /// `%=`
    ModAssign,
    /// `**=`
    PowAssign,
    /// `<<=`
    ShiftLeftAssign,
    /// `>>=`
    ShiftRightAssign,
    /// `&=`
    BitAndAssign,
    /// `|=`
    BitOrAssign,
    /// `^=`
    BitXorAssign,

    // Cast (precedence 2)
    /// `as`
    As,

    // Logical (precedence 4 and 5)
    /// `or` or `||`
    Or,
    /// `and` or `&&`
    And,

    // Membership (precedence 7)
    /// `in`, or `not in` when negated
    In,

    // Comparison (precedence 8)
    /// `==`
    Equal,
    /// `!=`
    NotEqual,
    /// `<`
    Less,
    /// `<=`
    LessEqual,
    /// `>`
    Greater,
    /// `>=`
    GreaterEqual,

    // Bitwise (precedence 9 to 11)
    /// `|`
    BitOr,
    /// `^`
    BitXor,
    /// `&`
    BitAnd,

    // Shift (precedence 12)
    /// `<<`
    ShiftLeft,
    /// `>>`
    ShiftRight,

    // Additive (precedence 13)
    /// `+`
    Add,
    /// `-`
    Sub,

    // Multiplicative (precedence 14)
    /// `*`
    Mul,
    /// `/`
    Div,
    /// `%`
    Mod,

    // Power (precedence 17)
    /// `**`
    Pow,

    // Type test (precedence 18)
    /// `is`, or `is not` when negated
    Is,
}

/// Every operator spelled with symbols, longest first within a prefix.
const SYMBOLS: &[(&str, DualOperatorKind)] = &[
    ("=", DualOperatorKind::Assign),
    ("+=", DualOperatorKind::AddAssign),
    ("-=", DualOperatorKind::SubAssign),
    ("*=", DualOperatorKind::MulAssign),
    ("/=", DualOperatorKind::DivAssign),
    ("%=", DualOperatorKind::ModAssign),
    ("**=", DualOperatorKind::PowAssign),
    ("<<=", DualOperatorKind::ShiftLeftAssign),
    (">>=", DualOperatorKind::ShiftRightAssign),
    ("&=", DualOperatorKind::BitAndAssign),
    ("|=", DualOperatorKind::BitOrAssign),
    ("^=", DualOperatorKind::BitXorAssign),
    ("||", DualOperatorKind::Or),
    ("&&", DualOperatorKind::And),
    ("==", DualOperatorKind::Equal),
    ("!=", DualOperatorKind::NotEqual),
    ("<", DualOperatorKind::Less),
    ("<=", DualOperatorKind::LessEqual),
    (">", DualOperatorKind::Greater),
    (">=", DualOperatorKind::GreaterEqual),
    ("|", DualOperatorKind::BitOr),
    ("^", DualOperatorKind::BitXor),
    ("&", DualOperatorKind::BitAnd),
    ("<<", DualOperatorKind::ShiftLeft),
    (">>", DualOperatorKind::ShiftRight),
    ("+", DualOperatorKind::Add),
    ("-", DualOperatorKind::Sub),
    ("*", DualOperatorKind::Mul),
    ("/", DualOperatorKind::Div),
    ("%", DualOperatorKind::Mod),
    ("**", DualOperatorKind::Pow),
];

impl DualOperatorKind {
    /// Get the binding power (precedence) for this operator.
    ///
    /// Higher values bind more tightly. Returns (left_bp, right_bp).
    /// For left-associative operators: right_bp = left_bp + 1
    /// For right-associative operators: right_bp = left_bp
    pub fn binding_power(&self) -> (u8, u8) {
        use DualOperatorKind::*;
        match self {
            // Precedence 1 - Assignment (right-associative)
            Assign | AddAssign | SubAssign | MulAssign | DivAssign | ModAssign | PowAssign
            | ShiftLeftAssign | ShiftRightAssign | BitAndAssign | BitOrAssign | BitXorAssign => {
                (2, 2)
            }

            // Precedence 2 - Cast
            As => (4, 5),

            // Precedence 3 is the ternary, see `TERNARY_BINDING_POWER`

            // Precedence 4 - Logical OR
            Or => (8, 9),

            // Precedence 5 - Logical AND
            And => (10, 11),

            // Precedence 6 is prefix `not`

            // Precedence 7 - Membership
            In => (14, 15),

            // Precedence 8 - Comparison
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual => (16, 17),

            // Precedence 9 to 11 - Bitwise
            BitOr => (18, 19),
            BitXor => (20, 21),
            BitAnd => (22, 23),

            // Precedence 12 - Shift
            ShiftLeft | ShiftRight => (24, 25),

            // Precedence 13 - Additive
            Add | Sub => (26, 27),

            // Precedence 14 - Multiplicative
            Mul | Div | Mod => (28, 29),

            // Precedence 15 and 16 are prefix `-`, `+` and `~`

            // Precedence 17 - Power
            Pow => (34, 35),

            // Precedence 18 - Type test
            Is => (36, 37),
        }
    }

    /// Look up an operator spelled with symbols.
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        SYMBOLS
            .iter()
            .find(|(text, _)| *text == symbol)
            .map(|(_, kind)| *kind)
    }

    /// Look up an operator spelled as a word. `not` alone is not one.
    pub fn from_word(word: &str) -> Option<Self> {
        Some(match word {
            "and" => DualOperatorKind::And,
            "or" => DualOperatorKind::Or,
            "in" => DualOperatorKind::In,
            "is" => DualOperatorKind::Is,
            "as" => DualOperatorKind::As,
            _ => return None,
        })
    }

    /// Whether this is `=` or a compound assignment.
    pub fn is_assignment(&self) -> bool {
        self.binding_power() == (2, 2)
    }

    /// Check if this operator is comparison-related.
    pub fn is_comparison(&self) -> bool {
        use DualOperatorKind::*;
        matches!(
            self,
            Equal | NotEqual | Less | LessEqual | Greater | GreaterEqual
        )
    }

    fn symbol(&self) -> Option<&'static str> {
        SYMBOLS
            .iter()
            .find(|(_, kind)| kind == self)
            .map(|(text, _)| *text)
    }
}

/// Binding power of `x if c else y`, right-associative.
pub(crate) const TERNARY_BINDING_POWER: (u8, u8) = (6, 6);

/// Whether `text` is a symbol operator or the start of one.
pub(crate) fn is_symbol_prefix(text: &str) -> bool {
    SYMBOLS.iter().any(|(symbol, _)| symbol.starts_with(text))
}

/// A binary operator as written.
///
/// `and`/`&&` and `or`/`||` share a kind but keep their spelling. `not in`
/// and `is not` are the `In` and `Is` kinds carrying a negation, with the
/// spaces between the two words kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DualOperator {
    kind: DualOperatorKind,
    word: bool,
    negation: Option<Space>,
}

impl DualOperator {
    /// A symbol operator, or one of the word operators.
    pub fn new(kind: DualOperatorKind) -> Self {
        let word = kind.symbol().is_none();
        Self {
            kind,
            word,
            negation: None,
        }
    }

    /// `and` or `or` spelled as words.
    pub fn word(kind: DualOperatorKind) -> Self {
        Self {
            kind,
            word: true,
            negation: None,
        }
    }

    /// `not in` or `is not`, with `gap` between the two words.
    pub fn negated(kind: DualOperatorKind, gap: Space) -> Self {
        Self {
            kind,
            word: true,
            negation: Some(gap),
        }
    }

    pub fn kind(&self) -> DualOperatorKind {
        self.kind
    }

    /// Whether the operator is spelled as a word.
    pub fn is_word(&self) -> bool {
        self.word
    }

    /// Whether this operator carries a `not` marker.
    pub fn is_negated(&self) -> bool {
        self.negation.is_some()
    }

    /// `not in`
    pub fn is_not_in(&self) -> bool {
        self.kind == DualOperatorKind::In && self.is_negated()
    }

    /// `is not`
    pub fn is_not_is(&self) -> bool {
        self.kind == DualOperatorKind::Is && self.is_negated()
    }

    pub fn binding_power(&self) -> (u8, u8) {
        self.kind.binding_power()
    }
}

impl fmt::Display for DualOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use DualOperatorKind::*;
        let gap = self.negation.as_ref().map(Space::as_str);
        match (self.kind, gap) {
            (In, Some(gap)) => write!(f, "not{}in", gap),
            (Is, Some(gap)) => write!(f, "is{}not", gap),
            (In, None) => f.write_str("in"),
            (Is, None) => f.write_str("is"),
            (As, _) => f.write_str("as"),
            (And, _) if self.word => f.write_str("and"),
            (Or, _) if self.word => f.write_str("or"),
            (kind, _) => f.write_str(kind.symbol().unwrap_or("")),
        }
    }
}

/// Unary prefix operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SingleOperatorKind {
    /// `-`
    Negate,
    /// `+`
    Identity,
    /// `!`
    Not,
    /// `not`
    NotWord,
    /// `~`
    BitNot,
    /// `await`
    Await,
}

impl SingleOperatorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SingleOperatorKind::Negate => "-",
            SingleOperatorKind::Identity => "+",
            SingleOperatorKind::Not => "!",
            SingleOperatorKind::NotWord => "not",
            SingleOperatorKind::BitNot => "~",
            SingleOperatorKind::Await => "await",
        }
    }

    /// Get the binding power for the operand of this operator.
    pub fn binding_power(&self) -> u8 {
        match self {
            // Precedence 6
            SingleOperatorKind::Not | SingleOperatorKind::NotWord => 12,
            // Precedence 15
            SingleOperatorKind::Negate | SingleOperatorKind::Identity => 30,
            // Precedence 16
            SingleOperatorKind::BitNot => 32,
            // Precedence 19
            SingleOperatorKind::Await => 38,
        }
    }

    /// The prefix operator spelled by a single character.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '-' => Some(SingleOperatorKind::Negate),
            '+' => Some(SingleOperatorKind::Identity),
            '!' => Some(SingleOperatorKind::Not),
            '~' => Some(SingleOperatorKind::BitNot),
            _ => None,
        }
    }

    /// Whether the operator is logical negation, in either spelling.
    pub fn is_not(&self) -> bool {
        matches!(self, SingleOperatorKind::Not | SingleOperatorKind::NotWord)
    }
}

impl fmt::Display for SingleOperatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn multiplication_binds_tighter_than_addition() {
        let add = DualOperatorKind::Add.binding_power();
        let mul = DualOperatorKind::Mul.binding_power();
        assert!(mul.0 > add.0);
    }

    #[test]
    fn assignment_is_right_associative() {
        let (left, right) = DualOperatorKind::Assign.binding_power();
        assert_eq!(left, right);
        assert!(DualOperatorKind::AddAssign.is_assignment());
        assert!(!DualOperatorKind::Equal.is_assignment());
    }

    #[test]
    fn symbol_prefixes() {
        assert!(is_symbol_prefix("*"));
        assert!(is_symbol_prefix("**"));
        assert!(is_symbol_prefix("**="));
        assert!(is_symbol_prefix("!"));
        assert!(!is_symbol_prefix("*-"));
        assert!(!is_symbol_prefix("->"));
    }

    #[test]
    fn lookup_by_spelling() {
        assert_eq!(DualOperatorKind::from_symbol("<<="), Some(DualOperatorKind::ShiftLeftAssign));
        assert_eq!(DualOperatorKind::from_symbol("!"), None);
        assert_eq!(DualOperatorKind::from_word("and"), Some(DualOperatorKind::And));
        assert_eq!(DualOperatorKind::from_word("not"), None);
    }

    #[test]
    fn display_keeps_spelling() {
        assert_eq!(DualOperator::new(DualOperatorKind::And).to_string(), "&&");
        assert_eq!(DualOperator::word(DualOperatorKind::And).to_string(), "and");
        assert_eq!(DualOperator::new(DualOperatorKind::In).to_string(), "in");
        assert_eq!(
            DualOperator::negated(DualOperatorKind::In, Space::new("  ")).to_string(),
            "not  in"
        );
        assert_eq!(
            DualOperator::negated(DualOperatorKind::Is, Space::new(" ")).to_string(),
            "is not"
        );
        assert_eq!(DualOperator::new(DualOperatorKind::PowAssign).to_string(), "**=");
    }

    #[test]
    fn not_in_shares_kind_with_in() {
        let plain = DualOperator::new(DualOperatorKind::In);
        let negated = DualOperator::negated(DualOperatorKind::In, Space::new(" "));
        assert_eq!(plain.kind(), negated.kind());
        assert!(!plain.is_not_in());
        assert!(negated.is_not_in());
    }
}
