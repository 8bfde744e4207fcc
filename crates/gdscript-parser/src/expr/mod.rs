//! Expression nodes and the resolver that builds them.
//!
//! Operands are read left to right into a flat chain of operands and
//! operators. When the expression ends, the chain is re-associated into a
//! tree by operator precedence. Brackets, calls, indexers and member access
//! are resolved while reading an operand, so they are never re-associated.

mod chain;
mod ops;
mod readers;
mod resolver;

use bitflags::bitflags;
use num_enum::IntoPrimitive;

pub use ops::{DualOperator, DualOperatorKind, SingleOperatorKind};

pub(crate) use resolver::ExpressionResolver;

use crate::decl::MethodDeclaration;
use crate::form::{Form, impl_form_state};
use crate::list::BracketedList;
use crate::node::{Leaf, SyntaxNode, impl_display};
use crate::tokens::{
    Identifier, Keyword, NodePath, Number, Punct, StringLiteral, Trivia, is_ident_start,
};

bitflags! {
    /// Context that changes how an expression is read.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ExpressionFlags: u8 {
        /// Inside `()`, `[]` or `{}`: line endings and comments are trivia.
        const IN_BRACKETS = 1 << 0;
        /// `=` ends the expression instead of assigning, as in `{key = value}`.
        const NO_ASSIGNMENT = 1 << 1;
        /// A match pattern: `var x`, `_` and `..` are allowed.
        const PATTERN = 1 << 2;
        /// `if` after an operand does not start a ternary.
        const NO_TERNARY = 1 << 3;
    }
}

/// Whether `c` can begin an expression.
pub(crate) fn starts_expression(c: char) -> bool {
    c.is_ascii_digit()
        || is_ident_start(c)
        || matches!(
            c,
            '"' | '\'' | '&' | '^' | '$' | '%' | '[' | '{' | '(' | '-' | '+' | '!' | '~' | '.'
        )
}

/// Any expression.
#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(Identifier),
    Number(Number),
    String(StringLiteral),
    /// `true` or `false`
    Bool(bool),
    /// `[a, b]`
    Array(BracketedList<Expression>),
    /// `{k: v}` or `{k = v}`
    Dictionary(BracketedList<KeyValue>),
    /// `(e)`, a hard precedence boundary.
    Bracket(BracketedList<Expression>),
    Call(CallExpression),
    Indexer(IndexerExpression),
    Member(MemberExpression),
    /// `$Path` or `%Unique`
    GetNode(GetNodeExpression),
    Single(SingleOperatorExpression),
    Dual(DualOperatorExpression),
    /// `a if c else b`
    Ternary(TernaryExpression),
    /// `func(x): return x`
    Lambda(Box<MethodDeclaration>),
    /// `var x` in a match pattern.
    MatchBinding(MatchBindingExpression),
    /// `_` in a match pattern.
    MatchWildcard(Identifier),
    /// `..` in a match pattern.
    MatchRest,
    /// Source where an operand was required but could not be read.
    Invalid(Trivia),
}

impl Expression {
    pub fn as_identifier(&self) -> Option<&Identifier> {
        match self {
            Expression::Identifier(id) => Some(id),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Expression::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn as_string(&self) -> Option<&StringLiteral> {
        match self {
            Expression::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_dual(&self) -> Option<&DualOperatorExpression> {
        match self {
            Expression::Dual(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_single(&self) -> Option<&SingleOperatorExpression> {
        match self {
            Expression::Single(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_call(&self) -> Option<&CallExpression> {
        match self {
            Expression::Call(c) => Some(c),
            _ => None,
        }
    }

    /// The expression between brackets, for `(e)`.
    pub fn as_bracket_inner(&self) -> Option<&Expression> {
        match self {
            Expression::Bracket(list) => list.first(),
            _ => None,
        }
    }

    /// Whether this is a literal: number, string, bool, array or dictionary.
    pub fn is_literal(&self) -> bool {
        matches!(
            self,
            Expression::Number(_)
                | Expression::String(_)
                | Expression::Bool(_)
                | Expression::Array(_)
                | Expression::Dictionary(_)
        )
    }

    /// Whether this expression is only valid inside a match pattern.
    pub fn is_pattern_only(&self) -> bool {
        matches!(
            self,
            Expression::MatchBinding(_) | Expression::MatchWildcard(_) | Expression::MatchRest
        )
    }
}

impl SyntaxNode for Expression {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        match self {
            Expression::Identifier(e) => e.walk(visit),
            Expression::Number(e) => e.walk(visit),
            Expression::String(e) => e.walk(visit),
            Expression::Bool(true) => visit(Leaf::Keyword(Keyword::True)),
            Expression::Bool(false) => visit(Leaf::Keyword(Keyword::False)),
            Expression::Array(e) => e.walk(visit),
            Expression::Dictionary(e) => e.walk(visit),
            Expression::Bracket(e) => e.walk(visit),
            Expression::Call(e) => e.walk(visit),
            Expression::Indexer(e) => e.walk(visit),
            Expression::Member(e) => e.walk(visit),
            Expression::GetNode(e) => e.walk(visit),
            Expression::Single(e) => e.walk(visit),
            Expression::Dual(e) => e.walk(visit),
            Expression::Ternary(e) => e.walk(visit),
            Expression::Lambda(e) => e.walk(visit),
            Expression::MatchBinding(e) => e.walk(visit),
            Expression::MatchWildcard(e) => e.walk(visit),
            Expression::MatchRest => visit(Leaf::Punct(Punct::DoubleDot)),
            Expression::Invalid(t) => visit(Leaf::Trivia(t)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum DualOperatorState {
    Left,
    Operator,
    Right,
    Completed,
}

impl_form_state!(DualOperatorState, "DualOperatorExpression", Left);

/// `left op right`
#[derive(Debug, Clone, PartialEq)]
pub struct DualOperatorExpression {
    pub(crate) form: Form<DualOperatorState>,
    pub(crate) left: Box<Expression>,
    pub(crate) operator: DualOperator,
    pub(crate) right: Box<Expression>,
}

impl DualOperatorExpression {
    pub fn left(&self) -> &Expression {
        &self.left
    }

    pub fn operator(&self) -> &DualOperator {
        &self.operator
    }

    pub fn kind(&self) -> DualOperatorKind {
        self.operator.kind()
    }

    pub fn right(&self) -> &Expression {
        &self.right
    }

    /// `not in`
    pub fn is_not_in(&self) -> bool {
        self.operator.is_not_in()
    }
}

impl SyntaxNode for DualOperatorExpression {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .slot(DualOperatorState::Left, &*self.left)
            .leaf(
                DualOperatorState::Operator,
                Some(Leaf::DualOperator(&self.operator)),
            )
            .slot(DualOperatorState::Right, &*self.right)
            .finish();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum SingleOperatorState {
    Operator,
    Operand,
    Completed,
}

impl_form_state!(SingleOperatorState, "SingleOperatorExpression", Operator);

/// `op operand`
#[derive(Debug, Clone, PartialEq)]
pub struct SingleOperatorExpression {
    pub(crate) form: Form<SingleOperatorState>,
    pub(crate) operator: SingleOperatorKind,
    pub(crate) operand: Box<Expression>,
}

impl SingleOperatorExpression {
    pub fn operator(&self) -> SingleOperatorKind {
        self.operator
    }

    pub fn operand(&self) -> &Expression {
        &self.operand
    }
}

impl SyntaxNode for SingleOperatorExpression {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(
                SingleOperatorState::Operator,
                Some(Leaf::SingleOperator(self.operator)),
            )
            .slot(SingleOperatorState::Operand, &*self.operand)
            .finish();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum TernaryState {
    TrueValue,
    If,
    Condition,
    Else,
    FalseValue,
    Completed,
}

impl_form_state!(TernaryState, "TernaryExpression", TrueValue);

/// `true_value if condition else false_value`
#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpression {
    pub(crate) form: Form<TernaryState>,
    pub(crate) true_value: Box<Expression>,
    pub(crate) condition: Box<Expression>,
    pub(crate) has_else: bool,
    pub(crate) false_value: Box<Expression>,
}

impl TernaryExpression {
    pub fn true_value(&self) -> &Expression {
        &self.true_value
    }

    pub fn condition(&self) -> &Expression {
        &self.condition
    }

    pub fn false_value(&self) -> &Expression {
        &self.false_value
    }
}

impl SyntaxNode for TernaryExpression {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .slot(TernaryState::TrueValue, &*self.true_value)
            .leaf(TernaryState::If, Some(Leaf::Keyword(Keyword::If)))
            .slot(TernaryState::Condition, &*self.condition)
            .leaf(
                TernaryState::Else,
                self.has_else.then_some(Leaf::Keyword(Keyword::Else)),
            )
            .slot(TernaryState::FalseValue, &*self.false_value)
            .finish();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum CallState {
    Callee,
    Arguments,
    Completed,
}

impl_form_state!(CallState, "CallExpression", Callee);

/// `callee(arguments)`
#[derive(Debug, Clone, PartialEq)]
pub struct CallExpression {
    pub(crate) form: Form<CallState>,
    pub(crate) callee: Box<Expression>,
    pub(crate) arguments: BracketedList<Expression>,
}

impl CallExpression {
    pub fn callee(&self) -> &Expression {
        &self.callee
    }

    pub fn arguments(&self) -> &BracketedList<Expression> {
        &self.arguments
    }

    /// The called name, for calls of a plain identifier such as `preload`.
    pub fn name(&self) -> Option<&str> {
        self.callee.as_identifier().map(Identifier::as_str)
    }

    /// `preload(path)` or `load(path)`
    pub fn is_resource_load(&self) -> bool {
        matches!(self.name(), Some("preload" | "load"))
    }
}

impl SyntaxNode for CallExpression {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .slot(CallState::Callee, &*self.callee)
            .slot(CallState::Arguments, &self.arguments)
            .finish();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum IndexerState {
    Target,
    Index,
    Completed,
}

impl_form_state!(IndexerState, "IndexerExpression", Target);

/// `target[index]`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexerExpression {
    pub(crate) form: Form<IndexerState>,
    pub(crate) target: Box<Expression>,
    pub(crate) index: BracketedList<Expression>,
}

impl IndexerExpression {
    pub fn target(&self) -> &Expression {
        &self.target
    }

    pub fn index(&self) -> Option<&Expression> {
        self.index.first()
    }
}

impl SyntaxNode for IndexerExpression {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .slot(IndexerState::Target, &*self.target)
            .slot(IndexerState::Index, &self.index)
            .finish();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum MemberState {
    Object,
    Dot,
    Name,
    Completed,
}

impl_form_state!(MemberState, "MemberExpression", Object);

/// `object.name`
#[derive(Debug, Clone, PartialEq)]
pub struct MemberExpression {
    pub(crate) form: Form<MemberState>,
    pub(crate) object: Box<Expression>,
    pub(crate) name: Option<Identifier>,
}

impl MemberExpression {
    pub fn object(&self) -> &Expression {
        &self.object
    }

    pub fn name(&self) -> Option<&Identifier> {
        self.name.as_ref()
    }
}

impl SyntaxNode for MemberExpression {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .slot(MemberState::Object, &*self.object)
            .leaf(MemberState::Dot, Some(Leaf::Punct(Punct::Dot)))
            .slot(MemberState::Name, &self.name)
            .finish();
    }
}

/// What a `$` or `%` refers to.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeTarget {
    Path(NodePath),
    String(StringLiteral),
}

impl SyntaxNode for NodeTarget {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        match self {
            NodeTarget::Path(p) => p.walk(visit),
            NodeTarget::String(s) => s.walk(visit),
        }
    }
}

/// `$Path/To/Node`, `$"path"`, `%Unique` or `%"Unique"`
#[derive(Debug, Clone, PartialEq)]
pub struct GetNodeExpression {
    pub(crate) sigil: Punct,
    pub(crate) target: Option<NodeTarget>,
}

impl GetNodeExpression {
    /// Whether this is a `%` scene-unique lookup.
    pub fn is_unique(&self) -> bool {
        self.sigil == Punct::Percent
    }

    pub fn target(&self) -> Option<&NodeTarget> {
        self.target.as_ref()
    }

    /// The node path text, without sigil or quotes.
    pub fn path(&self) -> Option<&str> {
        match self.target.as_ref()? {
            NodeTarget::Path(p) => Some(p.as_str()),
            NodeTarget::String(s) => Some(s.content()),
        }
    }
}

impl SyntaxNode for GetNodeExpression {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        visit(Leaf::Punct(self.sigil));
        self.target.walk(visit);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum KeyValueState {
    Key,
    Separator,
    Value,
    Completed,
}

impl_form_state!(KeyValueState, "KeyValue", Key);

/// One `key: value` or `key = value` entry of a dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyValue {
    pub(crate) form: Form<KeyValueState>,
    pub(crate) key: Expression,
    pub(crate) separator: Option<Punct>,
    pub(crate) value: Option<Expression>,
}

impl KeyValue {
    pub fn key(&self) -> &Expression {
        &self.key
    }

    pub fn value(&self) -> Option<&Expression> {
        self.value.as_ref()
    }

    /// Whether the entry uses the `key = value` form.
    pub fn is_assign_form(&self) -> bool {
        self.separator == Some(Punct::Assign)
    }
}

impl SyntaxNode for KeyValue {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .slot(KeyValueState::Key, &self.key)
            .leaf(KeyValueState::Separator, self.separator.map(Leaf::Punct))
            .slot(KeyValueState::Value, &self.value)
            .finish();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, IntoPrimitive)]
#[repr(u8)]
pub enum MatchBindingState {
    Var,
    Name,
    Completed,
}

impl_form_state!(MatchBindingState, "MatchBinding", Var);

/// `var name` in a match pattern.
#[derive(Debug, Clone, PartialEq)]
pub struct MatchBindingExpression {
    pub(crate) form: Form<MatchBindingState>,
    pub(crate) name: Option<Identifier>,
}

impl MatchBindingExpression {
    pub fn name(&self) -> Option<&Identifier> {
        self.name.as_ref()
    }
}

impl SyntaxNode for MatchBindingExpression {
    fn walk<'a>(&'a self, visit: &mut dyn FnMut(Leaf<'a>)) {
        self.form
            .walker(visit)
            .leaf(MatchBindingState::Var, Some(Leaf::Keyword(Keyword::Var)))
            .slot(MatchBindingState::Name, &self.name)
            .finish();
    }
}

impl_display!(
    Expression,
    DualOperatorExpression,
    SingleOperatorExpression,
    TernaryExpression,
    CallExpression,
    IndexerExpression,
    MemberExpression,
    GetNodeExpression,
    KeyValue,
    MatchBindingExpression,
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expression_starts() {
        for c in "a_0\"'&^$%[{(-+!~.".chars() {
            assert!(starts_expression(c), "{c}");
        }
        for c in ":,)]}=*#".chars() {
            assert!(!starts_expression(c), "{c}");
        }
    }

    #[test]
    fn flags_combine() {
        let flags = ExpressionFlags::IN_BRACKETS | ExpressionFlags::PATTERN;
        assert!(flags.contains(ExpressionFlags::PATTERN));
        assert!(!flags.contains(ExpressionFlags::NO_TERNARY));
    }
}
