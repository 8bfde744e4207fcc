use crate::decl::{Accessor, ClassMember, EnumValue, Parameter};
use crate::expr::{Expression, KeyValue};
use crate::list::{BracketedList, SyntaxList};
use crate::stmt::{ElseBranch, IfBranch, MatchCase, Statement};
use crate::tokens::{Identifier, Keyword, NodePath, Number, StringLiteral, Trivia};
use crate::types::TypeNode;

/// The value a finished node hands to its parent.
///
/// `Skipped` tells the parent that the slot it pushed a reader for stays
/// empty; the parent advances past it.
#[derive(Debug)]
pub(crate) enum Resolved {
    Skipped,
    Trivia(Trivia),
    Keyword(Keyword),
    Identifier(Identifier),
    Number(Number),
    String(StringLiteral),
    NodePath(NodePath),
    Type(TypeNode),
    Types(BracketedList<TypeNode>),
    Expression(Expression),
    Expressions(BracketedList<Expression>),
    KeyValue(KeyValue),
    KeyValues(BracketedList<KeyValue>),
    Parameter(Parameter),
    Parameters(BracketedList<Parameter>),
    EnumValue(EnumValue),
    EnumValues(BracketedList<EnumValue>),
    Statement(Statement),
    Statements(SyntaxList<Statement>),
    IfBranch(IfBranch),
    ElseBranch(ElseBranch),
    MatchCase(MatchCase),
    MatchCases(SyntaxList<MatchCase>),
    Accessor(Accessor),
    Accessors(SyntaxList<Accessor>),
    Member(ClassMember),
    Members(SyntaxList<ClassMember>),
}

impl Resolved {
    /// Name of the value kind, for error reports.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Resolved::Skipped => "skip",
            Resolved::Trivia(_) => "trivia",
            Resolved::Keyword(_) => "keyword",
            Resolved::Identifier(_) => "identifier",
            Resolved::Number(_) => "number",
            Resolved::String(_) => "string",
            Resolved::NodePath(_) => "node path",
            Resolved::Type(_) => "type",
            Resolved::Types(_) => "type list",
            Resolved::Expression(_) => "expression",
            Resolved::Expressions(_) => "expression list",
            Resolved::KeyValue(_) => "key-value pair",
            Resolved::KeyValues(_) => "key-value list",
            Resolved::Parameter(_) => "parameter",
            Resolved::Parameters(_) => "parameter list",
            Resolved::EnumValue(_) => "enum value",
            Resolved::EnumValues(_) => "enum value list",
            Resolved::Statement(_) => "statement",
            Resolved::Statements(_) => "statement list",
            Resolved::IfBranch(_) => "if branch",
            Resolved::ElseBranch(_) => "else branch",
            Resolved::MatchCase(_) => "match case",
            Resolved::MatchCases(_) => "match case list",
            Resolved::Accessor(_) => "accessor",
            Resolved::Accessors(_) => "accessor list",
            Resolved::Member(_) => "class member",
            Resolved::Members(_) => "class member list",
        }
    }
}
