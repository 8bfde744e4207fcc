//! Visitor pattern for traversing syntax trees.
//!
//! The [`Visitor`] trait has a `visit_*` method per node type. The default
//! implementations call the matching `walk_*` function, which visits the
//! node's children. Override a `visit_*` method to act on a node type and
//! call its `walk_*` function to keep descending.
//!
//! Visitors see the semantic structure only. For the exact source text,
//! trivia included, use [`SyntaxNode::walk`](crate::SyntaxNode::walk).
//!
//! ```
//! use gdscript_parser::visitor::{Visitor, walk_expression};
//! use gdscript_parser::{Expression, Parser};
//!
//! #[derive(Default)]
//! struct Calls(Vec<String>);
//!
//! impl Visitor for Calls {
//!     fn visit_expression(&mut self, expr: &Expression) {
//!         if let Some(name) = expr.as_call().and_then(|c| c.name()) {
//!             self.0.push(name.to_string());
//!         }
//!         walk_expression(self, expr);
//!     }
//! }
//!
//! let class = Parser::new().parse("func f():\n\tprint(len(x))\n").unwrap();
//! let mut calls = Calls::default();
//! calls.visit_class(&class);
//! assert_eq!(calls.0, ["print", "len"]);
//! ```

use crate::decl::*;
use crate::expr::{Expression, KeyValue};
use crate::stmt::*;
use crate::types::TypeNode;

/// Visitor trait for traversing syntax trees.
pub trait Visitor: Sized {
    // === Classes and members ===

    fn visit_class(&mut self, class: &ClassDeclaration) {
        walk_class(self, class);
    }

    fn visit_member(&mut self, member: &ClassMember) {
        walk_member(self, member);
    }

    fn visit_variable(&mut self, var: &VariableDeclaration) {
        walk_variable(self, var);
    }

    fn visit_accessor(&mut self, accessor: &Accessor) {
        walk_accessor(self, accessor);
    }

    /// Called for methods and for lambdas.
    fn visit_method(&mut self, method: &MethodDeclaration) {
        walk_method(self, method);
    }

    fn visit_parameter(&mut self, param: &Parameter) {
        walk_parameter(self, param);
    }

    fn visit_signal(&mut self, signal: &SignalDeclaration) {
        walk_signal(self, signal);
    }

    fn visit_enum(&mut self, decl: &EnumDeclaration) {
        walk_enum(self, decl);
    }

    fn visit_inner_class(&mut self, class: &InnerClassDeclaration) {
        walk_inner_class(self, class);
    }

    fn visit_attribute(&mut self, attribute: &AttributeDeclaration) {
        walk_attribute(self, attribute);
    }

    // === Statements ===

    fn visit_statement(&mut self, stmt: &Statement) {
        walk_statement(self, stmt);
    }

    fn visit_match_case(&mut self, case: &MatchCase) {
        walk_match_case(self, case);
    }

    // === Expressions and types ===

    fn visit_expression(&mut self, expr: &Expression) {
        walk_expression(self, expr);
    }

    fn visit_type(&mut self, ty: &TypeNode) {
        walk_type(self, ty);
    }
}

pub fn walk_class<V: Visitor>(visitor: &mut V, class: &ClassDeclaration) {
    for member in class.members() {
        visitor.visit_member(member);
    }
}

pub fn walk_member<V: Visitor>(visitor: &mut V, member: &ClassMember) {
    match member {
        ClassMember::Variable(v) => visitor.visit_variable(v),
        ClassMember::Method(m) => visitor.visit_method(m),
        ClassMember::Signal(s) => visitor.visit_signal(s),
        ClassMember::Enum(e) => visitor.visit_enum(e),
        ClassMember::InnerClass(c) => visitor.visit_inner_class(c),
        ClassMember::Extends(e) => {
            if let Some(base) = e.base() {
                visitor.visit_type(base);
            }
        }
        ClassMember::Attribute(a) => visitor.visit_attribute(a),
        ClassMember::ClassName(_) | ClassMember::Tool | ClassMember::Pass => {}
    }
}

pub fn walk_variable<V: Visitor>(visitor: &mut V, var: &VariableDeclaration) {
    if let Some(ty) = var.type_node() {
        visitor.visit_type(ty);
    }
    if let Some(init) = var.initializer() {
        visitor.visit_expression(init);
    }
    for accessor in var.accessors() {
        visitor.visit_accessor(accessor);
    }
}

pub fn walk_accessor<V: Visitor>(visitor: &mut V, accessor: &Accessor) {
    walk_statements(visitor, accessor.statements());
}

pub fn walk_method<V: Visitor>(visitor: &mut V, method: &MethodDeclaration) {
    for param in method.parameters() {
        visitor.visit_parameter(param);
    }
    if let Some(ty) = method.return_type() {
        visitor.visit_type(ty);
    }
    walk_statements(visitor, method.statements());
}

pub fn walk_parameter<V: Visitor>(visitor: &mut V, param: &Parameter) {
    if let Some(ty) = param.type_node() {
        visitor.visit_type(ty);
    }
    if let Some(default) = param.default() {
        visitor.visit_expression(default);
    }
}

pub fn walk_signal<V: Visitor>(visitor: &mut V, signal: &SignalDeclaration) {
    for param in signal.parameters() {
        visitor.visit_parameter(param);
    }
}

pub fn walk_enum<V: Visitor>(visitor: &mut V, decl: &EnumDeclaration) {
    for value in decl.values().filter_map(EnumValue::value) {
        visitor.visit_expression(value);
    }
}

pub fn walk_inner_class<V: Visitor>(visitor: &mut V, class: &InnerClassDeclaration) {
    if let Some(base) = class.base() {
        visitor.visit_type(base);
    }
    for member in class.members() {
        visitor.visit_member(member);
    }
}

pub fn walk_attribute<V: Visitor>(visitor: &mut V, attribute: &AttributeDeclaration) {
    for arg in attribute.arguments() {
        visitor.visit_expression(arg);
    }
}

fn walk_statements<V: Visitor>(
    visitor: &mut V,
    statements: Option<&crate::list::SyntaxList<Statement>>,
) {
    for stmt in statements.into_iter().flat_map(|list| list.items()) {
        visitor.visit_statement(stmt);
    }
}

fn walk_if_branch<V: Visitor>(visitor: &mut V, branch: &IfBranch) {
    if let Some(condition) = branch.condition() {
        visitor.visit_expression(condition);
    }
    walk_statements(visitor, branch.statements());
}

pub fn walk_statement<V: Visitor>(visitor: &mut V, stmt: &Statement) {
    match stmt {
        Statement::Expression(e) => visitor.visit_expression(e),
        Statement::Variable(v) => visitor.visit_variable(v),
        Statement::If(s) => {
            walk_if_branch(visitor, s.if_branch());
            for branch in s.elif_branches() {
                walk_if_branch(visitor, branch);
            }
            if let Some(branch) = s.else_branch() {
                walk_statements(visitor, branch.statements());
            }
        }
        Statement::For(s) => {
            if let Some(ty) = s.type_node() {
                visitor.visit_type(ty);
            }
            if let Some(collection) = s.collection() {
                visitor.visit_expression(collection);
            }
            walk_statements(visitor, s.statements());
        }
        Statement::While(s) => {
            if let Some(condition) = s.condition() {
                visitor.visit_expression(condition);
            }
            walk_statements(visitor, s.statements());
        }
        Statement::Match(s) => {
            if let Some(value) = s.value() {
                visitor.visit_expression(value);
            }
            for case in s.cases() {
                visitor.visit_match_case(case);
            }
        }
        Statement::Return(r) => {
            if let Some(value) = r.value() {
                visitor.visit_expression(value);
            }
        }
        Statement::Attribute(a) => visitor.visit_attribute(a),
        Statement::Pass | Statement::Break | Statement::Continue | Statement::Breakpoint => {}
    }
}

pub fn walk_match_case<V: Visitor>(visitor: &mut V, case: &MatchCase) {
    for pattern in case.patterns() {
        visitor.visit_expression(pattern);
    }
    if let Some(guard) = case.guard() {
        visitor.visit_expression(guard);
    }
    walk_statements(visitor, case.statements());
}

pub fn walk_expression<V: Visitor>(visitor: &mut V, expr: &Expression) {
    match expr {
        Expression::Array(list) | Expression::Bracket(list) => {
            for item in list.items() {
                visitor.visit_expression(item);
            }
        }
        Expression::Dictionary(list) => {
            for pair in list.items() {
                walk_key_value(visitor, pair);
            }
        }
        Expression::Call(call) => {
            visitor.visit_expression(call.callee());
            for arg in call.arguments().items() {
                visitor.visit_expression(arg);
            }
        }
        Expression::Indexer(indexer) => {
            visitor.visit_expression(indexer.target());
            if let Some(index) = indexer.index() {
                visitor.visit_expression(index);
            }
        }
        Expression::Member(member) => visitor.visit_expression(member.object()),
        Expression::Single(single) => visitor.visit_expression(single.operand()),
        Expression::Dual(dual) => {
            visitor.visit_expression(dual.left());
            visitor.visit_expression(dual.right());
        }
        Expression::Ternary(ternary) => {
            visitor.visit_expression(ternary.true_value());
            visitor.visit_expression(ternary.condition());
            visitor.visit_expression(ternary.false_value());
        }
        Expression::Lambda(method) => visitor.visit_method(method),
        Expression::Identifier(_)
        | Expression::Number(_)
        | Expression::String(_)
        | Expression::Bool(_)
        | Expression::GetNode(_)
        | Expression::MatchBinding(_)
        | Expression::MatchWildcard(_)
        | Expression::MatchRest
        | Expression::Invalid(_) => {}
    }
}

fn walk_key_value<V: Visitor>(visitor: &mut V, pair: &KeyValue) {
    visitor.visit_expression(pair.key());
    if let Some(value) = pair.value() {
        visitor.visit_expression(value);
    }
}

pub fn walk_type<V: Visitor>(visitor: &mut V, ty: &TypeNode) {
    match ty {
        TypeNode::Sub(sub) => visitor.visit_type(sub.outer()),
        TypeNode::Generic(generic) => {
            visitor.visit_type(generic.base());
            for arg in generic.arguments().items() {
                visitor.visit_type(arg);
            }
        }
        TypeNode::Single(_) | TypeNode::String(_) => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;

    #[derive(Default)]
    struct Counter {
        methods: usize,
        statements: usize,
        identifiers: Vec<String>,
        types: usize,
    }

    impl Visitor for Counter {
        fn visit_method(&mut self, method: &MethodDeclaration) {
            self.methods += 1;
            walk_method(self, method);
        }

        fn visit_statement(&mut self, stmt: &Statement) {
            self.statements += 1;
            walk_statement(self, stmt);
        }

        fn visit_expression(&mut self, expr: &Expression) {
            if let Some(id) = expr.as_identifier() {
                self.identifiers.push(id.as_str().to_string());
            }
            walk_expression(self, expr);
        }

        fn visit_type(&mut self, ty: &TypeNode) {
            self.types += 1;
            walk_type(self, ty);
        }
    }

    #[test]
    fn reaches_nested_lambdas_and_blocks() {
        let source = "var items: Array[int] = []\nfunc f(a: int):\n\tif a > 0:\n\t\titems.map(func(x): return x + a)\n\telse:\n\t\tpass\n";
        let class = Parser::new().parse(source).unwrap();
        let mut counter = Counter::default();
        counter.visit_class(&class);
        assert_eq!(counter.methods, 2);
        // if, the call, the lambda's return, pass
        assert_eq!(counter.statements, 4);
        assert_eq!(counter.identifiers, ["a", "items", "x", "a"]);
        // Array[int], its base and argument, then the parameter type
        assert_eq!(counter.types, 4);
    }
}
