//! Re-association of a flat operator chain into a precedence-correct tree.
//!
//! The resolver records an expression as it reads it: operands, prefix
//! operators and binary operators in source order, each with the trivia
//! that preceded it. [`build`] turns that chain into a tree with
//! precedence climbing. The trivia in front of a subtree's first operand is
//! handed up and stored in the slot that holds the subtree.

use std::iter::Peekable;

use gdscript_core::ParseError;

use super::ops::{DualOperator, SingleOperatorKind, TERNARY_BINDING_POWER};
use super::{
    DualOperatorExpression, DualOperatorState, Expression, SingleOperatorExpression,
    SingleOperatorState, TernaryExpression, TernaryState,
};
use crate::form::Form;
use crate::tokens::{InvalidToken, Trivia};

/// One element of an expression as read.
#[derive(Debug)]
pub(super) enum ChainItem {
    Operand {
        lead: Vec<Trivia>,
        expr: Expression,
    },
    Prefix {
        lead: Vec<Trivia>,
        op: SingleOperatorKind,
    },
    Binary {
        lead: Vec<Trivia>,
        op: DualOperator,
    },
    /// `if condition else`, sitting between the two values like an operator.
    Ternary {
        lead: Vec<Trivia>,
        condition_lead: Vec<Trivia>,
        condition: Expression,
        else_lead: Vec<Trivia>,
        has_else: bool,
    },
}

impl ChainItem {
    /// Whether the chain needs an operand after this item.
    pub(super) fn wants_operand(&self) -> bool {
        match self {
            ChainItem::Operand { .. } => false,
            ChainItem::Prefix { .. } | ChainItem::Binary { .. } => true,
            ChainItem::Ternary { has_else, .. } => *has_else,
        }
    }
}

/// An operand that should have been there but was not.
pub(super) fn missing_operand() -> Expression {
    Expression::Invalid(Trivia::Invalid(InvalidToken::new("")))
}

/// Build the tree for a chain. Returns the trivia in front of its first
/// operand along with the expression.
pub(super) fn build(items: Vec<ChainItem>) -> Result<(Vec<Trivia>, Expression), ParseError> {
    let mut items = items.into_iter().peekable();
    let result = climb(&mut items, 0)?;
    if items.next().is_some() {
        return Err(ParseError::invalid_state(
            "ExpressionChain",
            "Completed",
            "chain item",
        ));
    }
    Ok(result)
}

type Items = Peekable<std::vec::IntoIter<ChainItem>>;

fn climb(items: &mut Items, min_bp: u8) -> Result<(Vec<Trivia>, Expression), ParseError> {
    let (lead, mut lhs) = operand(items)?;

    loop {
        let (left_bp, right_bp) = match items.peek() {
            Some(ChainItem::Binary { op, .. }) => op.binding_power(),
            Some(ChainItem::Ternary { .. }) => TERNARY_BINDING_POWER,
            _ => break,
        };
        if left_bp < min_bp {
            break;
        }

        lhs = match items.next() {
            Some(ChainItem::Binary { lead: op_lead, op }) => {
                let (right_lead, right) = climb(items, right_bp)?;
                let mut form = Form::new();
                form.set_state(DualOperatorState::Operator)?;
                form.extend_trivia(op_lead);
                form.set_state(DualOperatorState::Right)?;
                form.extend_trivia(right_lead);
                form.complete();
                Expression::Dual(DualOperatorExpression {
                    form,
                    left: Box::new(lhs),
                    operator: op,
                    right: Box::new(right),
                })
            }
            Some(ChainItem::Ternary {
                lead: if_lead,
                condition_lead,
                condition,
                else_lead,
                has_else,
            }) => {
                let (false_lead, false_value) = if has_else {
                    climb(items, right_bp)?
                } else {
                    (Vec::new(), missing_operand())
                };
                let mut form = Form::new();
                form.set_state(TernaryState::If)?;
                form.extend_trivia(if_lead);
                form.set_state(TernaryState::Condition)?;
                form.extend_trivia(condition_lead);
                form.set_state(TernaryState::Else)?;
                form.extend_trivia(else_lead);
                form.set_state(TernaryState::FalseValue)?;
                form.extend_trivia(false_lead);
                form.complete();
                Expression::Ternary(TernaryExpression {
                    form,
                    true_value: Box::new(lhs),
                    condition: Box::new(condition),
                    has_else,
                    false_value: Box::new(false_value),
                })
            }
            _ => break,
        };
    }

    Ok((lead, lhs))
}

fn operand(items: &mut Items) -> Result<(Vec<Trivia>, Expression), ParseError> {
    match items.next() {
        Some(ChainItem::Operand { lead, expr }) => Ok((lead, expr)),
        Some(ChainItem::Prefix { lead, op }) => {
            let (operand_lead, operand) = climb(items, op.binding_power())?;
            let mut form = Form::new();
            form.set_state(SingleOperatorState::Operand)?;
            form.extend_trivia(operand_lead);
            form.complete();
            let expr = Expression::Single(SingleOperatorExpression {
                form,
                operator: op,
                operand: Box::new(operand),
            });
            Ok((lead, expr))
        }
        Some(_) => Err(ParseError::invalid_state(
            "ExpressionChain",
            "Operand",
            "operator",
        )),
        None => Ok((Vec::new(), missing_operand())),
    }
}
