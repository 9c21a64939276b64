//! Constant folding optimizer
//!
//! Evaluates literal-only arithmetic and function calls at compile time so
//! predicates do not redo them for every item.

use crate::operators::{apply_math, apply_unary, builtin};
use condflow_core::{ClauseElement, Comparison, Condition, GroupCondition, LogicalCondition, SetComparison, Value};

/// Constant folding optimizer
#[derive(Debug, Default, Clone, Copy)]
pub struct ConstantFolder;

impl ConstantFolder {
    pub fn new() -> Self {
        Self
    }

    /// Fold every clause element in a condition tree
    pub fn fold_condition(&self, condition: &Condition) -> Condition {
        match condition {
            Condition::Group(group) => Condition::Group(GroupCondition {
                children: group.children.iter().map(|c| self.fold_condition(c)).collect(),
                closed: group.closed,
            }),
            Condition::And(logical) => Condition::And(self.fold_logical(logical)),
            Condition::Or(logical) => Condition::Or(self.fold_logical(logical)),
            Condition::Comparison(cmp) => Condition::Comparison(Comparison {
                left: self.fold(&cmp.left),
                operator: cmp.operator,
                right: cmp.right.as_ref().map(|r| self.fold(r)),
            }),
            Condition::SetComparison(set) => Condition::SetComparison(SetComparison {
                left: self.fold(&set.left),
                operator: set.operator,
                values: set.values.iter().map(|v| self.fold(v)).collect(),
                closed: set.closed,
            }),
        }
    }

    fn fold_logical(&self, logical: &LogicalCondition) -> LogicalCondition {
        LogicalCondition {
            left: logical.left.as_ref().map(|c| Box::new(self.fold_condition(c))),
            right: logical.right.as_ref().map(|c| Box::new(self.fold_condition(c))),
            closed: logical.closed,
        }
    }

    /// Fold a single clause element
    pub fn fold(&self, element: &ClauseElement) -> ClauseElement {
        match element {
            ClauseElement::BinaryOp { left, op, right } => {
                let left = self.fold(left);
                let right = self.fold(right);

                match (constant(&left), constant(&right)) {
                    (Some(l), Some(r)) => literal(apply_math(&l, *op, &r)),
                    _ => ClauseElement::BinaryOp {
                        left: Box::new(left),
                        op: *op,
                        right: Box::new(right),
                    },
                }
            }

            ClauseElement::Unary { op, operand } => {
                let operand = self.fold(operand);
                match constant(&operand) {
                    Some(value) => literal(apply_unary(*op, &value)),
                    None => ClauseElement::unary(*op, operand),
                }
            }

            ClauseElement::FunctionCall { name, args } => {
                let args: Vec<ClauseElement> = args.iter().map(|a| self.fold(a)).collect();
                let values: Option<Vec<Value>> = args.iter().map(constant).collect();

                // Unknown functions are left for codegen to report
                match (values, builtin(name, args.len())) {
                    (Some(values), Ok(func)) => literal(func(&values)),
                    _ => ClauseElement::FunctionCall {
                        name: name.clone(),
                        args,
                    },
                }
            }

            ClauseElement::ValueList(items) => {
                ClauseElement::ValueList(items.iter().map(|i| self.fold(i)).collect())
            }

            ClauseElement::Variable(_) | ClauseElement::Literal(_) | ClauseElement::NullLiteral => {
                element.clone()
            }
        }
    }
}

fn constant(element: &ClauseElement) -> Option<Value> {
    match element {
        ClauseElement::Literal(value) => Some(value.clone()),
        ClauseElement::NullLiteral => Some(Value::Null),
        _ => None,
    }
}

fn literal(value: Value) -> ClauseElement {
    match value {
        Value::Null => ClauseElement::NullLiteral,
        other => ClauseElement::Literal(other),
    }
}
