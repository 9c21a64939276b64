//! Condition code generation

use super::{CodeGen, Eval};
use crate::error::{CompileError, Result};
use crate::predicate::Test;
use condflow_core::{
    Comparison, ComparisonOperator, Condition, LogicalCondition, SetComparison, Value,
};
use std::cmp::Ordering;
use std::sync::Arc;

impl<'a, T: 'static> CodeGen<'a, T> {
    /// Compile a condition into a boolean test
    pub(crate) fn condition(&self, condition: &Condition) -> Result<Test<T>> {
        match condition {
            Condition::Group(group) => {
                let mut children = group
                    .children
                    .iter()
                    .map(|child| self.condition(child))
                    .collect::<Result<Vec<_>>>()?;

                match children.len() {
                    0 => Err(CompileError::Validation("Group has no conditions".to_string())),
                    1 => Ok(children.remove(0)),
                    _ => Ok(Arc::new(move |item: &T| children.iter().all(|c| c(item)))),
                }
            }

            Condition::And(logical) => {
                let (left, right) = self.sides(logical, "And")?;
                Ok(Arc::new(move |item: &T| left(item) && right(item)))
            }

            Condition::Or(logical) => {
                let (left, right) = self.sides(logical, "Or")?;
                Ok(Arc::new(move |item: &T| left(item) || right(item)))
            }

            Condition::Comparison(cmp) => self.comparison(cmp),

            Condition::SetComparison(set) => self.set_comparison(set),
        }
    }

    fn sides(&self, logical: &LogicalCondition, kind: &str) -> Result<(Test<T>, Test<T>)> {
        match (&logical.left, &logical.right) {
            (Some(left), Some(right)) => Ok((self.condition(left)?, self.condition(right)?)),
            _ => Err(CompileError::Validation(format!(
                "{} condition is missing an operand",
                kind
            ))),
        }
    }

    fn comparison(&self, cmp: &Comparison) -> Result<Test<T>> {
        let operator = cmp
            .operator
            .ok_or_else(|| CompileError::Validation("comparison has no operator".to_string()))?;
        let left = self.element(&cmp.left)?;

        let test: Test<T> = match operator {
            ComparisonOperator::IsNull => Arc::new(move |item: &T| left(item).is_null()),
            ComparisonOperator::NotNull => Arc::new(move |item: &T| !left(item).is_null()),
            ComparisonOperator::Eq => {
                let right = self.right_side(cmp)?;
                Arc::new(move |item: &T| left(item).loose_eq(&right(item)))
            }
            ComparisonOperator::Ne => {
                let right = self.right_side(cmp)?;
                Arc::new(move |item: &T| !left(item).loose_eq(&right(item)))
            }
            ComparisonOperator::Gt => ordered(left, self.right_side(cmp)?, Ordering::is_gt),
            ComparisonOperator::Ge => ordered(left, self.right_side(cmp)?, Ordering::is_ge),
            ComparisonOperator::Lt => ordered(left, self.right_side(cmp)?, Ordering::is_lt),
            ComparisonOperator::Le => ordered(left, self.right_side(cmp)?, Ordering::is_le),
        };
        Ok(test)
    }

    fn right_side(&self, cmp: &Comparison) -> Result<Eval<T>> {
        match &cmp.right {
            Some(right) => self.element(right),
            None => Err(CompileError::Validation(format!(
                "comparison on {} has no right operand",
                cmp.left
            ))),
        }
    }

    fn set_comparison(&self, set: &SetComparison) -> Result<Test<T>> {
        let left = self.element(&set.left)?;
        let negated = set.operator.is_negated();

        if set.operator.is_range() {
            let (low, high) = match set.values.as_slice() {
                [low, high, ..] => (self.element(low)?, self.element(high)?),
                _ => {
                    return Err(CompileError::Validation(format!(
                        "range on {} needs two bounds",
                        set.left
                    )))
                }
            };
            return Ok(Arc::new(move |item: &T| {
                in_range(&left(item), &low(item), &high(item)) != negated
            }));
        }

        let list = self.element(&set.value_list())?;
        Ok(Arc::new(move |item: &T| {
            let value = left(item);
            let found = match list(item) {
                Value::Array(candidates) => candidates.iter().any(|c| value.loose_eq(c)),
                _ => false,
            };
            found != negated
        }))
    }
}

fn ordered<T: 'static>(left: Eval<T>, right: Eval<T>, accept: fn(Ordering) -> bool) -> Test<T> {
    Arc::new(move |item: &T| left(item).loose_cmp(&right(item)).is_some_and(accept))
}

/// Inclusive bounds; null is never inside a range
fn in_range(value: &Value, low: &Value, high: &Value) -> bool {
    !value.is_null()
        && value.loose_cmp(low).is_some_and(Ordering::is_ge)
        && value.loose_cmp(high).is_some_and(Ordering::is_le)
}
