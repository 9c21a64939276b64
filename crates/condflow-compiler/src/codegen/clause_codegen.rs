//! Clause element code generation

use super::{CodeGen, Eval};
use crate::error::{CompileError, Result};
use crate::operators::{apply_math, apply_unary, builtin};
use condflow_core::{ClauseElement, Value};
use std::sync::Arc;

impl<'a, T: 'static> CodeGen<'a, T> {
    /// Compile a clause element into an evaluator
    pub(crate) fn element(&self, element: &ClauseElement) -> Result<Eval<T>> {
        match element {
            ClauseElement::Variable(name) => self.field(name),

            ClauseElement::Literal(value) => Ok(constant(value.clone())),

            ClauseElement::NullLiteral => Ok(constant(Value::Null)),

            ClauseElement::BinaryOp { left, op, right } => {
                let left = self.element(left)?;
                let right = self.element(right)?;
                let op = *op;
                Ok(Arc::new(move |item: &T| apply_math(&left(item), op, &right(item))))
            }

            ClauseElement::Unary { op, operand } => {
                let operand = self.element(operand)?;
                let op = *op;
                Ok(Arc::new(move |item: &T| apply_unary(op, &operand(item))))
            }

            ClauseElement::FunctionCall { name, args } => {
                let func = builtin(name, args.len()).map_err(CompileError::Validation)?;
                let args = self.elements(args)?;
                Ok(Arc::new(move |item: &T| {
                    let values: Vec<Value> = args.iter().map(|arg| arg(item)).collect();
                    func(&values)
                }))
            }

            ClauseElement::ValueList(items) => {
                if let Some(values) = literal_values(items) {
                    return Ok(constant(Value::Array(values)));
                }
                let items = self.elements(items)?;
                Ok(Arc::new(move |item: &T| {
                    Value::Array(items.iter().map(|element| element(item)).collect())
                }))
            }
        }
    }

    pub(crate) fn elements(&self, elements: &[ClauseElement]) -> Result<Vec<Eval<T>>> {
        elements.iter().map(|e| self.element(e)).collect()
    }

    fn field(&self, name: &str) -> Result<Eval<T>> {
        let path = self.field_path(name);
        self.resolver
            .resolve(path)
            .ok_or_else(|| CompileError::unknown_field(name, std::any::type_name::<T>()))
    }
}

fn constant<T: 'static>(value: Value) -> Eval<T> {
    Arc::new(move |_: &T| value.clone())
}

fn literal_values(items: &[ClauseElement]) -> Option<Vec<Value>> {
    items
        .iter()
        .map(|item| match item {
            ClauseElement::Literal(value) => Some(value.clone()),
            ClauseElement::NullLiteral => Some(Value::Null),
            _ => None,
        })
        .collect()
}
