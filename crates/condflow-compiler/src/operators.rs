//! Math operators and built-in functions for clause elements
//!
//! Evaluation never fails: incompatible operands, division by zero and
//! out-of-range shifts all produce `Value::Null`, which then compares false
//! for ordering and equals only `null`.

use condflow_core::{MathOperator, UnaryOperator, Value};

/// Apply a binary math operator
pub(crate) fn apply_math(left: &Value, op: MathOperator, right: &Value) -> Value {
    // Null in any operation returns Null so missing fields propagate
    if left.is_null() || right.is_null() {
        tracing::debug!(
            "Null in math operation: {:?} {} {:?}, returning Null",
            left,
            op.as_str(),
            right
        );
        return Value::Null;
    }

    match (left, op, right) {
        (Value::Number(l), MathOperator::Add, Value::Number(r)) => Value::Number(l + r),
        (Value::Number(l), MathOperator::Sub, Value::Number(r)) => Value::Number(l - r),
        (Value::Number(l), MathOperator::Mul, Value::Number(r)) => Value::Number(l * r),
        (Value::Number(l), MathOperator::Div, Value::Number(r)) => {
            if *r == 0.0 {
                tracing::debug!("Division by zero: {} / {}, returning Null", l, r);
                Value::Null
            } else {
                Value::Number(l / r)
            }
        }
        (Value::Number(l), MathOperator::Mod, Value::Number(r)) => {
            if *r == 0.0 {
                tracing::debug!("Division by zero: {} % {}, returning Null", l, r);
                Value::Null
            } else {
                Value::Number(l % r)
            }
        }

        // String concatenation
        (Value::String(l), MathOperator::Add, Value::String(r)) => {
            Value::String(format!("{}{}", l, r))
        }

        (Value::Number(l), op, Value::Number(r)) => match (as_integer(*l), as_integer(*r)) {
            (Some(l), Some(r)) => apply_bitwise(l, op, r),
            _ => {
                tracing::debug!(
                    "Bitwise {} on non-integral operands {} and {}, returning Null",
                    op.as_str(),
                    l,
                    r
                );
                Value::Null
            }
        },

        _ => {
            tracing::debug!(
                "Cannot apply {} to {} and {}, returning Null",
                op.as_str(),
                left.type_name(),
                right.type_name()
            );
            Value::Null
        }
    }
}

/// Apply a prefix operator
pub(crate) fn apply_unary(op: UnaryOperator, operand: &Value) -> Value {
    match (op, operand) {
        (UnaryOperator::Neg, Value::Number(n)) => Value::Number(-n),
        (UnaryOperator::BitNot, Value::Number(n)) => match as_integer(*n) {
            Some(n) => Value::Number(!n as f64),
            None => {
                tracing::debug!("Bitwise ~ on non-integral operand {}, returning Null", n);
                Value::Null
            }
        },
        _ => {
            tracing::debug!(
                "Cannot apply prefix {} to {}, returning Null",
                op.as_str(),
                operand.type_name()
            );
            Value::Null
        }
    }
}

fn apply_bitwise(l: i64, op: MathOperator, r: i64) -> Value {
    let result = match op {
        MathOperator::BitAnd => Some(l & r),
        MathOperator::BitOr => Some(l | r),
        MathOperator::BitXor => Some(l ^ r),
        MathOperator::Shl => u32::try_from(r).ok().and_then(|r| l.checked_shl(r)),
        MathOperator::Shr => u32::try_from(r).ok().and_then(|r| l.checked_shr(r)),
        _ => None,
    };
    result.map_or(Value::Null, |n| Value::Number(n as f64))
}

fn as_integer(n: f64) -> Option<i64> {
    if n.fract() == 0.0 && n.abs() <= i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

/// Signature of a built-in function
pub(crate) type BuiltinFn = fn(&[Value]) -> Value;

/// Look up a built-in by name, checking arity
pub(crate) fn builtin(name: &str, arity: usize) -> Result<BuiltinFn, String> {
    let (expected, func): (usize, BuiltinFn) = match name {
        "len" => (1, len),
        "lower" => (1, lower),
        "upper" => (1, upper),
        "trim" => (1, trim),
        "abs" => (1, abs),
        _ => return Err(format!("unknown function '{}'", name)),
    };
    if arity != expected {
        return Err(format!(
            "function '{}' takes {} argument(s), got {}",
            name, expected, arity
        ));
    }
    Ok(func)
}

fn len(args: &[Value]) -> Value {
    match &args[0] {
        Value::String(s) => Value::from(s.chars().count()),
        Value::Array(items) => Value::from(items.len()),
        Value::Object(map) => Value::from(map.len()),
        _ => Value::Null,
    }
}

fn lower(args: &[Value]) -> Value {
    map_str(&args[0], str::to_lowercase)
}

fn upper(args: &[Value]) -> Value {
    map_str(&args[0], str::to_uppercase)
}

fn trim(args: &[Value]) -> Value {
    map_str(&args[0], |s| s.trim().to_string())
}

fn abs(args: &[Value]) -> Value {
    match args[0] {
        Value::Number(n) => Value::Number(n.abs()),
        _ => Value::Null,
    }
}

fn map_str(value: &Value, f: impl Fn(&str) -> String) -> Value {
    match value {
        Value::String(s) => Value::String(f(s)),
        _ => Value::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn num(n: f64) -> Value {
        Value::Number(n)
    }

    #[test]
    fn test_arithmetic() {
        assert_eq!(apply_math(&num(2.0), MathOperator::Add, &num(3.0)), num(5.0));
        assert_eq!(apply_math(&num(2.0), MathOperator::Sub, &num(3.0)), num(-1.0));
        assert_eq!(apply_math(&num(2.0), MathOperator::Mul, &num(3.0)), num(6.0));
        assert_eq!(apply_math(&num(3.0), MathOperator::Div, &num(2.0)), num(1.5));
        assert_eq!(apply_math(&num(7.0), MathOperator::Mod, &num(4.0)), num(3.0));
    }

    #[test]
    fn test_division_by_zero_is_null() {
        assert_eq!(apply_math(&num(1.0), MathOperator::Div, &num(0.0)), Value::Null);
        assert_eq!(apply_math(&num(1.0), MathOperator::Mod, &num(0.0)), Value::Null);
    }

    #[test]
    fn test_null_propagates() {
        assert_eq!(apply_math(&Value::Null, MathOperator::Add, &num(1.0)), Value::Null);
        assert_eq!(apply_math(&num(1.0), MathOperator::Shl, &Value::Null), Value::Null);
    }

    #[test]
    fn test_bitwise() {
        assert_eq!(apply_math(&num(6.0), MathOperator::BitAnd, &num(3.0)), num(2.0));
        assert_eq!(apply_math(&num(6.0), MathOperator::BitOr, &num(3.0)), num(7.0));
        assert_eq!(apply_math(&num(6.0), MathOperator::BitXor, &num(3.0)), num(5.0));
        assert_eq!(apply_math(&num(1.0), MathOperator::Shl, &num(4.0)), num(16.0));
        assert_eq!(apply_math(&num(16.0), MathOperator::Shr, &num(2.0)), num(4.0));
        assert_eq!(apply_math(&num(5.0), MathOperator::BitXor, &num(-1.0)), num(-6.0));
    }

    #[test]
    fn test_bitwise_rejects_fractions_and_bad_shifts() {
        assert_eq!(apply_math(&num(1.5), MathOperator::BitAnd, &num(1.0)), Value::Null);
        assert_eq!(apply_math(&num(1.0), MathOperator::Shl, &num(-1.0)), Value::Null);
        assert_eq!(apply_math(&num(1.0), MathOperator::Shl, &num(64.0)), Value::Null);
    }

    #[test]
    fn test_unary() {
        assert_eq!(apply_unary(UnaryOperator::Neg, &num(3.0)), num(-3.0));
        assert_eq!(apply_unary(UnaryOperator::BitNot, &num(2.0)), num(-3.0));
        assert_eq!(apply_unary(UnaryOperator::BitNot, &num(0.5)), Value::Null);
        assert_eq!(apply_unary(UnaryOperator::Neg, &Value::from("a")), Value::Null);
        assert_eq!(apply_unary(UnaryOperator::BitNot, &Value::Null), Value::Null);
    }

    #[test]
    fn test_string_concat_and_mismatch() {
        let a = Value::from("ab");
        let b = Value::from("cd");
        assert_eq!(apply_math(&a, MathOperator::Add, &b), Value::from("abcd"));
        assert_eq!(apply_math(&a, MathOperator::Sub, &b), Value::Null);
        assert_eq!(apply_math(&a, MathOperator::Add, &num(1.0)), Value::Null);
    }

    #[test]
    fn test_builtins() {
        let len = builtin("len", 1).unwrap();
        assert_eq!(len(&[Value::from("héllo")]), num(5.0));
        assert_eq!(len(&[Value::from(vec![1i64, 2, 3])]), num(3.0));
        assert_eq!(len(&[num(3.0)]), Value::Null);

        let upper = builtin("upper", 1).unwrap();
        assert_eq!(upper(&[Value::from("abc")]), Value::from("ABC"));

        let trim = builtin("trim", 1).unwrap();
        assert_eq!(trim(&[Value::from("  x ")]), Value::from("x"));

        let abs = builtin("abs", 1).unwrap();
        assert_eq!(abs(&[num(-4.0)]), num(4.0));
    }

    #[test]
    fn test_builtin_lookup_errors() {
        assert!(builtin("nope", 1).unwrap_err().contains("unknown function"));
        assert!(builtin("len", 2).unwrap_err().contains("takes 1 argument"));
    }
}
