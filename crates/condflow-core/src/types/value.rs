//! Runtime value types for condflow expressions
//!
//! The `Value` enum represents literals written in an expression as well as
//! values read from an entity's fields, similar to JSON values.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Runtime value type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Null value (also used for absent fields)
    Null,
    /// Boolean value
    Bool(bool),
    /// Number value (f64 for simplicity, handles both int and float)
    Number(f64),
    /// String value
    String(String),
    /// Array of values
    Array(Vec<Value>),
    /// Object (key-value map)
    Object(HashMap<String, Value>),
}

impl Value {
    /// Name of the variant, used in diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Follow a dotted path through nested objects.
    ///
    /// Missing keys and non-object intermediates read as `Value::Null`.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Value {
        let mut current = self;
        for segment in path {
            let segment = segment.as_ref();
            match current {
                Value::Object(map) => match map.get(segment) {
                    Some(next) => current = next,
                    None => {
                        log::trace!("Field not found: {}, returning Null", segment);
                        return Value::Null;
                    }
                },
                _ => return Value::Null,
            }
        }
        current.clone()
    }

    /// Convert a literal to the kind of `target` so the two can be compared.
    ///
    /// Only scalar conversions are attempted: string <-> number and
    /// string <-> bool. Anything else is returned unchanged.
    pub fn coerce_to(&self, target: &Value) -> Value {
        match (target, self) {
            (Value::Number(_), Value::String(s)) => match s.trim().parse::<f64>() {
                Ok(n) => Value::Number(n),
                Err(_) => self.clone(),
            },
            (Value::String(_), Value::Number(n)) => Value::String(format_number(*n)),
            (Value::String(_), Value::Bool(b)) => Value::String(b.to_string()),
            (Value::Bool(_), Value::String(s)) => match s.as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => self.clone(),
            },
            _ => self.clone(),
        }
    }

    /// Structural equality after coercing `other` to this value's kind.
    pub fn loose_eq(&self, other: &Value) -> bool {
        *self == other.coerce_to(self)
    }

    /// Ordering after coercing `other` to this value's kind.
    ///
    /// Numbers order numerically, strings lexicographically. Every other
    /// combination (including anything involving null) is unordered.
    pub fn loose_cmp(&self, other: &Value) -> Option<Ordering> {
        match (self, &other.coerce_to(self)) {
            (Value::Number(l), Value::Number(r)) => l.partial_cmp(r),
            (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
            _ => None,
        }
    }
}

/// Format a number the way it is written in expressions: integral values
/// carry no fractional part.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.is_finite() && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", format_number(*n)),
            Value::String(s) => write!(f, "{}", s),
            Value::Array(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Object(map) => {
                let mut keys: Vec<_> = map.keys().collect();
                keys.sort();
                write!(f, "{{")?;
                for (i, key) in keys.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", key, map[*key])?;
                }
                write!(f, "}}")
            }
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<u32> for Value {
    fn from(n: u32) -> Self {
        Value::Number(n as f64)
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map(Into::into).unwrap_or(Value::Null)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Array(items.into_iter().map(Into::into).collect())
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => {
                Value::Array(items.into_iter().map(Value::from).collect())
            }
            serde_json::Value::Object(map) => {
                Value::Object(map.into_iter().map(|(k, v)| (k, Value::from(v))).collect())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_object() {
        let mut map = HashMap::new();
        map.insert("name".to_string(), Value::String("Alice".to_string()));
        map.insert("age".to_string(), Value::Number(25.0));

        let val = Value::Object(map.clone());
        assert_eq!(val, Value::Object(map));
    }

    #[test]
    fn test_get_path_nested() {
        let val: Value = serde_json::json!({"user": {"profile": {"age": 30}}}).into();

        assert_eq!(val.get_path(&["user", "profile", "age"]), Value::Number(30.0));
        assert_eq!(val.get_path(&["user", "missing"]), Value::Null);
        assert_eq!(val.get_path(&["user", "profile", "age", "deeper"]), Value::Null);
        assert_eq!(val.get_path::<&str>(&[]), val);
    }

    #[test]
    fn test_coerce_string_to_number() {
        let literal = Value::String("42".to_string());
        assert_eq!(literal.coerce_to(&Value::Number(0.0)), Value::Number(42.0));

        let not_a_number = Value::String("abc".to_string());
        assert_eq!(not_a_number.coerce_to(&Value::Number(0.0)), not_a_number);
    }

    #[test]
    fn test_coerce_number_to_string() {
        let literal = Value::Number(123.0);
        assert_eq!(
            literal.coerce_to(&Value::String(String::new())),
            Value::String("123".to_string())
        );
    }

    #[test]
    fn test_loose_eq() {
        assert!(Value::Number(1.0).loose_eq(&Value::String("1".to_string())));
        assert!(Value::String("1".to_string()).loose_eq(&Value::Number(1.0)));
        assert!(Value::Bool(true).loose_eq(&Value::String("true".to_string())));
        assert!(!Value::Null.loose_eq(&Value::Number(0.0)));
        assert!(Value::Null.loose_eq(&Value::Null));
    }

    #[test]
    fn test_loose_cmp() {
        assert_eq!(
            Value::Number(5.0).loose_cmp(&Value::Number(3.0)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Value::String("apple".to_string()).loose_cmp(&Value::String("banana".to_string())),
            Some(Ordering::Less)
        );
        assert_eq!(Value::Null.loose_cmp(&Value::Number(1.0)), None);
        assert_eq!(Value::Bool(true).loose_cmp(&Value::Bool(false)), None);
    }

    #[test]
    fn test_display_number_formatting() {
        assert_eq!(Value::Number(10.0).to_string(), "10");
        assert_eq!(Value::Number(2.5).to_string(), "2.5");
        assert_eq!(
            Value::Array(vec![Value::Number(1.0), Value::String("a".to_string())]).to_string(),
            "[1, a]"
        );
    }

    #[test]
    fn test_from_option() {
        let some: Value = Some(3i64).into();
        let none: Value = Option::<i64>::None.into();
        assert_eq!(some, Value::Number(3.0));
        assert_eq!(none, Value::Null);
    }

    #[test]
    fn test_value_serde_json() {
        let val = Value::Object({
            let mut map = HashMap::new();
            map.insert("count".to_string(), Value::Number(42.0));
            map.insert("active".to_string(), Value::Bool(true));
            map
        });

        let json = serde_json::to_string(&val).unwrap();
        let deserialized: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(val, deserialized);
    }
}
