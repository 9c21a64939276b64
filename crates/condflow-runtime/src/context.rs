//! Execution context
//!
//! Open key-value side channel handed unchanged to every processor of a run.

use condflow_core::Value;
use std::collections::HashMap;

/// Execution context shared by all steps of one run
#[derive(Debug, Clone, Default)]
pub struct ExecutionContext {
    values: HashMap<String, Value>,
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl From<HashMap<String, Value>> for ExecutionContext {
    fn from(values: HashMap<String, Value>) -> Self {
        Self { values }
    }
}

impl From<serde_json::Map<String, serde_json::Value>> for ExecutionContext {
    fn from(map: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            values: map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_and_lookup() {
        let ctx = ExecutionContext::new()
            .with("tenant", "acme")
            .with("dry_run", true);

        assert_eq!(ctx.get("tenant"), Some(&Value::from("acme")));
        assert!(ctx.contains("dry_run"));
        assert!(ctx.get("missing").is_none());
        assert_eq!(ctx.len(), 2);
    }

    #[test]
    fn test_from_json_object() {
        let json = serde_json::json!({"region": "eu", "limit": 5});
        let ctx = match json {
            serde_json::Value::Object(map) => ExecutionContext::from(map),
            _ => unreachable!(),
        };
        assert_eq!(ctx.get("limit"), Some(&Value::Number(5.0)));
    }
}
