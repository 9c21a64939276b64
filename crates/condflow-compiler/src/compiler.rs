//! Main compiler
//!
//! Validates a condition tree, optionally folds constants, and generates a
//! [`Predicate`] bound to an entity type and prefix.

use crate::codegen::CodeGen;
use crate::entity::{Entity, EntityResolver, FieldResolver};
use crate::error::Result;
use crate::optimizer::ConstantFolder;
use crate::predicate::Predicate;
use condflow_core::Condition;
use std::borrow::Cow;

/// Compiler options
#[derive(Debug, Clone)]
pub struct CompilerOptions {
    /// Enable constant folding optimization
    pub enable_constant_folding: bool,
}

impl Default for CompilerOptions {
    fn default() -> Self {
        Self {
            enable_constant_folding: true,
        }
    }
}

/// Predicate compiler
#[derive(Debug, Clone, Default)]
pub struct PredicateCompiler {
    options: CompilerOptions,
    constant_folder: ConstantFolder,
}

impl PredicateCompiler {
    pub fn new() -> Self {
        Self::with_options(CompilerOptions::default())
    }

    pub fn with_options(options: CompilerOptions) -> Self {
        Self {
            options,
            constant_folder: ConstantFolder::new(),
        }
    }

    /// Compile against the entity's own field registry
    pub fn compile<T: Entity>(&self, condition: &Condition, prefix: &str) -> Result<Predicate<T>> {
        self.compile_with(condition, prefix, &EntityResolver::<T>::new())
    }

    /// Compile against an explicit resolver
    pub fn compile_with<T, R>(
        &self,
        condition: &Condition,
        prefix: &str,
        resolver: &R,
    ) -> Result<Predicate<T>>
    where
        T: 'static,
        R: FieldResolver<T>,
    {
        self.generate(condition, prefix, resolver, condition.to_string())
    }

    /// Tokenize, parse and compile expression text
    pub fn compile_expression<T: Entity>(&self, text: &str, prefix: &str) -> Result<Predicate<T>> {
        let condition = condflow_parser::parse_expression(text)?;
        self.generate(&condition, prefix, &EntityResolver::<T>::new(), text.trim().to_string())
    }

    /// Like [`compile_expression`](Self::compile_expression) with an explicit resolver
    pub fn compile_expression_with<T, R>(
        &self,
        text: &str,
        prefix: &str,
        resolver: &R,
    ) -> Result<Predicate<T>>
    where
        T: 'static,
        R: FieldResolver<T>,
    {
        let condition = condflow_parser::parse_expression(text)?;
        self.generate(&condition, prefix, resolver, text.trim().to_string())
    }

    fn generate<T: 'static>(
        &self,
        condition: &Condition,
        prefix: &str,
        resolver: &dyn FieldResolver<T>,
        source: String,
    ) -> Result<Predicate<T>> {
        condition.validate_tree()?;

        let condition = if self.options.enable_constant_folding {
            Cow::Owned(self.constant_folder.fold_condition(condition))
        } else {
            Cow::Borrowed(condition)
        };

        let test = CodeGen::new(resolver, prefix).condition(&condition)?;

        tracing::debug!(
            "Compiled predicate '{}' for {} (prefix '{}')",
            source,
            std::any::type_name::<T>(),
            prefix
        );
        Ok(Predicate::new(source, test))
    }
}

/// Compile a parsed condition for entity `T`
pub fn compile<T: Entity>(condition: &Condition, prefix: &str) -> Result<Predicate<T>> {
    PredicateCompiler::new().compile(condition, prefix)
}

/// Compile a parsed condition against an explicit resolver
pub fn compile_with<T, R>(condition: &Condition, prefix: &str, resolver: &R) -> Result<Predicate<T>>
where
    T: 'static,
    R: FieldResolver<T>,
{
    PredicateCompiler::new().compile_with(condition, prefix, resolver)
}

/// Tokenize, parse and compile in one call
pub fn compile_expression<T: Entity>(text: &str, prefix: &str) -> Result<Predicate<T>> {
    PredicateCompiler::new().compile_expression(text, prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileError;
    use condflow_core::Value;
    use serde_json::json;

    fn record(json: serde_json::Value) -> Value {
        json.into()
    }

    #[test]
    fn test_compile_simple_comparison() {
        let predicate = compile_expression::<Value>("a = 1", "x").unwrap();
        assert!(predicate.evaluate(&record(json!({"a": 1}))));
        assert!(!predicate.evaluate(&record(json!({"a": 2}))));
    }

    #[test]
    fn test_folding_does_not_change_results() {
        let folded = PredicateCompiler::new();
        let plain = PredicateCompiler::with_options(CompilerOptions {
            enable_constant_folding: false,
        });
        let text = "item.total > 2 * 50 + 1 && upper(item.tier) = 'GOLD'";

        let a = folded.compile_expression::<Value>(text, "item").unwrap();
        let b = plain.compile_expression::<Value>(text, "item").unwrap();

        for item in [
            json!({"total": 102, "tier": "gold"}),
            json!({"total": 101, "tier": "gold"}),
            json!({"total": 500, "tier": "silver"}),
        ] {
            let item = record(item);
            assert_eq!(a.evaluate(&item), b.evaluate(&item));
        }
    }

    #[test]
    fn test_source_is_kept() {
        let predicate = compile_expression::<Value>("  a >= 3 ", "").unwrap();
        assert_eq!(predicate.source(), "a >= 3");
    }

    #[test]
    fn test_parse_errors_surface() {
        let err = compile_expression::<Value>("a = (1", "").unwrap_err();
        assert!(matches!(err, CompileError::Parse(_)));
    }

    #[test]
    fn test_unknown_function() {
        let err = compile_expression::<Value>("shout(a) = 1", "").unwrap_err();
        assert!(matches!(err, CompileError::Validation(msg) if msg.contains("unknown function")));
    }
}
