//! Code generation
//!
//! Turns a validated condition tree into a tree of closures. Field names
//! are resolved here, once; the generated closures only call accessors.

mod clause_codegen;
mod condition_codegen;

use crate::entity::FieldResolver;
use condflow_core::Value;
use std::sync::Arc;

/// Evaluates a clause element against an item
pub(crate) type Eval<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// Code generator bound to one entity type and prefix
pub(crate) struct CodeGen<'a, T> {
    resolver: &'a dyn FieldResolver<T>,
    prefix: &'a str,
}

impl<'a, T: 'static> CodeGen<'a, T> {
    pub(crate) fn new(resolver: &'a dyn FieldResolver<T>, prefix: &'a str) -> Self {
        Self { resolver, prefix }
    }

    /// Strip the leading `prefix.` qualifier; the bare prefix is the entity itself.
    pub(crate) fn field_path<'n>(&self, name: &'n str) -> &'n str {
        if self.prefix.is_empty() {
            return name;
        }
        if name == self.prefix {
            return "";
        }
        name.strip_prefix(self.prefix)
            .and_then(|rest| rest.strip_prefix('.'))
            .unwrap_or(name)
    }
}
