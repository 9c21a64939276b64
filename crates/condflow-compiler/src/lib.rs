//! condflow Compiler - condition trees to typed predicates
//!
//! A [`Condition`](condflow_core::Condition) is compiled once, against one
//! entity type and one field prefix, into a [`Predicate`] that can be
//! evaluated many times from any thread.

pub mod compiler;
pub mod entity;
pub mod error;
pub mod optimizer;
pub mod predicate;

mod codegen;
mod operators;

// Re-export main types
pub use compiler::{compile, compile_expression, compile_with, CompilerOptions, PredicateCompiler};
pub use entity::{Entity, EntityResolver, FieldAccessor, FieldRegistry, FieldResolver};
pub use error::{CompileError, Result};
pub use optimizer::ConstantFolder;
pub use predicate::Predicate;
