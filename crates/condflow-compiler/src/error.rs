//! Compiler error types

use condflow_core::CoreError;
use condflow_parser::ParseError;
use thiserror::Error;

/// Compiler error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    /// The expression text could not be tokenized or parsed
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The tree is malformed or references something the entity does not have
    #[error("Validation error: {0}")]
    Validation(String),
}

impl CompileError {
    pub(crate) fn unknown_field(name: &str, entity: &str) -> Self {
        CompileError::Validation(format!("unknown field '{}' for entity {}", name, entity))
    }
}

impl From<CoreError> for CompileError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => CompileError::Validation(msg),
        }
    }
}

/// Result type for compiler operations
pub type Result<T> = std::result::Result<T, CompileError>;
