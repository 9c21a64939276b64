//! Runtime error types

use condflow_compiler::CompileError;
use thiserror::Error;

/// Runtime error
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// A processor reported `FatalError`
    #[error("Processor '{processor}' failed: {source}")]
    Processing {
        processor: String,
        #[source]
        source: anyhow::Error,
    },

    /// A processor returned `Err` or panicked
    #[error("Unhandled error in processor '{processor}': {source}")]
    Unhandled {
        processor: String,
        #[source]
        source: anyhow::Error,
    },

    /// A step condition failed to compile
    #[error("Invalid step condition: {0}")]
    Compile(#[from] CompileError),

    /// Two steps in one pipeline share a processor name
    #[error("Duplicate processor '{processor}' in pipeline '{pipeline}'")]
    DuplicateProcessor { pipeline: String, processor: String },
}

/// Result type for runtime operations
pub type Result<T> = std::result::Result<T, RuntimeError>;
