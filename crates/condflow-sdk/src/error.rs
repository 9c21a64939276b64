//! SDK error types

use thiserror::Error;

/// SDK error type
#[derive(Error, Debug)]
pub enum SdkError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// YAML definitions could not be read
    #[error("Invalid YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// JSON definitions could not be read
    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// A step names a processor the catalog does not have
    #[error("Pipeline '{pipeline}' references unknown processor '{processor}'")]
    UnknownProcessor { pipeline: String, processor: String },

    /// A pipeline name is not defined
    #[error("Unknown pipeline: {0}")]
    UnknownPipeline(String),

    /// Pipelines reference each other in a loop
    #[error("Pipeline reference cycle: {}", .0.join(" -> "))]
    CyclicReference(Vec<String>),

    /// Compiler error
    #[error("Compiler error: {0}")]
    CompileError(#[from] condflow_compiler::CompileError),

    /// Runtime error
    #[error("Runtime error: {0}")]
    RuntimeError(#[from] condflow_runtime::RuntimeError),
}

/// Result type for SDK operations
pub type Result<T> = std::result::Result<T, SdkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error() {
        let error = SdkError::ConfigError("Invalid configuration".to_string());
        assert!(error.to_string().contains("Configuration error"));
        assert!(error.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_cycle_message() {
        let error = SdkError::CyclicReference(vec!["a".into(), "b".into(), "a".into()]);
        assert_eq!(error.to_string(), "Pipeline reference cycle: a -> b -> a");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "File not found");
        let sdk_error: SdkError = io_error.into();
        assert!(sdk_error.to_string().contains("I/O error"));
        assert!(sdk_error.to_string().contains("File not found"));
    }
}
