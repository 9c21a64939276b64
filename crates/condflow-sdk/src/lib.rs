//! condflow SDK
//!
//! Loads named pipelines from YAML or JSON definitions, binds the
//! processors they reference from a caller-supplied catalog and compiles
//! every step condition up front.

pub mod builder;
pub mod catalog;
pub mod config;
pub mod error;
pub mod registry;

// Re-export main types
pub use builder::EngineBuilder;
pub use catalog::ProcessorCatalog;
pub use config::{PipelineDefinition, PipelinesConfig, StepDefinition, StepTarget};
pub use error::{Result, SdkError};
pub use registry::PipelineRegistry;

// Re-export commonly used types from dependencies
pub use condflow_compiler::{compile_expression, Entity, FieldAccessor, FieldRegistry, Predicate};
pub use condflow_core::Value;
pub use condflow_runtime::{
    processor_fn, BatchPipeline, ExecutionContext, Pipeline, Processor, Response, ResponseState,
    StepWarning,
};
