//! condflow Runtime - conditional processor pipelines
//!
//! Pipelines are ordered steps of processors, each optionally guarded by a
//! compiled predicate. The executor interprets every step's
//! [`ResponseState`] to decide whether to continue, stop or abort.

pub mod batch;
pub mod context;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod processor;
pub mod response;

// Re-export main types
pub use batch::{BatchPipeline, BatchStep};
pub use context::ExecutionContext;
pub use engine::{BatchExecutor, PipelineExecutor};
pub use error::{Result, RuntimeError};
pub use pipeline::{Pipeline, Step};
pub use processor::{processor_fn, FnProcessor, Processor};
pub use response::{Response, ResponseState, StepWarning};
