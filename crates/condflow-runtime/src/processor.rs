//! Processor abstraction
//!
//! A processor is one unit of work in a pipeline. Instances are constructed
//! by the caller with their parameters already bound and are reused for
//! every execution, so they must not hold unsynchronized mutable state.

use crate::context::ExecutionContext;
use crate::response::Response;
use std::fmt;
use std::sync::Arc;

/// One pipeline step's unit of work
pub trait Processor<T>: Send + Sync {
    /// Name, unique within the enclosing pipeline
    fn name(&self) -> &str;

    /// Transform or validate `item`.
    ///
    /// Expected outcomes are expressed through the response state. An `Err`
    /// is treated as an unhandled failure and stops the pipeline.
    fn execute(&self, item: T, context: &ExecutionContext) -> anyhow::Result<Response<T>>;
}

impl<T, P: Processor<T> + ?Sized> Processor<T> for Arc<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn execute(&self, item: T, context: &ExecutionContext) -> anyhow::Result<Response<T>> {
        (**self).execute(item, context)
    }
}

/// Processor backed by a closure
pub struct FnProcessor<F> {
    name: String,
    func: F,
}

impl<F> FnProcessor<F> {
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<T, F> Processor<T> for FnProcessor<F>
where
    F: Fn(T, &ExecutionContext) -> anyhow::Result<Response<T>> + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, item: T, context: &ExecutionContext) -> anyhow::Result<Response<T>> {
        (self.func)(item, context)
    }
}

impl<F> fmt::Debug for FnProcessor<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnProcessor").field("name", &self.name).finish()
    }
}

/// Wrap a closure as a shareable processor
pub fn processor_fn<T, F>(name: impl Into<String>, func: F) -> Arc<dyn Processor<T>>
where
    T: 'static,
    F: Fn(T, &ExecutionContext) -> anyhow::Result<Response<T>> + Send + Sync + 'static,
{
    Arc::new(FnProcessor::new(name, func))
}
