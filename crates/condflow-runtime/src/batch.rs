//! Batch pipelines
//!
//! Steps transform a whole collection; conditions are still written against
//! a single element and evaluated per element.

use crate::context::ExecutionContext;
use crate::engine::BatchExecutor;
use crate::error::{Result, RuntimeError};
use crate::pipeline::compile_condition;
use crate::processor::Processor;
use crate::response::Response;
use condflow_compiler::{Entity, EntityResolver, FieldResolver, Predicate};
use std::fmt;
use std::sync::Arc;

/// One batch pipeline step
pub struct BatchStep<T> {
    pub(crate) processor: Arc<dyn Processor<Vec<T>>>,
    pub(crate) predicate: Option<Predicate<T>>,
    /// Drop excluded items instead of carrying them past this step
    pub(crate) filter: bool,
}

impl<T> BatchStep<T> {
    pub fn new(processor: Arc<dyn Processor<Vec<T>>>) -> Self {
        Self {
            processor,
            predicate: None,
            filter: false,
        }
    }

    pub fn when(mut self, predicate: Predicate<T>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn filter(mut self, filter: bool) -> Self {
        self.filter = filter;
        self
    }

    pub fn is_filter(&self) -> bool {
        self.filter
    }
}

impl<T> fmt::Debug for BatchStep<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchStep")
            .field("processor", &self.processor.name())
            .field("predicate", &self.predicate)
            .field("filter", &self.filter)
            .finish()
    }
}

/// Ordered list of steps over a collection of `T`
pub struct BatchPipeline<T> {
    name: String,
    steps: Vec<BatchStep<T>>,
}

impl<T: Clone + 'static> BatchPipeline<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn add_step(&mut self, step: BatchStep<T>) -> Result<&mut Self> {
        let processor = step.processor.name();
        if self.steps.iter().any(|s| s.processor.name() == processor) {
            return Err(RuntimeError::DuplicateProcessor {
                pipeline: self.name.clone(),
                processor: processor.to_string(),
            });
        }
        self.steps.push(step);
        Ok(self)
    }

    pub fn add_with<R: FieldResolver<T>>(
        &mut self,
        processor: Arc<dyn Processor<Vec<T>>>,
        condition: Option<&str>,
        prefix: Option<&str>,
        filter: bool,
        resolver: &R,
    ) -> Result<&mut Self> {
        let mut step = BatchStep::new(processor).filter(filter);
        step.predicate = compile_condition(condition, prefix, resolver)?;
        self.add_step(step)
    }

    pub fn execute(&self, items: Vec<T>, context: &ExecutionContext) -> Response<Vec<T>> {
        BatchExecutor::new(&self.name, &self.steps).execute(items, context)
    }
}

impl<T: Entity + Clone> BatchPipeline<T> {
    /// Append a collection processor guarded by a per-element condition
    pub fn add(
        &mut self,
        processor: Arc<dyn Processor<Vec<T>>>,
        condition: Option<&str>,
        prefix: Option<&str>,
        filter: bool,
    ) -> Result<&mut Self> {
        self.add_with(processor, condition, prefix, filter, &EntityResolver::<T>::new())
    }
}

impl<T: Clone + 'static> Processor<Vec<T>> for BatchPipeline<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, items: Vec<T>, context: &ExecutionContext) -> anyhow::Result<Response<Vec<T>>> {
        Ok(BatchExecutor::new(&self.name, &self.steps).execute(items, context))
    }
}

impl<T> fmt::Debug for BatchPipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BatchPipeline")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .finish()
    }
}
