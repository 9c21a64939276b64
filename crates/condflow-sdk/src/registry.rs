//! Pipeline registry
//!
//! Holds the pipelines produced by one load. Pipelines are shared
//! read-only; a pipeline referenced from several others is built once.

use crate::error::{Result, SdkError};
use condflow_runtime::{ExecutionContext, Pipeline, Response};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Named pipelines from one load
pub struct PipelineRegistry<T> {
    pipelines: HashMap<String, Arc<Pipeline<T>>>,
}

impl<T: 'static> PipelineRegistry<T> {
    pub fn new() -> Self {
        Self {
            pipelines: HashMap::new(),
        }
    }

    pub(crate) fn insert(&mut self, pipeline: Pipeline<T>) -> Arc<Pipeline<T>> {
        let pipeline = Arc::new(pipeline);
        self.pipelines
            .insert(pipeline.name().to_string(), Arc::clone(&pipeline));
        pipeline
    }

    pub fn get(&self, name: &str) -> Option<Arc<Pipeline<T>>> {
        self.pipelines.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.pipelines.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.pipelines.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Run the named pipeline over `item`
    pub fn execute(&self, name: &str, item: T, context: &ExecutionContext) -> Result<Response<T>> {
        let pipeline = self
            .pipelines
            .get(name)
            .ok_or_else(|| SdkError::UnknownPipeline(name.to_string()))?;
        Ok(pipeline.execute(item, context))
    }
}

impl<T: 'static> Default for PipelineRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: 'static> fmt::Debug for PipelineRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineRegistry")
            .field("pipelines", &self.names())
            .finish()
    }
}
