//! Pipelines
//!
//! A pipeline is an ordered, append-only list of steps. Each step pairs a
//! processor with an optional predicate that decides, per item, whether the
//! processor runs. A pipeline is itself a [`Processor`], so pipelines nest.

use crate::context::ExecutionContext;
use crate::engine::PipelineExecutor;
use crate::error::{Result, RuntimeError};
use crate::processor::Processor;
use crate::response::Response;
use condflow_compiler::{Entity, EntityResolver, FieldResolver, Predicate, PredicateCompiler};
use std::fmt;
use std::sync::Arc;

/// One pipeline step
pub struct Step<T> {
    pub(crate) processor: Arc<dyn Processor<T>>,
    pub(crate) predicate: Option<Predicate<T>>,
}

impl<T> Step<T> {
    pub fn new(processor: Arc<dyn Processor<T>>) -> Self {
        Self {
            processor,
            predicate: None,
        }
    }

    /// Only run the processor when `predicate` holds
    pub fn when(mut self, predicate: Predicate<T>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    pub fn processor(&self) -> &Arc<dyn Processor<T>> {
        &self.processor
    }

    pub fn predicate(&self) -> Option<&Predicate<T>> {
        self.predicate.as_ref()
    }
}

impl<T> Clone for Step<T> {
    fn clone(&self) -> Self {
        Self {
            processor: Arc::clone(&self.processor),
            predicate: self.predicate.clone(),
        }
    }
}

impl<T> fmt::Debug for Step<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("processor", &self.processor.name())
            .field("predicate", &self.predicate)
            .finish()
    }
}

/// Ordered list of conditional processing steps over `T`
pub struct Pipeline<T> {
    name: String,
    steps: Vec<Step<T>>,
}

impl<T: 'static> Pipeline<T> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn steps(&self) -> &[Step<T>] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Append a prepared step
    pub fn add_step(&mut self, step: Step<T>) -> Result<&mut Self> {
        let processor = step.processor.name();
        if self.steps.iter().any(|s| s.processor.name() == processor) {
            return Err(RuntimeError::DuplicateProcessor {
                pipeline: self.name.clone(),
                processor: processor.to_string(),
            });
        }
        tracing::debug!(
            "Pipeline '{}': added step '{}'{}",
            self.name,
            processor,
            step.predicate
                .as_ref()
                .map(|p| format!(" when {}", p))
                .unwrap_or_default()
        );
        self.steps.push(step);
        Ok(self)
    }

    /// Append a processor whose condition resolves fields through `resolver`
    pub fn add_with<R: FieldResolver<T>>(
        &mut self,
        processor: Arc<dyn Processor<T>>,
        condition: Option<&str>,
        prefix: Option<&str>,
        resolver: &R,
    ) -> Result<&mut Self> {
        let predicate = compile_condition(condition, prefix, resolver)?;
        let step = match predicate {
            Some(predicate) => Step::new(processor).when(predicate),
            None => Step::new(processor),
        };
        self.add_step(step)
    }

    /// Append a nested pipeline as a step
    pub fn add_pipeline(
        &mut self,
        pipeline: Arc<Pipeline<T>>,
        predicate: Option<Predicate<T>>,
    ) -> Result<&mut Self> {
        let step = Step {
            processor: pipeline,
            predicate,
        };
        self.add_step(step)
    }

    /// Run every step over `item`
    pub fn execute(&self, item: T, context: &ExecutionContext) -> Response<T> {
        self.execute_optional(Some(item), context)
    }

    /// Run every step; an absent item stops at the first step with `NullData`
    pub fn execute_optional(&self, item: Option<T>, context: &ExecutionContext) -> Response<T> {
        PipelineExecutor::new(&self.name, &self.steps).execute(item, context)
    }
}

impl<T: Entity> Pipeline<T> {
    /// Append a processor guarded by an optional condition expression.
    ///
    /// `prefix` is the name the expression uses for the item; a blank
    /// condition means the step always runs.
    pub fn add(
        &mut self,
        processor: Arc<dyn Processor<T>>,
        condition: Option<&str>,
        prefix: Option<&str>,
    ) -> Result<&mut Self> {
        self.add_with(processor, condition, prefix, &EntityResolver::<T>::new())
    }
}

impl<T: 'static> Processor<T> for Pipeline<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn execute(&self, item: T, context: &ExecutionContext) -> anyhow::Result<Response<T>> {
        Ok(self.execute_optional(Some(item), context))
    }
}

impl<T> fmt::Debug for Pipeline<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("steps", &self.steps)
            .finish()
    }
}

/// Compile an optional step condition; blank text means no condition
pub(crate) fn compile_condition<T, R>(
    condition: Option<&str>,
    prefix: Option<&str>,
    resolver: &R,
) -> Result<Option<Predicate<T>>>
where
    T: 'static,
    R: FieldResolver<T>,
{
    match condition.map(str::trim).filter(|c| !c.is_empty()) {
        Some(text) => {
            let predicate = PredicateCompiler::new().compile_expression_with(
                text,
                prefix.unwrap_or_default(),
                resolver,
            )?;
            Ok(Some(predicate))
        }
        None => Ok(None),
    }
}
