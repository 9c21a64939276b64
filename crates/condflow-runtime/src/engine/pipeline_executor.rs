//! Pipeline executor
//!
//! Runs a pipeline's steps over one item, applying each step's predicate and
//! interpreting the step's response state.

use super::{advance, finish, invoke, Flow};
use crate::context::ExecutionContext;
use crate::pipeline::Step;
use crate::response::{Response, ResponseState};

/// Pipeline executor for single items
pub struct PipelineExecutor<'a, T> {
    name: &'a str,
    steps: &'a [Step<T>],
}

impl<'a, T> PipelineExecutor<'a, T> {
    pub fn new(name: &'a str, steps: &'a [Step<T>]) -> Self {
        Self { name, steps }
    }

    /// Execute all steps over `item`
    pub fn execute(&self, item: Option<T>, context: &ExecutionContext) -> Response<T> {
        let mut data = item;
        let mut state = ResponseState::None;
        let mut warnings = Vec::new();

        tracing::debug!("Executing pipeline '{}' ({} steps)", self.name, self.steps.len());

        for step in self.steps {
            let processor = step.processor.name();

            let Some(current) = data.take() else {
                tracing::debug!(
                    "No data before processor '{}', stopping pipeline '{}'",
                    processor,
                    self.name
                );
                return finish(Response::null_data(), warnings);
            };

            if let Some(predicate) = &step.predicate {
                if !predicate.evaluate(&current) {
                    tracing::debug!(
                        "Skipping processor '{}': condition '{}' is false",
                        processor,
                        predicate
                    );
                    state = ResponseState::NotExecuted;
                    data = Some(current);
                    continue;
                }
            }

            let response = invoke(step.processor.as_ref(), current, context);
            tracing::debug!("Processor '{}' returned {}", processor, response.state);

            match advance(self.name, processor, response, &mut warnings) {
                Flow::Continue(next, next_state) => {
                    data = Some(next);
                    state = next_state;
                }
                Flow::Stop(response) => return finish(response, warnings),
            }
        }

        debug_assert!(!state.is_terminal());
        tracing::debug!(
            "Pipeline '{}' completed (last step state {})",
            self.name,
            state
        );
        finish(Response::new(ResponseState::Ok, data), warnings)
    }
}
