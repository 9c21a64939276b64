//! Batch executor
//!
//! Runs a batch pipeline over a collection. Each step's predicate is applied
//! per element to split the collection into included and excluded items;
//! the step itself always receives the whole incoming collection.

use super::{advance, finish, invoke, record, Flow};
use crate::batch::BatchStep;
use crate::context::ExecutionContext;
use crate::response::{Response, ResponseState};

/// Pipeline executor for collections
pub struct BatchExecutor<'a, T> {
    name: &'a str,
    steps: &'a [BatchStep<T>],
}

impl<'a, T: Clone> BatchExecutor<'a, T> {
    pub fn new(name: &'a str, steps: &'a [BatchStep<T>]) -> Self {
        Self { name, steps }
    }

    /// Execute all steps over `items`
    pub fn execute(&self, items: Vec<T>, context: &ExecutionContext) -> Response<Vec<T>> {
        let mut data = items;
        let mut state = ResponseState::None;
        let mut warnings = Vec::new();

        tracing::debug!(
            "Executing batch pipeline '{}' ({} steps, {} items)",
            self.name,
            self.steps.len(),
            data.len()
        );

        for step in self.steps {
            let processor = step.processor.name();

            if data.is_empty() {
                tracing::debug!(
                    "Empty collection before processor '{}', stopping pipeline '{}'",
                    processor,
                    self.name
                );
                return finish(Response::null_data(), warnings);
            }

            let excluded: Vec<T> = match &step.predicate {
                Some(predicate) => data
                    .iter()
                    .filter(|item| !predicate.evaluate(item))
                    .cloned()
                    .collect(),
                None => Vec::new(),
            };
            let included = data.len() - excluded.len();

            if included == 0 {
                tracing::debug!("Skipping processor '{}': no item matches", processor);
                if step.filter {
                    return finish(filtered_out(), warnings);
                }
                data = excluded;
                state = ResponseState::NotExecuted;
                continue;
            }

            let mut response = invoke(step.processor.as_ref(), data, context);
            tracing::debug!(
                "Processor '{}' returned {} for {} included items",
                processor,
                response.state,
                included
            );

            let response = if response.state.is_error() {
                response
            } else {
                if is_empty(&response) {
                    // empty results never reach advance
                    let nested = std::mem::take(&mut response.warnings);
                    if nested.is_empty()
                        && matches!(
                            response.state,
                            ResponseState::ContinueWithError | ResponseState::StopWithError
                        )
                    {
                        warnings.push(record(self.name, processor, response.state, &response.error));
                    }
                    warnings.extend(nested);
                }
                match merge_excluded(response, excluded, step.filter) {
                    Merge::Response(response) => response,
                    Merge::Filtered => return finish(filtered_out(), warnings),
                    Merge::Excluded(excluded) => {
                        data = excluded;
                        state = ResponseState::Ok;
                        continue;
                    }
                }
            };

            match advance(self.name, processor, response, &mut warnings) {
                Flow::Continue(next, next_state) => {
                    data = next;
                    state = next_state;
                }
                Flow::Stop(response) => return finish(response, warnings),
            }
        }

        debug_assert!(!state.is_terminal());
        finish(Response::new(ResponseState::Ok, Some(data)), warnings)
    }
}

enum Merge<T> {
    /// Continue with the step's (possibly extended) response
    Response(Response<Vec<T>>),
    /// Filter mode dropped everything
    Filtered,
    /// The step produced nothing; carry the excluded items on
    Excluded(Vec<T>),
}

fn merge_excluded<T>(mut response: Response<Vec<T>>, excluded: Vec<T>, filter: bool) -> Merge<T> {
    match response.data.as_mut() {
        Some(items) if !items.is_empty() => {
            if !filter {
                items.extend(excluded);
            }
            Merge::Response(response)
        }
        _ if filter => Merge::Filtered,
        _ => Merge::Excluded(excluded),
    }
}

fn is_empty<T>(response: &Response<Vec<T>>) -> bool {
    response.data.as_ref().map_or(true, Vec::is_empty)
}

fn filtered_out<T>() -> Response<Vec<T>> {
    Response::new(ResponseState::NullData, Some(Vec::new()))
}
