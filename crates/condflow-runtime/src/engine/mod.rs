//! Execution engine
//!
//! Drives a pipeline's steps over one item ([`PipelineExecutor`]) or one
//! collection ([`BatchExecutor`]). Both share the step-outcome handling in
//! this module.

mod batch_executor;
mod pipeline_executor;

pub use batch_executor::BatchExecutor;
pub use pipeline_executor::PipelineExecutor;

use crate::context::ExecutionContext;
use crate::error::RuntimeError;
use crate::processor::Processor;
use crate::response::{Response, ResponseState, StepWarning};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// What the executor does after one step
pub(crate) enum Flow<T> {
    Continue(T, ResponseState),
    Stop(Response<T>),
}

/// Run one processor, turning `Err` and panics into `UnhandledError`.
pub(crate) fn invoke<T>(
    processor: &dyn Processor<T>,
    item: T,
    context: &ExecutionContext,
) -> Response<T> {
    let outcome = panic::catch_unwind(AssertUnwindSafe(|| processor.execute(item, context)));
    match outcome {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => Response::new(ResponseState::UnhandledError, None).with_error(err),
        Err(payload) => Response::new(ResponseState::UnhandledError, None)
            .with_error(anyhow::anyhow!("panicked: {}", panic_message(payload.as_ref()))),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic payload"
    }
}

/// Interpret a step's response.
///
/// Error states are handled before the missing-data check so the cause of
/// an abort is never reported as `NullData`.
pub(crate) fn advance<T>(
    pipeline: &str,
    processor: &str,
    response: Response<T>,
    warnings: &mut Vec<StepWarning>,
) -> Flow<T> {
    let Response {
        data,
        state,
        error,
        warnings: nested,
    } = response;
    // a nested pipeline already recorded the step that failed
    let reported = !nested.is_empty();
    warnings.extend(nested);

    match (state, data) {
        (ResponseState::FatalError, data) => {
            let error = wrap_fatal(processor, error);
            tracing::error!(
                "Pipeline '{}' aborted by processor '{}': {:#}",
                pipeline,
                processor,
                error
            );
            Flow::Stop(Response::new(ResponseState::FatalError, data).with_error(error))
        }
        (ResponseState::UnhandledError, data) => {
            let error = wrap_unhandled(processor, error);
            tracing::error!(
                "Pipeline '{}' stopped by unhandled error in '{}': {:#}",
                pipeline,
                processor,
                error
            );
            Flow::Stop(Response::new(ResponseState::UnhandledError, data).with_error(error))
        }
        (state, None) => {
            tracing::debug!(
                "Processor '{}' returned no data (state {}), stopping pipeline '{}'",
                processor,
                state,
                pipeline
            );
            Flow::Stop(Response::null_data())
        }
        (ResponseState::NullData, Some(data)) => {
            Flow::Stop(Response::new(ResponseState::NullData, Some(data)))
        }
        (ResponseState::ContinueWithError, Some(data)) => {
            if !reported {
                warnings.push(record(pipeline, processor, ResponseState::ContinueWithError, &error));
            }
            Flow::Continue(data, ResponseState::ContinueWithError)
        }
        (ResponseState::StopWithOk, Some(data)) => {
            tracing::debug!("Processor '{}' stopped pipeline '{}'", processor, pipeline);
            Flow::Stop(Response::stop_ok(data))
        }
        (ResponseState::StopWithError, Some(data)) => {
            if !reported {
                warnings.push(record(pipeline, processor, ResponseState::StopWithError, &error));
            }
            let mut response = Response::new(ResponseState::StopWithError, Some(data));
            response.error = error;
            Flow::Stop(response)
        }
        (state @ ResponseState::NotExecuted, Some(data)) => Flow::Continue(data, state),
        (ResponseState::Ok | ResponseState::None, Some(data)) => {
            Flow::Continue(data, ResponseState::Ok)
        }
    }
}

/// Attach accumulated warnings to a terminal response
pub(crate) fn finish<T>(mut response: Response<T>, warnings: Vec<StepWarning>) -> Response<T> {
    let mut all = warnings;
    all.append(&mut response.warnings);
    response.warnings = all;
    response
}

pub(crate) fn record(
    pipeline: &str,
    processor: &str,
    state: ResponseState,
    error: &Option<anyhow::Error>,
) -> StepWarning {
    let message = match error {
        Some(err) => format!("{:#}", err),
        None => "processor reported an error".to_string(),
    };
    tracing::warn!(
        "Processor '{}' in pipeline '{}' reported {}: {}",
        processor,
        pipeline,
        state,
        message
    );
    StepWarning {
        processor: processor.to_string(),
        state,
        message,
    }
}

fn wrap_fatal(processor: &str, error: Option<anyhow::Error>) -> anyhow::Error {
    match error {
        Some(err) if err.is::<RuntimeError>() => err,
        Some(err) => RuntimeError::Processing {
            processor: processor.to_string(),
            source: err,
        }
        .into(),
        None => RuntimeError::Processing {
            processor: processor.to_string(),
            source: anyhow::anyhow!("processor raised error"),
        }
        .into(),
    }
}

fn wrap_unhandled(processor: &str, error: Option<anyhow::Error>) -> anyhow::Error {
    match error {
        Some(err) if err.is::<RuntimeError>() => err,
        Some(err) => RuntimeError::Unhandled {
            processor: processor.to_string(),
            source: err,
        }
        .into(),
        None => RuntimeError::Unhandled {
            processor: processor.to_string(),
            source: anyhow::anyhow!("processor failed without an error"),
        }
        .into(),
    }
}
