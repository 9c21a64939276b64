//! Step responses
//!
//! Every processor invocation yields a [`Response`] whose [`ResponseState`]
//! tells the executor whether to continue, stop or abort.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome tag of one step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseState {
    /// Initial state, never observed after a run
    None,
    Ok,
    /// The step's predicate was false
    NotExecuted,
    NullData,
    ContinueWithError,
    StopWithOk,
    StopWithError,
    FatalError,
    UnhandledError,
}

impl ResponseState {
    /// Whether the executor stops after a step in this state
    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            ResponseState::None
                | ResponseState::Ok
                | ResponseState::NotExecuted
                | ResponseState::ContinueWithError
        )
    }

    /// FatalError or UnhandledError
    pub fn is_error(&self) -> bool {
        matches!(self, ResponseState::FatalError | ResponseState::UnhandledError)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseState::None => "none",
            ResponseState::Ok => "ok",
            ResponseState::NotExecuted => "not_executed",
            ResponseState::NullData => "null_data",
            ResponseState::ContinueWithError => "continue_with_error",
            ResponseState::StopWithOk => "stop_with_ok",
            ResponseState::StopWithError => "stop_with_error",
            ResponseState::FatalError => "fatal_error",
            ResponseState::UnhandledError => "unhandled_error",
        }
    }
}

impl fmt::Display for ResponseState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A non-fatal error reported by a step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepWarning {
    pub processor: String,
    pub state: ResponseState,
    pub message: String,
}

/// Result of running a processor or a whole pipeline
#[derive(Debug)]
pub struct Response<T> {
    pub data: Option<T>,
    pub state: ResponseState,
    pub error: Option<anyhow::Error>,
    /// Errors recorded by `ContinueWithError` / `StopWithError` steps
    pub warnings: Vec<StepWarning>,
}

impl<T> Response<T> {
    pub fn new(state: ResponseState, data: Option<T>) -> Self {
        Self {
            data,
            state,
            error: None,
            warnings: Vec::new(),
        }
    }

    pub fn ok(data: T) -> Self {
        Self::new(ResponseState::Ok, Some(data))
    }

    pub fn null_data() -> Self {
        Self::new(ResponseState::NullData, None)
    }

    pub fn not_executed(data: T) -> Self {
        Self::new(ResponseState::NotExecuted, Some(data))
    }

    pub fn stop_ok(data: T) -> Self {
        Self::new(ResponseState::StopWithOk, Some(data))
    }

    pub fn continue_with_error(data: T, error: impl Into<anyhow::Error>) -> Self {
        Self::new(ResponseState::ContinueWithError, Some(data)).with_error(error)
    }

    pub fn stop_with_error(data: T, error: impl Into<anyhow::Error>) -> Self {
        Self::new(ResponseState::StopWithError, Some(data)).with_error(error)
    }

    /// Abort the pipeline. The executor wraps `error` as a processing error.
    pub fn fatal(error: impl Into<anyhow::Error>) -> Self {
        Self::new(ResponseState::FatalError, None).with_error(error)
    }

    /// Abort without an error of its own; the executor synthesizes one
    pub fn fatal_without_error(data: Option<T>) -> Self {
        Self::new(ResponseState::FatalError, data)
    }

    pub fn with_error(mut self, error: impl Into<anyhow::Error>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_data(mut self, data: Option<T>) -> Self {
        self.data = data;
        self
    }

    pub fn is_ok(&self) -> bool {
        self.state == ResponseState::Ok
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    /// Message of the attached error including its causes
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(|e| format!("{:#}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        let non_terminal = [
            ResponseState::Ok,
            ResponseState::NotExecuted,
            ResponseState::ContinueWithError,
        ];
        let terminal = [
            ResponseState::NullData,
            ResponseState::StopWithOk,
            ResponseState::StopWithError,
            ResponseState::FatalError,
            ResponseState::UnhandledError,
        ];

        assert!(non_terminal.iter().all(|s| !s.is_terminal()));
        assert!(terminal.iter().all(|s| s.is_terminal()));
    }

    #[test]
    fn test_constructors() {
        let resp = Response::continue_with_error(1, anyhow::anyhow!("soft failure"));
        assert_eq!(resp.state, ResponseState::ContinueWithError);
        assert_eq!(resp.data, Some(1));
        assert_eq!(resp.error_message().as_deref(), Some("soft failure"));

        let fatal: Response<i32> = Response::fatal(anyhow::anyhow!("boom"));
        assert!(fatal.data.is_none());
        assert!(fatal.state.is_error());
    }

    #[test]
    fn test_state_serialization() {
        let json = serde_json::to_string(&ResponseState::StopWithOk).unwrap();
        assert_eq!(json, "\"stop_with_ok\"");
        assert_eq!(ResponseState::StopWithOk.to_string(), "stop_with_ok");
    }
}
