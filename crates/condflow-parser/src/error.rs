//! Parser error types

use condflow_core::CoreError;
use thiserror::Error;

/// Parser error
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// Lexing failed (only an unterminated quoted literal)
    #[error("Tokenizing error at offset {offset}: {message}")]
    Tokenizing { message: String, offset: usize },

    /// Structural problem in the token stream
    #[error("Parsing error at offset {offset}: {message}")]
    Parsing { message: String, offset: usize },

    /// A node failed validation when it was closed
    #[error(transparent)]
    Validation(#[from] CoreError),
}

impl ParseError {
    pub(crate) fn parsing(message: impl Into<String>, offset: usize) -> Self {
        ParseError::Parsing {
            message: message.into(),
            offset,
        }
    }

    pub fn is_tokenizing(&self) -> bool {
        matches!(self, ParseError::Tokenizing { .. })
    }

    pub fn is_parsing(&self) -> bool {
        matches!(self, ParseError::Parsing { .. })
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, ParseError::Validation(_))
    }
}

/// Result type for parser operations
pub type Result<T> = std::result::Result<T, ParseError>;
