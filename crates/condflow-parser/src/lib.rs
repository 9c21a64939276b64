//! condflow Parser - expression text to condition AST
//!
//! Two independently callable stages:
//! - [`tokenize`] turns expression text into tokens
//! - [`parse`] turns tokens into a closed root `Group` condition
//!
//! [`parse_expression`] runs both.

pub mod condition_builder;
pub mod error;
pub mod tokenizer;

// Re-export main parser types
pub use condition_builder::{parse, ConditionBuilder};
pub use error::{ParseError, Result};
pub use tokenizer::tokenize;

use condflow_core::Condition;

/// Tokenize and parse an expression
pub fn parse_expression(input: &str) -> Result<Condition> {
    let tokens = tokenize(input)?;
    parse(&tokens)
}
