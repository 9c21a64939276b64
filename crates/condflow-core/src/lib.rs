//! condflow Core - Core types shared by the condflow crates
//!
//! This crate provides the fundamental types used across the workspace:
//! - Value types for literals and field reads
//! - Tokens produced by the expression tokenizer
//! - The condition AST built by the parser
//! - Error types

pub mod condition;
pub mod error;
pub mod token;
pub mod types;

// Re-export commonly used types
pub use condition::{
    ClauseElement, Comparison, ComparisonOperator, Condition, GroupCondition, LogicalCondition,
    MathOperator, SetComparison, SetOperator, UnaryOperator,
};
pub use error::CoreError;
pub use token::{Delimiter, OperatorSymbol, Token, TokenKind};
pub use types::Value;
