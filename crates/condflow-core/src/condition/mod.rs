//! Condition AST
//!
//! The parser builds a tree of these nodes from an expression such as
//! `item.amount > 100 && (item.country = {"US", "CA"} || item.vip = true)`.
//! The root of a parsed tree is always a `Group`.
//!
//! # Node kinds
//! - `Group` - parenthesised list of conditions, AND-ed together
//! - `And` / `Or` - binary logical nodes
//! - `Comparison` - `left <op> right`, or a null check
//! - `SetComparison` - membership (`{...}`) or inclusive range (`[...]`)

mod clause;
mod types;

pub use clause::{ClauseElement, MathOperator, UnaryOperator};
pub use types::{
    Comparison, ComparisonOperator, Condition, GroupCondition, LogicalCondition, SetComparison,
    SetOperator,
};
