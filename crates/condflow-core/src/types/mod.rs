//! Value types

pub mod value;

pub use value::{format_number, Value};
