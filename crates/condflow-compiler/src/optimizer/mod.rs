//! Optimization passes run over a condition tree before code generation

pub mod constant_folding;

pub use constant_folding::ConstantFolder;
