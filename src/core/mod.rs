//! Foundation layer: core types and math primitives.

pub mod math;
pub mod types;
