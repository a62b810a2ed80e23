//! Predicate model and region query builders.

pub mod builder;
mod predicate;

pub use builder::{containing_point, near_point};
pub use predicate::{Condition, Predicate};
