//! Physical expression and formula trees.
//!
//! These are the planner-facing trees a physical plan carries. They are
//! immutable; rewriting (Transform) builds new trees and compilation
//! (Materialize) turns them into runtime evaluators in `fedq-executor`.
#![forbid(unsafe_code)]

pub mod expr;
pub mod format;
pub mod name;

pub use expr::*;
pub use name::VariableName;
