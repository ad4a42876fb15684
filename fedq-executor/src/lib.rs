//! Runtime layer of the fedq execution core.
//!
//! Plan compilation (`fedq-plan`) turns physical nodes into the operators in
//! this crate. Operators are pull-based: [`ExecutionNode::get`] returns a
//! stream of [`Record`]s that the caller drains on its own thread.
//!
//! # Module Organization
//!
//! - [`record`]: rows with named fields and a retraction flag
//! - [`variables`]: scoped name lookup and the per-execution context
//! - [`expression`]: runtime expressions and formulas
//! - [`like`]: SQL `LIKE` pattern matching
//! - [`physical_plan`]: the operators themselves

pub mod expression;
pub mod like;
pub mod physical_plan;
pub mod record;
pub mod variables;

pub use expression::{Expression, Formula};
pub use physical_plan::{
    EmitMode, ExecutionNode, FilterExec, GroupByExec, GroupByOptions, RecordIter, RequalifierExec,
    ValuesExec,
};
pub use record::Record;
pub use variables::{ExecutionContext, Variables};
