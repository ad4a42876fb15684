//! Physical plans and the compilation protocol that turns them into runtime
//! operators.
//!
//! A planner builds a [`Node`] tree. [`Transform`] optionally rewrites it
//! bottom-up through per-kind hooks; [`Materialize`] then compiles each node
//! into a [`fedq_executor::ExecutionNode`], resolving aggregates through the
//! registry and delegating leaves to their [`DataSourceBuilder`].
#![forbid(unsafe_code)]

pub mod datasource;
pub mod materialize;
pub mod node;
pub mod transform;
pub mod traversal;

pub use datasource::{DataSourceBuilder, InMemorySource};
pub use materialize::Materialize;
pub use node::{Node, NodeKind};
pub use transform::{
    ExpressionRewrite, FormulaRewrite, NodeRewrite, Transform, Transformers,
};
pub use traversal::{Traversable, fold_postorder, traverse_postorder};
