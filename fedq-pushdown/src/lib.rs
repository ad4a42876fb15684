//! Predicate pushdown into external SQL sources.
//!
//! [`translate`] renders a physical [`fedq_expr::Formula`] as a SQL fragment.
//! Columns of the pushed-to source appear by name; everything else is
//! replaced by a numbered placeholder whose expression is compiled with the
//! plan compilation protocol and bound as a query parameter on every
//! activation. [`SqlSourceBuilder`] wires this into a plan as a
//! [`fedq_plan::DataSourceBuilder`].
#![forbid(unsafe_code)]

pub mod dialect;
pub mod source;
pub mod translator;

pub use dialect::Dialect;
pub use source::{SqlClient, SqlSourceBuilder, SqlSourceExec};
pub use translator::{
    Aliases, ExecutionAliases, PushdownFragment, expression_to_sql, formula_to_sql,
    relation_to_sql, translate,
};
