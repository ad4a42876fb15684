//! fedq: the execution core of a federated streaming SQL engine.
//!
//! This crate is the primary entrypoint of the workspace. It re-exports the
//! value model, the aggregation engine, the plan compilation protocol and the
//! pushdown translator from the underlying `fedq-*` crates, providing a
//! unified API surface for planners that drive the engine.
//!
//! # Quick Start
//!
//! Build a physical plan over an in-memory source, compile it and pull its
//! records:
//!
//! ```rust
//! use std::sync::Arc;
//! use fedq::plan::{InMemorySource, Materialize, Node};
//! use fedq::exec::ExecutionContext;
//! use fedq::expr::{Expression, Formula, Relation};
//! use fedq::{QueryContext, Value};
//!
//! let source = InMemorySource::new(
//!     "numbers",
//!     vec!["n".into()],
//!     (1..=5).map(|n| vec![Value::Int(n)]).collect(),
//! )
//! .unwrap();
//! let plan = Node::data_source(
//!     "t",
//!     Arc::new(source),
//!     Formula::predicate(
//!         Expression::variable("t.n"),
//!         Relation::MoreThan,
//!         Expression::constant(3),
//!     ),
//! );
//!
//! let query = QueryContext::begin("quick-start");
//! let exec = plan.materialize(&query).unwrap();
//! let count = exec.get(&ExecutionContext::new(query)).unwrap().count();
//! assert_eq!(count, 2);
//! ```
//!
//! # Architecture
//!
//! - **Values** (`fedq-types`): the variant [`Value`], canonical encoding and
//!   the structurally keyed [`GroupingMap`].
//! - **Trees** (`fedq-expr`): physical expressions and formulas.
//! - **Aggregation** (`fedq-aggregate`): type-locked aggregate state machines
//!   and their registry.
//! - **Execution** (`fedq-executor`): pull-based runtime operators.
//! - **Compilation** (`fedq-plan`): plan nodes, Transform and Materialize.
//! - **Pushdown** (`fedq-pushdown`): SQL fragment translation and the SQL
//!   data source.

pub use fedq_result::{Error, Result};
pub use fedq_types::{GroupKey, GroupingMap, QueryContext, Value, ValueKind};

pub mod aggregate {
    //! Aggregate state machines and the name-based registry.

    pub use fedq_aggregate::*;
}

pub mod expr {
    //! Physical expression and formula trees.

    pub use fedq_expr::*;
}

pub mod exec {
    //! Runtime operators, records and variable scopes.

    pub use fedq_executor::*;
}

pub mod plan {
    //! Plan nodes and the Transform/Materialize protocol.

    pub use fedq_plan::*;
}

pub mod pushdown {
    //! Predicate pushdown into external SQL sources.

    pub use fedq_pushdown::*;
}
