//! Value model shared by every fedq layer.
//!
//! - [`Value`] is the closed variant type flowing through records, expressions
//!   and aggregates.
//! - [`canonical`] defines the byte encoding that gives values structural
//!   equality and hashing, including nested tuples and objects.
//! - [`GroupingMap`] associates per-group state with [`GroupKey`]s, addressing
//!   slots by canonical bytes so independently built keys land together.
//! - [`QueryContext`] is the opaque per-query context forwarded through
//!   compilation and execution.

pub mod canonical;
pub mod grouping;
pub mod query_context;
pub mod value;

pub use canonical::CanonicalKey;
pub use grouping::{GroupKey, GroupingMap};
pub use query_context::QueryContext;
pub use value::{Value, ValueKind};
