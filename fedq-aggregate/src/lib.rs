//! Streaming grouped aggregates.
//!
//! Each aggregate instance consumes `(group key, value)` pairs one at a time
//! and can report the aggregated value of any group that has received at
//! least one record. Instances that type-check their input lock onto the kind
//! of their first input (the *type witness*); the lock is global to the
//! instance, not per group.
//!
//! Instances are created by name through [`create_aggregate`]; the registry
//! also exposes [`Documentation`] for every aggregate it knows.

use fedq_result::Result;
use fedq_types::{GroupKey, Value};

pub mod average;
pub mod count;
pub mod extremum;
pub mod registry;
pub mod sum;
pub mod witness;

pub use average::Average;
pub use count::Count;
pub use extremum::{Max, Min};
pub use registry::{AggregateDescriptor, Documentation, create_aggregate, descriptor, descriptors};
pub use sum::Sum;
pub use witness::TypeWitness;

/// A grouped aggregate state machine.
///
/// Instances are single-owner and driven by one pipeline; no internal
/// synchronisation is performed.
pub trait Aggregate: Send + std::fmt::Debug {
    /// Fold `value` into the state of the group identified by `key`.
    fn add_record(&mut self, key: &GroupKey, value: Value) -> Result<()>;

    /// Current aggregated value of the group identified by `key`.
    ///
    /// Fails with `GroupNotFound` when the group never received a record.
    fn get_aggregated(&self, key: &GroupKey) -> Result<Value>;

    /// Query-language name of the aggregate.
    fn name(&self) -> &'static str;
}
