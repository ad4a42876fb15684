//! Aggregate registry: name lookup, construction and documentation.

use std::fmt;

use fedq_result::{Error, Result};
use fedq_types::ValueKind;

use crate::{Aggregate, Average, Count, Max, Min, Sum};

/// Static metadata and factory for one aggregate.
#[derive(Clone, Copy)]
pub struct AggregateDescriptor {
    /// Canonical lowercase name used in queries.
    pub name: &'static str,
    pub description: &'static str,
    /// Kinds the aggregate accepts; empty means every kind.
    pub accepted_kinds: &'static [ValueKind],
    pub constructor: fn() -> Box<dyn Aggregate>,
}

impl fmt::Debug for AggregateDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AggregateDescriptor")
            .field("name", &self.name)
            .field("accepted_kinds", &self.accepted_kinds)
            .finish_non_exhaustive()
    }
}

impl AggregateDescriptor {
    /// Build a fresh, empty instance.
    pub fn create(&self) -> Box<dyn Aggregate> {
        (self.constructor)()
    }

    pub fn documentation(&self) -> Documentation {
        Documentation {
            name: self.name,
            description: self.description,
            accepted_kinds: self.accepted_kinds.to_vec(),
        }
    }
}

/// Renderable description of an aggregate, consumed by documentation tooling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Documentation {
    pub name: &'static str,
    pub description: &'static str,
    pub accepted_kinds: Vec<ValueKind>,
}

impl fmt::Display for Documentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "  {}", self.description)?;
        if self.accepted_kinds.is_empty() {
            write!(f, "  accepts: any")
        } else {
            let kinds: Vec<&str> = self.accepted_kinds.iter().map(ValueKind::as_str).collect();
            write!(f, "  accepts: {}", kinds.join(", "))
        }
    }
}

fn new_average() -> Box<dyn Aggregate> {
    Box::new(Average::new())
}

fn new_count() -> Box<dyn Aggregate> {
    Box::new(Count::new())
}

fn new_max() -> Box<dyn Aggregate> {
    Box::new(Max::new())
}

fn new_min() -> Box<dyn Aggregate> {
    Box::new(Min::new())
}

fn new_sum() -> Box<dyn Aggregate> {
    Box::new(Sum::new())
}

static DESCRIPTORS: [AggregateDescriptor; 5] = [
    AggregateDescriptor {
        name: "avg",
        description: "Arithmetic mean of the group's values. Durations average to a duration, \
                      everything else to a float.",
        accepted_kinds: &[ValueKind::Int, ValueKind::Float, ValueKind::Duration],
        constructor: new_average,
    },
    AggregateDescriptor {
        name: "count",
        description: "Number of records in the group.",
        accepted_kinds: &[],
        constructor: new_count,
    },
    AggregateDescriptor {
        name: "max",
        description: "Greatest value in the group. For booleans, any true makes the result true.",
        accepted_kinds: &[
            ValueKind::Int,
            ValueKind::Float,
            ValueKind::String,
            ValueKind::Bool,
            ValueKind::Duration,
            ValueKind::Time,
        ],
        constructor: new_max,
    },
    AggregateDescriptor {
        name: "min",
        description: "Least value in the group. For booleans, any false makes the result false.",
        accepted_kinds: &[
            ValueKind::Int,
            ValueKind::Float,
            ValueKind::String,
            ValueKind::Bool,
            ValueKind::Duration,
            ValueKind::Time,
        ],
        constructor: new_min,
    },
    AggregateDescriptor {
        name: "sum",
        description: "Sum of the group's values.",
        accepted_kinds: &[ValueKind::Int, ValueKind::Float, ValueKind::Duration],
        constructor: new_sum,
    },
];

/// Every registered aggregate, sorted by name.
pub fn descriptors() -> &'static [AggregateDescriptor] {
    &DESCRIPTORS
}

/// Look up an aggregate by name, ignoring ASCII case.
pub fn descriptor(name: &str) -> Option<&'static AggregateDescriptor> {
    DESCRIPTORS
        .iter()
        .find(|d| d.name.eq_ignore_ascii_case(name))
}

/// Build a fresh instance of the aggregate called `name`.
pub fn create_aggregate(name: &str) -> Result<Box<dyn Aggregate>> {
    descriptor(name)
        .map(AggregateDescriptor::create)
        .ok_or_else(|| Error::InvalidArgumentError(format!("unknown aggregate '{name}'")))
}
