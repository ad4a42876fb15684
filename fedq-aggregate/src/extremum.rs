//! `max` and `min`: per-group extreme values.

use std::cmp::Ordering;

use fedq_result::{Error, Result};
use fedq_types::{GroupKey, GroupingMap, Value, ValueKind};

use crate::Aggregate;
use crate::witness::TypeWitness;

const ACCEPTED: &[ValueKind] = &[
    ValueKind::Int,
    ValueKind::Float,
    ValueKind::String,
    ValueKind::Bool,
    ValueKind::Duration,
    ValueKind::Time,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Max,
    Min,
}

impl Direction {
    fn name(self) -> &'static str {
        match self {
            Direction::Max => "max",
            Direction::Min => "min",
        }
    }

    /// Boolean that always takes over the slot: `true` for max, `false` for min.
    fn dominant_bool(self) -> bool {
        self == Direction::Max
    }

    fn wins(self, ord: Ordering) -> bool {
        match self {
            Direction::Max => ord == Ordering::Greater,
            Direction::Min => ord == Ordering::Less,
        }
    }
}

#[derive(Debug)]
struct Extremum {
    direction: Direction,
    current: GroupingMap<Value>,
    witness: TypeWitness,
}

impl Extremum {
    fn new(direction: Direction) -> Self {
        Self {
            direction,
            current: GroupingMap::new(),
            witness: TypeWitness::new(),
        }
    }

    fn add_record(&mut self, key: &GroupKey, value: Value) -> Result<()> {
        let name = self.direction.name();
        self.witness.observe(name, &value, ACCEPTED)?;

        let replace = match (self.current.get(key), &value) {
            (None, _) => true,
            // Bool does not use the kind order: the dominant value sticks.
            (Some(_), Value::Bool(b)) => *b == self.direction.dominant_bool(),
            // Unordered floats (NaN on either side) never replace the slot.
            (Some(Value::Float(previous)), Value::Float(candidate)) => candidate
                .partial_cmp(previous)
                .is_some_and(|ord| self.direction.wins(ord)),
            (Some(previous), candidate) => self.direction.wins(candidate.compare(previous)?),
        };
        if replace {
            self.current.set(key.clone(), value);
        }
        Ok(())
    }

    fn get_aggregated(&self, key: &GroupKey) -> Result<Value> {
        self.current
            .get(key)
            .cloned()
            .ok_or_else(|| Error::GroupNotFound {
                aggregate: self.direction.name(),
                key: key.to_string(),
            })
    }
}

/// Per-group maximum.
///
/// Ints, floats, strings and durations keep the strictly greatest value under
/// their kind's order; times keep the latest instant. Booleans are special:
/// once a group has seen `true`, its maximum stays `true`.
#[derive(Debug)]
pub struct Max(Extremum);

impl Max {
    pub fn new() -> Self {
        Max(Extremum::new(Direction::Max))
    }
}

impl Default for Max {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregate for Max {
    fn add_record(&mut self, key: &GroupKey, value: Value) -> Result<()> {
        self.0.add_record(key, value)
    }

    fn get_aggregated(&self, key: &GroupKey) -> Result<Value> {
        self.0.get_aggregated(key)
    }

    fn name(&self) -> &'static str {
        "max"
    }
}

/// Per-group minimum. Mirror of [`Max`]; for booleans `false` sticks.
#[derive(Debug)]
pub struct Min(Extremum);

impl Min {
    pub fn new() -> Self {
        Min(Extremum::new(Direction::Min))
    }
}

impl Default for Min {
    fn default() -> Self {
        Self::new()
    }
}

impl Aggregate for Min {
    fn add_record(&mut self, key: &GroupKey, value: Value) -> Result<()> {
        self.0.add_record(key, value)
    }

    fn get_aggregated(&self, key: &GroupKey) -> Result<Value> {
        self.0.get_aggregated(key)
    }

    fn name(&self) -> &'static str {
        "min"
    }
}
