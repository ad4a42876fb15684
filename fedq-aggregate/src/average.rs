use fedq_result::{Error, Result};
use fedq_types::{GroupKey, GroupingMap, Value, ValueKind};
use time::Duration;

use crate::Aggregate;
use crate::witness::{TypeWitness, invalid_type};

const NAME: &str = "avg";
const ACCEPTED: &[ValueKind] = &[ValueKind::Int, ValueKind::Float, ValueKind::Duration];

/// Running arithmetic mean per group.
///
/// Ints and durations (as nanoseconds) are accumulated as `f64`. The result is
/// a `Float`, or a `Duration` truncated toward zero when the instance is
/// locked to durations.
#[derive(Debug, Default)]
pub struct Average {
    averages: GroupingMap<f64>,
    counts: GroupingMap<u64>,
    witness: TypeWitness,
}

impl Average {
    pub fn new() -> Self {
        Self::default()
    }
}

fn as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Int(v) => Some(*v as f64),
        Value::Float(v) => Some(*v),
        Value::Duration(v) => Some(v.whole_nanoseconds() as f64),
        _ => None,
    }
}

impl Aggregate for Average {
    fn add_record(&mut self, key: &GroupKey, value: Value) -> Result<()> {
        self.witness.observe(NAME, &value, ACCEPTED)?;
        let x = as_f64(&value).ok_or_else(|| invalid_type(NAME, &value))?;

        let count = self.counts.get_or_insert_with(key, || 0);
        *count += 1;
        let n = *count as f64;

        let average = self.averages.get_or_insert_with(key, || 0.0);
        *average = (*average * (n - 1.0) + x) / n;
        Ok(())
    }

    fn get_aggregated(&self, key: &GroupKey) -> Result<Value> {
        let average = self.averages.get(key).ok_or_else(|| Error::GroupNotFound {
            aggregate: "average",
            key: key.to_string(),
        })?;
        match self.witness.kind() {
            // `as` saturates and truncates toward zero.
            Some(ValueKind::Duration) => Ok(Value::Duration(Duration::nanoseconds(*average as i64))),
            _ => Ok(Value::Float(*average)),
        }
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
