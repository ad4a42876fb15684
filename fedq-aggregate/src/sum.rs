use fedq_result::{Error, Result};
use fedq_types::{GroupKey, GroupingMap, Value, ValueKind};

use crate::Aggregate;
use crate::witness::{TypeWitness, invalid_type};

const NAME: &str = "sum";
const ACCEPTED: &[ValueKind] = &[ValueKind::Int, ValueKind::Float, ValueKind::Duration];

/// Per-group total. Integer and duration overflow is an error rather than a
/// wrap-around.
#[derive(Debug, Default)]
pub struct Sum {
    totals: GroupingMap<Value>,
    witness: TypeWitness,
}

impl Sum {
    pub fn new() -> Self {
        Self::default()
    }
}

fn overflow(total: &Value, value: &Value) -> Error {
    Error::InvalidArgumentError(format!("sum overflow adding {value} to {total}"))
}

impl Aggregate for Sum {
    fn add_record(&mut self, key: &GroupKey, value: Value) -> Result<()> {
        self.witness.observe(NAME, &value, ACCEPTED)?;

        let next = match (self.totals.get(key), &value) {
            (None, Value::Int(_) | Value::Float(_) | Value::Duration(_)) => value.clone(),
            (Some(Value::Int(total)), Value::Int(v)) => total
                .checked_add(*v)
                .map(Value::Int)
                .ok_or_else(|| overflow(&Value::Int(*total), &value))?,
            (Some(Value::Float(total)), Value::Float(v)) => Value::Float(total + v),
            (Some(Value::Duration(total)), Value::Duration(v)) => total
                .checked_add(*v)
                .map(Value::Duration)
                .ok_or_else(|| overflow(&Value::Duration(*total), &value))?,
            _ => return Err(invalid_type(NAME, &value)),
        };
        self.totals.set(key.clone(), next);
        Ok(())
    }

    fn get_aggregated(&self, key: &GroupKey) -> Result<Value> {
        self.totals
            .get(key)
            .cloned()
            .ok_or_else(|| Error::GroupNotFound {
                aggregate: NAME,
                key: key.to_string(),
            })
    }

    fn name(&self) -> &'static str {
        NAME
    }
}
