use fedq_result::{Error, Result};
use fedq_types::{GroupKey, GroupingMap, Value};

use crate::Aggregate;

/// Number of records per group. Accepts values of every kind, `Null`
/// included, and never locks a type witness.
#[derive(Debug, Default)]
pub struct Count {
    counts: GroupingMap<i64>,
}

impl Count {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Aggregate for Count {
    fn add_record(&mut self, key: &GroupKey, _value: Value) -> Result<()> {
        *self.counts.get_or_insert_with(key, || 0) += 1;
        Ok(())
    }

    fn get_aggregated(&self, key: &GroupKey) -> Result<Value> {
        self.counts
            .get(key)
            .map(|n| Value::Int(*n))
            .ok_or_else(|| Error::GroupNotFound {
                aggregate: "count",
                key: key.to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "count"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_mixed_kinds() {
        let mut count = Count::new();
        let key = GroupKey::new(vec![Value::from("g")]);
        for value in [Value::Int(1), Value::from("x"), Value::Null, Value::Bool(true)] {
            count.add_record(&key, value).unwrap();
        }
        assert_eq!(count.get_aggregated(&key).unwrap(), Value::Int(4));
        assert!(count.get_aggregated(&GroupKey::empty()).is_err());
    }
}
