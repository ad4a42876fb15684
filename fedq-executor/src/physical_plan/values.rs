use std::fmt;
use std::sync::Arc;

use fedq_expr::VariableName;
use fedq_result::Result;
use fedq_types::Value;

use crate::physical_plan::{ExecutionNode, RecordIter};
use crate::record::Record;
use crate::variables::ExecutionContext;

/// Replays a fixed list of records.
pub struct ValuesExec {
    records: Arc<[Record]>,
}

impl ValuesExec {
    pub fn new(records: Vec<Record>) -> Self {
        Self {
            records: records.into(),
        }
    }

    /// Build insert records sharing one field list.
    pub fn from_rows(fields: Vec<VariableName>, rows: Vec<Vec<Value>>) -> Result<Self> {
        let records = rows
            .into_iter()
            .map(|row| Record::new(fields.clone(), row))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(records))
    }
}

impl fmt::Debug for ValuesExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ValuesExec")
            .field("records_count", &self.records.len())
            .finish()
    }
}

impl ExecutionNode for ValuesExec {
    fn get(&self, ctx: &ExecutionContext) -> Result<RecordIter> {
        ctx.query.check()?;
        let records = Arc::clone(&self.records);
        Ok(Box::new((0..records.len()).map(move |idx| Ok(records[idx].clone()))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replays_rows_on_every_call() {
        let exec = ValuesExec::from_rows(
            vec![VariableName::parse("a")],
            vec![vec![Value::Int(1)], vec![Value::Int(2)]],
        )
        .unwrap();
        let ctx = ExecutionContext::default();
        for _ in 0..2 {
            let values: Vec<Value> = exec
                .get(&ctx)
                .unwrap()
                .map(|r| r.unwrap().into_values().remove(0))
                .collect();
            assert_eq!(values, vec![Value::Int(1), Value::Int(2)]);
        }
    }
}
