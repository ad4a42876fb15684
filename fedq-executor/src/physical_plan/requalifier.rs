use std::fmt;

use fedq_result::Result;

use crate::physical_plan::{ExecutionNode, RecordIter};
use crate::variables::ExecutionContext;

/// Re-qualifies every field of its source's records with a new source name.
pub struct RequalifierExec {
    pub qualifier: String,
    pub source: Box<dyn ExecutionNode>,
}

impl RequalifierExec {
    pub fn new(qualifier: impl Into<String>, source: Box<dyn ExecutionNode>) -> Self {
        Self {
            qualifier: qualifier.into(),
            source,
        }
    }
}

impl fmt::Debug for RequalifierExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequalifierExec")
            .field("qualifier", &self.qualifier)
            .field("source", &self.source)
            .finish()
    }
}

impl ExecutionNode for RequalifierExec {
    fn get(&self, ctx: &ExecutionContext) -> Result<RecordIter> {
        let qualifier = self.qualifier.clone();
        let records = self.source.get(ctx)?;
        Ok(Box::new(records.map(move |record| {
            record.map(|record| record.requalify(&qualifier))
        })))
    }
}
