use std::fmt;
use std::sync::Arc;

use fedq_result::Result;

use crate::expression::Formula;
use crate::physical_plan::{ExecutionNode, RecordIter};
use crate::variables::{ExecutionContext, Variables};

/// Passes through the records for which the formula holds. Retractions are
/// filtered by the same rule as insertions.
pub struct FilterExec {
    pub formula: Arc<Formula>,
    pub source: Box<dyn ExecutionNode>,
}

impl FilterExec {
    pub fn new(formula: Formula, source: Box<dyn ExecutionNode>) -> Self {
        Self {
            formula: Arc::new(formula),
            source,
        }
    }
}

impl fmt::Debug for FilterExec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FilterExec")
            .field("formula", &self.formula)
            .field("source", &self.source)
            .finish()
    }
}

impl ExecutionNode for FilterExec {
    fn get(&self, ctx: &ExecutionContext) -> Result<RecordIter> {
        let formula = Arc::clone(&self.formula);
        let parent = Arc::clone(&ctx.variables);
        let records = self.source.get(ctx)?;
        Ok(Box::new(records.filter_map(move |record| {
            let record = match record {
                Ok(record) => record,
                Err(err) => return Some(Err(err)),
            };
            let scope = Variables::with_record(&parent, &record);
            match formula.evaluate(&scope) {
                Ok(true) => Some(Ok(record)),
                Ok(false) => None,
                Err(err) => Some(Err(err)),
            }
        })))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expression::Expression;
    use crate::physical_plan::ValuesExec;
    use crate::record::Record;
    use fedq_expr::{Relation, VariableName};
    use fedq_types::Value;

    fn more_than(column: &str, bound: Expression) -> Formula {
        Formula::Predicate {
            left: Expression::Variable(VariableName::parse(column)),
            relation: Relation::MoreThan,
            right: bound,
        }
    }

    #[test]
    fn keeps_matching_records_and_retractions() {
        let fields = vec![VariableName::parse("t.a")];
        let source = ValuesExec::new(vec![
            Record::new(fields.clone(), vec![Value::Int(1)]).unwrap(),
            Record::new(fields.clone(), vec![Value::Int(5)]).unwrap(),
            Record::new(fields.clone(), vec![Value::Int(5)])
                .unwrap()
                .into_undo(),
        ]);
        let exec = FilterExec::new(
            more_than("a", Expression::Constant(Value::Int(2))),
            Box::new(source),
        );
        let records: Vec<Record> = exec
            .get(&ExecutionContext::default())
            .unwrap()
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(records.len(), 2);
        assert!(!records[0].is_undo());
        assert!(records[1].is_undo());
    }

    #[test]
    fn formula_sees_outer_variables() {
        let source =
            ValuesExec::from_rows(vec![VariableName::parse("a")], vec![vec![Value::Int(3)]])
                .unwrap();
        let exec = FilterExec::new(
            more_than("a", Expression::Variable(VariableName::parse("params.min"))),
            Box::new(source),
        );
        let ctx = ExecutionContext::default().with_variables(Variables::from_bindings([(
            VariableName::parse("params.min"),
            Value::Int(1),
        )]));
        assert_eq!(exec.get(&ctx).unwrap().count(), 1);
    }
}
