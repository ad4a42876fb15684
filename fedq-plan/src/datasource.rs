//! Data source builders: the seam through which external sources join a plan.

use std::fmt::Debug;

use fedq_executor::{ExecutionNode, FilterExec, ValuesExec};
use fedq_expr::{Formula, VariableName};
use fedq_result::{Error, Result};
use fedq_types::{QueryContext, Value};

use crate::materialize::Materialize;

/// Compiles a data source leaf into an executable operator.
///
/// `filter` is the predicate the plan asks the source to apply. A builder may
/// push all of it to the external system, evaluate it locally, or mix both;
/// the records it produces must satisfy it either way. Output fields are
/// qualified with `alias`.
pub trait DataSourceBuilder: Debug + Send + Sync {
    /// Name used in diagnostics.
    fn name(&self) -> &str;

    fn materialize(
        &self,
        ctx: &QueryContext,
        filter: &Formula,
        alias: &str,
    ) -> Result<Box<dyn ExecutionNode>>;
}

/// A source backed by rows held in memory. Filters are evaluated locally.
#[derive(Clone, Debug)]
pub struct InMemorySource {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl InMemorySource {
    pub fn new(
        name: impl Into<String>,
        columns: Vec<String>,
        rows: Vec<Vec<Value>>,
    ) -> Result<Self> {
        if let Some(idx) = rows.iter().position(|row| row.len() != columns.len()) {
            return Err(Error::InvalidArgumentError(format!(
                "row {idx} has {} values but source has {} columns",
                rows[idx].len(),
                columns.len()
            )));
        }
        Ok(Self {
            name: name.into(),
            columns,
            rows,
        })
    }
}

impl DataSourceBuilder for InMemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn materialize(
        &self,
        ctx: &QueryContext,
        filter: &Formula,
        alias: &str,
    ) -> Result<Box<dyn ExecutionNode>> {
        let fields = self
            .columns
            .iter()
            .map(|column| VariableName::qualified(alias, column.clone()))
            .collect();
        let values = ValuesExec::from_rows(fields, self.rows.clone())?;
        if *filter == Formula::Constant(true) {
            return Ok(Box::new(values));
        }
        let formula = filter.materialize(ctx)?;
        Ok(Box::new(FilterExec::new(formula, Box::new(values))))
    }
}
