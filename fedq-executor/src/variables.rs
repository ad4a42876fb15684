use std::sync::Arc;

use fedq_expr::VariableName;
use fedq_result::{Error, Result};
use fedq_types::{QueryContext, Value};

use crate::record::Record;

/// Scoped variable bindings.
///
/// Lookup searches the innermost scope first. Within a scope an exact name
/// match wins over a match by bare column name.
#[derive(Clone, Debug, Default)]
pub struct Variables {
    bindings: Vec<(VariableName, Value)>,
    parent: Option<Arc<Variables>>,
}

impl Variables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bindings(bindings: impl IntoIterator<Item = (VariableName, Value)>) -> Self {
        Self {
            bindings: bindings.into_iter().collect(),
            parent: None,
        }
    }

    /// A child scope binding the fields of `record` over `parent`.
    pub fn with_record(parent: &Arc<Variables>, record: &Record) -> Self {
        Self {
            bindings: record
                .fields()
                .iter()
                .cloned()
                .zip(record.values().iter().cloned())
                .collect(),
            parent: Some(Arc::clone(parent)),
        }
    }

    pub fn get(&self, name: &VariableName) -> Result<&Value> {
        let mut scope = Some(self);
        while let Some(current) = scope {
            if let Some(value) = current.lookup(name) {
                return Ok(value);
            }
            scope = current.parent.as_deref();
        }
        Err(Error::NotFound(format!("variable {name}")))
    }

    fn lookup(&self, name: &VariableName) -> Option<&Value> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .or_else(|| self.bindings.iter().find(|(bound, _)| name.matches(bound)))
            .map(|(_, value)| value)
    }
}

/// Everything an operator needs while producing records.
#[derive(Clone, Debug, Default)]
pub struct ExecutionContext {
    pub query: QueryContext,
    pub variables: Arc<Variables>,
}

impl ExecutionContext {
    pub fn new(query: QueryContext) -> Self {
        Self {
            query,
            variables: Arc::new(Variables::new()),
        }
    }

    pub fn with_variables(mut self, variables: Variables) -> Self {
        self.variables = Arc::new(variables);
        self
    }
}
