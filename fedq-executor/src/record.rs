use std::fmt;

use fedq_expr::VariableName;
use fedq_result::{Error, Result};
use fedq_types::Value;

/// One row flowing between operators.
///
/// A record with `undo` set retracts a previously emitted record with the
/// same values.
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    fields: Vec<VariableName>,
    values: Vec<Value>,
    undo: bool,
}

impl Record {
    pub fn new(fields: Vec<VariableName>, values: Vec<Value>) -> Result<Self> {
        if fields.len() != values.len() {
            return Err(Error::InvalidArgumentError(format!(
                "record has {} fields but {} values",
                fields.len(),
                values.len()
            )));
        }
        Ok(Self {
            fields,
            values,
            undo: false,
        })
    }

    /// The retraction of this record.
    pub fn into_undo(mut self) -> Self {
        self.undo = true;
        self
    }

    pub fn is_undo(&self) -> bool {
        self.undo
    }

    pub fn fields(&self) -> &[VariableName] {
        &self.fields
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// Value of the first field `name` addresses.
    pub fn get(&self, name: &VariableName) -> Option<&Value> {
        self.fields
            .iter()
            .position(|field| name.matches(field))
            .map(|idx| &self.values[idx])
    }

    /// Replace the source qualifier of every field.
    pub fn requalify(mut self, qualifier: &str) -> Self {
        for field in &mut self.fields {
            *field = field.with_source(qualifier);
        }
        self
    }
}

impl fmt::Display for Record {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.undo {
            f.write_str("undo ")?;
        }
        f.write_str("{")?;
        for (idx, (field, value)) in self.fields.iter().zip(&self.values).enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{field}: {value}")?;
        }
        f.write_str("}")
    }
}
