use fedq_result::{Error, Result};
use fedq_types::{Value, ValueKind};

/// The kind an aggregate instance locks onto with its first input.
///
/// The witness keeps the locking value itself so mismatch errors can show
/// both offending values. The first input locks the witness even when its
/// kind is rejected; kinds outside the accepted set always fail with
/// `InvalidType`, before the lock is consulted.
#[derive(Clone, Debug, Default)]
pub struct TypeWitness {
    witness: Option<Value>,
}

impl TypeWitness {
    pub fn new() -> Self {
        Self::default()
    }

    /// Locked kind, if any value has been observed yet.
    pub fn kind(&self) -> Option<ValueKind> {
        self.witness.as_ref().map(Value::kind)
    }

    /// Validate `value` for `aggregate`, locking the witness on first use.
    pub fn observe(
        &mut self,
        aggregate: &'static str,
        value: &Value,
        accepted: &[ValueKind],
    ) -> Result<()> {
        if self.witness.is_none() {
            tracing::trace!(aggregate, kind = %value.kind(), "type witness locked");
            self.witness = Some(value.clone());
        }
        if !accepted.contains(&value.kind()) {
            return Err(invalid_type(aggregate, value));
        }
        if let Some(witness) = &self.witness
            && witness.kind() != value.kind()
        {
            return Err(Error::MixedTypes {
                aggregate,
                kind: value.kind().to_string(),
                value: value.to_string(),
                witness_kind: witness.kind().to_string(),
                witness_value: witness.to_string(),
            });
        }
        Ok(())
    }
}

pub(crate) fn invalid_type(context: &'static str, value: &Value) -> Error {
    Error::InvalidType {
        context,
        kind: value.kind().to_string(),
        value: value.to_string(),
    }
}
