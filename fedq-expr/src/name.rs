use std::fmt;

/// A column reference, optionally qualified by the source (table alias) that
/// produces it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableName {
    source: Option<String>,
    name: String,
}

impl VariableName {
    pub fn qualified(source: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            name: name.into(),
        }
    }

    pub fn unqualified(name: impl Into<String>) -> Self {
        Self {
            source: None,
            name: name.into(),
        }
    }

    /// Split `text` on its first `.`: `"t.a"` is column `a` of source `t`,
    /// `"a"` is unqualified.
    pub fn parse(text: &str) -> Self {
        match text.split_once('.') {
            Some((source, name)) => Self::qualified(source, name),
            None => Self::unqualified(text),
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_qualified(&self) -> bool {
        self.source.is_some()
    }

    /// Copy of this name re-qualified with `source`.
    pub fn with_source(&self, source: impl Into<String>) -> Self {
        Self::qualified(source, self.name.clone())
    }

    /// Whether this name addresses `other`: equal names always match, and an
    /// unqualified name matches any qualification of the same column.
    pub fn matches(&self, other: &VariableName) -> bool {
        if self.name != other.name {
            return false;
        }
        match (&self.source, &other.source) {
            (Some(a), Some(b)) => a == b,
            _ => true,
        }
    }
}

impl fmt::Display for VariableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.source {
            Some(source) => write!(f, "{source}.{}", self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl From<&str> for VariableName {
    fn from(text: &str) -> Self {
        VariableName::parse(text)
    }
}
