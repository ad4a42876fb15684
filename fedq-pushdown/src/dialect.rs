/// Tokens of the external system's query dialect that the translator emits.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dialect {
    pub true_token: &'static str,
    pub false_token: &'static str,
    /// Prefix of numbered parameter placeholders, e.g. `$` for `$1`.
    pub placeholder_prefix: &'static str,
}

impl Dialect {
    pub const fn postgres() -> Self {
        Self {
            true_token: "TRUE",
            false_token: "FALSE",
            placeholder_prefix: "$",
        }
    }

    pub const fn with_placeholder_prefix(mut self, prefix: &'static str) -> Self {
        self.placeholder_prefix = prefix;
        self
    }

    pub const fn with_bool_tokens(
        mut self,
        true_token: &'static str,
        false_token: &'static str,
    ) -> Self {
        self.true_token = true_token;
        self.false_token = false_token;
        self
    }

    pub(crate) fn bool_token(&self, value: bool) -> &'static str {
        if value {
            self.true_token
        } else {
            self.false_token
        }
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::postgres()
    }
}
