use std::fmt;
use thiserror::Error;

/// Unified error type for all fedq operations.
///
/// Values and value kinds are carried pre-rendered as strings so this crate
/// stays at the bottom of the dependency graph; the rendering comes from the
/// value model's `Display` implementations.
///
/// # Error Handling Strategy
///
/// Errors propagate upward with `?`. Compilation failures are wrapped in
/// [`Error::Compile`] once per plan level, so the chain of node kinds leading
/// to the original cause is preserved and reachable through
/// [`std::error::Error::source`].
#[derive(Error, Debug)]
pub enum Error {
    /// An aggregate instance received a value whose kind differs from the kind
    /// it locked onto with its first input.
    ///
    /// The type witness is global to the aggregate instance, so this fires even
    /// when the two values belong to different groups.
    #[error(
        "mixed types in {aggregate}: {kind} and {witness_kind} with values {value} and {witness_value}"
    )]
    MixedTypes {
        /// Query-language name of the aggregate (`avg`, `max`, ...).
        aggregate: &'static str,
        /// Kind of the rejected value.
        kind: String,
        /// Rendering of the rejected value.
        value: String,
        /// Kind the instance is locked to.
        witness_kind: String,
        /// Rendering of the value that locked the instance.
        witness_value: String,
    },

    /// A value kind the operator does not support at all.
    #[error("invalid type in {context}: {kind} with value {value}")]
    InvalidType {
        /// Operator or aggregate that rejected the value.
        context: &'static str,
        kind: String,
        value: String,
    },

    /// An aggregated value was requested for a group that never received a
    /// record. Aggregates never fall back to a default value.
    #[error("{aggregate} for key {key} not found")]
    GroupNotFound { aggregate: &'static str, key: String },

    /// A Materialize step failed.
    ///
    /// `kind` names the node, expression or formula kind whose compilation
    /// failed; `source` is the underlying failure, which may itself be a
    /// `Compile` error of a child.
    #[error("couldn't materialize {kind}: {source}")]
    Compile {
        kind: &'static str,
        #[source]
        source: Box<Error>,
    },

    /// Internal error indicating a bug or unexpected state.
    ///
    /// Raised when a closed enum value outside its declared variant set reaches
    /// a translation or materialization site, or when a traversal finds an
    /// inconsistent stack. Never caused by data.
    #[error("An internal operation failed: {0}")]
    Internal(String),

    /// Ordering was requested between values of different kinds.
    #[error("cannot compare {left} with {right}")]
    TypeMismatch { left: String, right: String },

    /// Invalid input or API parameter: arithmetic overflow, unknown aggregate
    /// names, malformed operands, unsupported record shapes.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// A variable or other named entity could not be resolved.
    #[error("not found: {0}")]
    NotFound(String),

    /// The query context was cancelled or its deadline elapsed.
    #[error("query cancelled: {0}")]
    Cancelled(String),

    /// An external collaborator (database client, data source) failed.
    #[error("external source error: {0}")]
    External(String),
}

impl Error {
    /// Wrap `err` with the kind of the plan element being compiled.
    #[inline]
    pub fn compile(kind: &'static str, err: Error) -> Self {
        Error::Compile {
            kind,
            source: Box::new(err),
        }
    }

    /// Create an internal-invariant error from any displayable message.
    #[inline]
    pub fn internal<M: fmt::Display>(message: M) -> Self {
        Error::Internal(message.to_string())
    }

    /// Create an external collaborator error from any displayable error.
    ///
    /// # Examples
    ///
    /// ```
    /// use fedq_result::Error;
    ///
    /// let io_err = std::io::Error::other("connection reset");
    /// let err = Error::external(io_err);
    /// assert!(matches!(err, Error::External(msg) if msg.contains("connection reset")));
    /// ```
    #[inline]
    pub fn external<E: fmt::Display>(err: E) -> Self {
        Error::External(err.to_string())
    }

    /// Follow the [`Error::Compile`] chain down to the original failure.
    pub fn root_cause(&self) -> &Error {
        let mut current = self;
        while let Error::Compile { source, .. } = current {
            current = source;
        }
        current
    }

    /// Kinds of the plan elements wrapped around the root cause, outermost first.
    pub fn compile_path(&self) -> Vec<&'static str> {
        let mut path = Vec::new();
        let mut current = self;
        while let Error::Compile { kind, source } = current {
            path.push(*kind);
            current = source;
        }
        path
    }
}
