//! Error types and result definitions for the fedq execution core.
//!
//! Every fedq crate returns [`Result<T>`], whose error variant is the single
//! workspace-wide [`Error`] enum. Callers inspect failures by variant rather
//! than by message text.
//!
//! # Error Categories
//!
//! - **Mixed types** ([`Error::MixedTypes`]): an aggregate instance saw two value kinds
//! - **Invalid type** ([`Error::InvalidType`]): a value kind an operator cannot handle at all
//! - **Group not found** ([`Error::GroupNotFound`]): aggregated value requested for an empty group
//! - **Compile errors** ([`Error::Compile`]): a Materialize step failed; wraps the cause
//! - **Internal errors** ([`Error::Internal`]): violated invariants (programming errors upstream)
//! - **Comparison errors** ([`Error::TypeMismatch`]): ordering requested across value kinds
//! - **User input errors** ([`Error::InvalidArgumentError`]): overflow, unknown names, bad shapes
//! - **Lookup failures** ([`Error::NotFound`]): unknown variables
//! - **Cancellation** ([`Error::Cancelled`]): the query context was cancelled or timed out
//! - **Collaborator failures** ([`Error::External`]): errors reported by external clients

pub mod error;
pub mod result;

pub use error::Error;
pub use result::Result;
