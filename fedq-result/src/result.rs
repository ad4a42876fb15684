use crate::error::Error;

/// Result type alias used throughout fedq.
///
/// This is a type alias for `std::result::Result<T, Error>`. All fedq
/// operations that can fail return this type.
pub type Result<T> = std::result::Result<T, Error>;
