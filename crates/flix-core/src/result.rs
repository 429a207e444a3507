//! Result type aliases for Flix.

use crate::FlixError;

/// A specialized `Result` type for Flix operations.
pub type FlixResult<T> = Result<T, FlixError>;
