//! Convenience result type alias for SessionWard.

use crate::error::AppError;

/// A specialized `Result` type for SessionWard operations.
pub type AppResult<T> = Result<T, AppError>;
