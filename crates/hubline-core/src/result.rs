//! Convenience result type alias for Hubline.

use crate::error::AppError;

/// A specialized `Result` type for Hubline operations.
pub type AppResult<T> = Result<T, AppError>;
