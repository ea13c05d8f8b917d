//! Error taxonomy for record store operations.

use crate::todo::TodoId;
use thiserror::Error;

/// Reasons a todo's text is refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Text is empty or only whitespace
    #[error("Todo text cannot be empty")]
    EmptyText,

    /// Text exceeds the maximum length
    #[error("Todo text too long ({actual} characters, max {max})")]
    TextTooLong {
        /// Maximum number of characters allowed
        max: usize,
        /// Number of characters given
        actual: usize,
    },
}

/// Errors returned by [`TodoApi`](crate::api::TodoApi) operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// No record with this identifier exists
    #[error("Todo not found: {0}")]
    NotFound(TodoId),

    /// The requested change is not acceptable
    #[error("Invalid todo: {0}")]
    Validation(#[from] ValidationError),

    /// The persisted blob exists but cannot be parsed
    #[error("Stored todos under '{key}' are corrupt: {reason}")]
    Corrupt {
        /// Name of the blob
        key: String,
        /// Parser error
        reason: String,
    },

    /// The persistence medium failed
    #[error("Storage error: {0}")]
    Storage(String),
}

impl ApiError {
    /// Returns true for [`ApiError::NotFound`]
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}
