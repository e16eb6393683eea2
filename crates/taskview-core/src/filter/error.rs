//! Error types for filter queries.

use std::fmt;

use thiserror::Error;

/// A specialized Result type for filter query operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while reading or writing filter queries.
///
/// Evaluation itself never fails: unknown properties, unknown operators and
/// incomplete conditions simply do not match.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The query JSON is malformed or its root group is missing required fields.
    #[error("malformed filter query: {message}")]
    Malformed {
        /// Description of what was wrong.
        message: String,
    },

    /// No group with the given id exists in the query.
    #[error("group not found: {id}")]
    GroupNotFound {
        /// The id that was looked up.
        id: String,
    },
}

impl FilterError {
    /// Creates a malformed query error.
    pub fn malformed(err: impl fmt::Display) -> Self {
        FilterError::Malformed {
            message: err.to_string(),
        }
    }

    /// Creates a group not found error.
    pub fn group_not_found(id: impl Into<String>) -> Self {
        FilterError::GroupNotFound { id: id.into() }
    }
}
