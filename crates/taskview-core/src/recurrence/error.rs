//! Error types for recurrence rules.

use thiserror::Error;

/// A specialized Result type for recurrence rule operations.
pub type RecurrenceResult<T> = Result<T, RecurrenceError>;

/// Errors that can occur while parsing a recurrence rule.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecurrenceError {
    /// The rule is empty.
    #[error("recurrence rule is empty")]
    EmptyRule,

    /// The rule has no `FREQ` part.
    #[error("recurrence rule has no FREQ")]
    MissingFrequency,

    /// A part is not of the form `KEY=VALUE`.
    #[error("invalid rule part: {part}")]
    InvalidPart {
        /// The offending part.
        part: String,
    },

    /// A part carries a value that cannot be parsed.
    #[error("invalid value for {key}: {value}")]
    InvalidValue {
        /// The rule key.
        key: String,
        /// The value that failed to parse.
        value: String,
    },

    /// A part this rule engine does not support.
    #[error("unsupported rule part: {key}")]
    UnsupportedPart {
        /// The rule key.
        key: String,
    },
}

impl RecurrenceError {
    /// Creates an invalid part error.
    pub fn invalid_part(part: impl Into<String>) -> Self {
        RecurrenceError::InvalidPart { part: part.into() }
    }

    /// Creates an invalid value error.
    pub fn invalid_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        RecurrenceError::InvalidValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Creates an unsupported part error.
    pub fn unsupported_part(key: impl Into<String>) -> Self {
        RecurrenceError::UnsupportedPart { key: key.into() }
    }
}
