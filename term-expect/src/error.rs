//! Error types for the term-expect library.
//!
//! All errors are represented by the [`TermError`] enum, derived with
//! `thiserror`. Errors fall into two families that the dispatcher treats
//! differently:
//!
//! - **Caller faults** describe a misconfigured call (an out-of-range `mostly`,
//!   an unknown result format, an unexpected argument). They always propagate,
//!   even when `catch_exceptions` is set.
//! - **Computation faults** are raised while evaluating an expectation against
//!   data. They propagate unless the caller opted into fault capture, in which
//!   case they become part of the returned result.

use thiserror::Error;

/// The main error type for the term-expect library.
#[derive(Error, Debug)]
pub enum TermError {
    /// The `mostly` threshold was outside `[0, 1]` or not a number.
    #[error("Invalid mostly threshold: {0} (must be a number between 0.0 and 1.0)")]
    InvalidMostly(String),

    /// A result format tier name that is not one of the known tiers.
    #[error("Unknown result format '{0}'")]
    UnknownResultFormat(String),

    /// A `result_format` value with the wrong shape.
    #[error("Invalid result format: {0}")]
    InvalidResultFormat(String),

    /// An argument was supplied that the expectation does not declare, or had the wrong type.
    #[error("Invalid argument for '{expectation}': {message}")]
    InvalidArgument {
        /// Name of the expectation being invoked
        expectation: String,
        /// Detailed error message
        message: String,
    },

    /// A required argument was not supplied.
    #[error("Missing required argument '{argument}' for '{expectation}'")]
    MissingArgument {
        /// Name of the expectation being invoked
        expectation: String,
        /// Name of the missing argument
        argument: String,
    },

    /// No expectation is registered under the requested name.
    #[error("Unknown expectation '{0}'")]
    UnknownExpectation(String),

    /// Error related to configuration or registration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Error when a required column is not found in the dataset.
    #[error("Column '{column}' not found in dataset")]
    ColumnNotFound { column: String },

    /// Error when data types don't match expected types.
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// A fault raised by a predicate or aggregate body.
    ///
    /// `kind` names the fault class and appears on the last line of a captured
    /// traceback, e.g. `ValueError: Gotcha!`.
    #[error("{message}")]
    Computation {
        /// Short name of the fault class
        kind: String,
        /// Human-readable error message
        message: String,
        /// Optional underlying error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Error from Arrow operations.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Error from serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic internal error for unexpected conditions.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// A type alias for `Result<T, TermError>`.
pub type Result<T> = std::result::Result<T, TermError>;

impl TermError {
    /// Creates a computation fault with the given kind and message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use term_expect::error::TermError;
    ///
    /// let err = TermError::computation("ValueError", "Gotcha!");
    /// assert_eq!(err.kind(), "ValueError");
    /// assert_eq!(err.to_string(), "Gotcha!");
    /// ```
    pub fn computation(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Computation {
            kind: kind.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Creates a computation fault wrapping an underlying error.
    pub fn computation_with_source(
        kind: impl Into<String>,
        message: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Computation {
            kind: kind.into(),
            message: message.into(),
            source: Some(source),
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(expectation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            expectation: expectation.into(),
            message: message.into(),
        }
    }

    /// Creates a missing argument error.
    pub fn missing_argument(expectation: impl Into<String>, argument: impl Into<String>) -> Self {
        Self::MissingArgument {
            expectation: expectation.into(),
            argument: argument.into(),
        }
    }

    /// Returns true if this error describes a misconfigured call rather than
    /// a failure while evaluating data. Caller faults are never captured.
    pub fn is_caller_fault(&self) -> bool {
        matches!(
            self,
            TermError::InvalidMostly(_)
                | TermError::UnknownResultFormat(_)
                | TermError::InvalidResultFormat(_)
                | TermError::InvalidArgument { .. }
                | TermError::MissingArgument { .. }
                | TermError::UnknownExpectation(_)
                | TermError::Configuration(_)
        )
    }

    /// Returns the fault class name used in captured tracebacks.
    pub fn kind(&self) -> &str {
        match self {
            TermError::InvalidMostly(_) => "InvalidMostly",
            TermError::UnknownResultFormat(_) => "UnknownResultFormat",
            TermError::InvalidResultFormat(_) => "InvalidResultFormat",
            TermError::InvalidArgument { .. } => "InvalidArgument",
            TermError::MissingArgument { .. } => "MissingArgument",
            TermError::UnknownExpectation(_) => "UnknownExpectation",
            TermError::Configuration(_) => "ConfigurationError",
            TermError::ColumnNotFound { .. } => "ColumnNotFound",
            TermError::TypeMismatch { .. } => "TypeMismatch",
            TermError::Computation { kind, .. } => kind,
            TermError::Arrow(_) => "ArrowError",
            TermError::Serialization(_) => "SerializationError",
            TermError::Internal(_) => "InternalError",
        }
    }
}

impl From<serde_json::Error> for TermError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_computation_error() {
        let err = TermError::computation("ZeroDivisionError", "division by zero");
        assert_eq!(err.to_string(), "division by zero");
        assert_eq!(err.kind(), "ZeroDivisionError");
        assert!(!err.is_caller_fault());
    }

    #[test]
    fn test_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "lookup table missing");
        let err = TermError::computation_with_source(
            "LookupError",
            "Could not resolve reference values",
            Box::new(source),
        );

        assert!(err.source().is_some());
    }

    #[test]
    fn test_caller_faults() {
        assert!(TermError::InvalidMostly("1.5".to_string()).is_caller_fault());
        assert!(TermError::UnknownResultFormat("VERBOSE".to_string()).is_caller_fault());
        assert!(TermError::invalid_argument("expect_x", "unexpected argument 'y'").is_caller_fault());
        assert!(!TermError::ColumnNotFound {
            column: "a".to_string()
        }
        .is_caller_fault());
    }

    #[test]
    fn test_column_not_found() {
        let err = TermError::ColumnNotFound {
            column: "user_id".to_string(),
        };
        assert_eq!(err.to_string(), "Column 'user_id' not found in dataset");
        assert_eq!(err.kind(), "ColumnNotFound");
    }

    #[test]
    fn test_type_mismatch() {
        let err = TermError::TypeMismatch {
            expected: "numeric".to_string(),
            found: "Utf8".to_string(),
        };
        assert_eq!(err.to_string(), "Type mismatch: expected numeric, found Utf8");
    }
}
