#![forbid(unsafe_code)]

//! Core domain types for fieldguard
//!
//! This module defines the error record reported for invalid data and the
//! tagged result every checker returns.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Machine-readable classification of a data error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// A required field was absent
    MissingField,
    /// A present value failed its rule
    Invalid,
    /// The validation target itself was not an object
    InvalidRoot,
    /// The target carried a field the rule set does not describe
    OutOfBoundsField,
}

impl ErrorCode {
    /// Returns the wire name of the code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::Invalid => "invalid",
            ErrorCode::InvalidRoot => "invalid_root",
            ErrorCode::OutOfBoundsField => "out_of_bounds_field",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single data error found during validation
///
/// `field` is the dot/bracket path of the offending value (`a.b`,
/// `list[1]`, `list[0].name`). It is `None` only for errors about the
/// target as a whole.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Human-readable message produced by the message formatter
    pub message: String,

    /// Path of the offending field
    pub field: Option<String>,

    /// Error classification
    pub code: ErrorCode,
}

impl FieldError {
    /// Creates an error attached to a field path
    pub fn new(field: impl Into<String>, message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            field: Some(field.into()),
            code,
        }
    }

    /// Creates an error about the whole target
    pub fn root(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            field: None,
            code: ErrorCode::InvalidRoot,
        }
    }

    /// Prefixes the field path with `prefix`
    ///
    /// A root error (no path) takes `prefix` as its whole path.
    pub(crate) fn reroot(mut self, prefix: &str) -> Self {
        self.field = Some(match self.field.take() {
            Some(field) => format!("{}{}", prefix, field),
            None => prefix.to_string(),
        });
        self
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.field {
            Some(field) => write!(f, "{}: {} ({})", field, self.message, self.code),
            None => write!(f, "{} ({})", self.message, self.code),
        }
    }
}

/// Result of running one checker against one value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    /// The value satisfies the rule
    Valid,
    /// The value itself is invalid; the driver attaches the field path
    Invalid(String),
    /// Errors found inside a nested object or array, with paths relative
    /// to the checked value
    Nested(Vec<FieldError>),
}

impl CheckOutcome {
    /// Returns true for [`CheckOutcome::Valid`] and for an empty nested list
    pub fn is_valid(&self) -> bool {
        match self {
            CheckOutcome::Valid => true,
            CheckOutcome::Invalid(_) => false,
            CheckOutcome::Nested(errors) => errors.is_empty(),
        }
    }
}

impl From<Option<String>> for CheckOutcome {
    fn from(message: Option<String>) -> Self {
        match message {
            Some(message) => CheckOutcome::Invalid(message),
            None => CheckOutcome::Valid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_wire_names() {
        assert_eq!(ErrorCode::MissingField.as_str(), "missing_field");
        assert_eq!(
            serde_json::to_string(&ErrorCode::OutOfBoundsField).unwrap(),
            "\"out_of_bounds_field\""
        );
    }

    #[test]
    fn test_field_error_shape() {
        let err = FieldError::new("name", "should be a string", ErrorCode::Invalid);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["field"], "name");
        assert_eq!(json["message"], "should be a string");
        assert_eq!(json["code"], "invalid");

        let root = serde_json::to_value(FieldError::root("not an object")).unwrap();
        assert!(root["field"].is_null());
    }

    #[test]
    fn test_reroot() {
        let err = FieldError::new("b", "bad", ErrorCode::Invalid).reroot("a.");
        assert_eq!(err.field.as_deref(), Some("a.b"));

        let err = FieldError::root("bad").reroot("[2]");
        assert_eq!(err.field.as_deref(), Some("[2]"));
    }

    #[test]
    fn test_outcome_from_option() {
        assert_eq!(CheckOutcome::from(None), CheckOutcome::Valid);
        assert!(!CheckOutcome::from(Some("x".to_string())).is_valid());
        assert!(CheckOutcome::Nested(vec![]).is_valid());
    }

    #[test]
    fn test_display() {
        let err = FieldError::new("a.b", "bad", ErrorCode::Invalid);
        assert_eq!(err.to_string(), "a.b: bad (invalid)");
    }
}
