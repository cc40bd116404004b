//! Error types for fieldguard
//!
//! Configuration errors (a bad rule set, an unknown type, a malformed
//! registration) are returned as `Err` and abort the whole validation call.
//! Data errors are never represented here: they are collected as
//! [`FieldError`](crate::types::FieldError) values in the validation outcome.

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A rule names a type the registry does not know
    #[error("Rule type must be one of {known}, but got: {type_name}")]
    UnknownType { type_name: String, known: String },

    /// `add_rule` was called without a type name
    #[error("Missing rule type name")]
    MissingType,

    /// `add_rule` tried to replace an existing type without permission
    #[error("Rule type `{0}` already exists")]
    DuplicateType(String),

    /// An enum rule without a `values` list
    #[error("Enum rule for {0} requires an array of values")]
    InvalidEnum(String),

    /// A pattern that does not compile
    #[error("Invalid regex pattern: {0}")]
    InvalidPattern(String),

    /// A rule definition with an unusable shape
    #[error("Invalid rule definition: {0}")]
    InvalidDefinition(String),

    /// Rule or configuration file could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O error while reading a rule or configuration file
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration value failed validation after parsing
    #[error("Validation error: {0}")]
    Validation(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err.to_string())
    }
}

/// Top-level error type returned by validation entry points
#[derive(Debug, thiserror::Error)]
pub enum ValidatorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}
