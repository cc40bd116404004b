#![forbid(unsafe_code)]

//! Guard entry points in front of business logic
//!
//! A [`Guard`] wraps a root-validating [`Validator`] and exposes two modes:
//!
//! - **open**: fields without a rule pass through unchecked
//! - **closed**: once every rule passes, any field without a rule is
//!   rejected
//!
//! Rules come from a [`RuleSource`]: an in-memory rule set, a JSON value, or
//! a rule file.

use crate::engine::validator::{Validator, ValidatorOptions};
use crate::error::{ConfigError, ValidatorError};
use crate::message::templates;
use crate::rules::RuleSet;
use crate::types::{ErrorCode, FieldError};
use serde_json::Value;
use std::borrow::Cow;
use std::path::PathBuf;
use tracing::debug;

/// Field name reported for a field outside the rule set
pub const OUT_OF_BOUNDS_FIELD: &str = "out-of-bounds-field";

/// Where a guard reads its rules from
#[derive(Debug, Clone)]
pub enum RuleSource {
    /// A rule set built in code
    Inline(RuleSet),
    /// A rule set as a JSON object
    Json(Value),
    /// A `.json` or `.toml` rule file
    Path(PathBuf),
}

impl RuleSource {
    /// Resolves the source into a rule set
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or the rules are
    /// malformed.
    pub fn load(&self) -> Result<Cow<'_, RuleSet>, ConfigError> {
        match self {
            RuleSource::Inline(rules) => Ok(Cow::Borrowed(rules)),
            RuleSource::Json(value) => RuleSet::from_json(value).map(Cow::Owned),
            RuleSource::Path(path) => {
                debug!(path = %path.display(), "loading rule file");
                RuleSet::from_path(path).map(Cow::Owned)
            }
        }
    }
}

impl From<RuleSet> for RuleSource {
    fn from(rules: RuleSet) -> Self {
        RuleSource::Inline(rules)
    }
}

impl From<Value> for RuleSource {
    fn from(value: Value) -> Self {
        RuleSource::Json(value)
    }
}

impl From<PathBuf> for RuleSource {
    fn from(path: PathBuf) -> Self {
        RuleSource::Path(path)
    }
}

/// Why a guard rejected its input
#[derive(Debug, thiserror::Error)]
pub enum GuardError {
    /// There was nothing to validate
    #[error("No data to validate")]
    NoData,

    /// The data broke one or more rules
    #[error("Validation failed with {} error(s)", .0.len())]
    Invalid(Vec<FieldError>),

    /// The rules themselves are unusable
    #[error(transparent)]
    Config(#[from] ValidatorError),
}

impl From<ConfigError> for GuardError {
    fn from(err: ConfigError) -> Self {
        GuardError::Config(err.into())
    }
}

impl GuardError {
    /// Returns the data errors, if this is a data rejection
    pub fn field_errors(&self) -> Option<&[FieldError]> {
        match self {
            GuardError::Invalid(errors) => Some(errors),
            _ => None,
        }
    }
}

/// Open/closed validation in front of business logic
#[derive(Debug, Clone)]
pub struct Guard {
    validator: Validator,
}

impl Guard {
    /// Creates a guard whose validator rejects non-object data
    pub fn new() -> Self {
        Self::with_options(ValidatorOptions::default())
    }

    /// Creates a guard with extra validator options
    ///
    /// `validate_root` is always switched on.
    pub fn with_options(options: ValidatorOptions) -> Self {
        Self::with_validator(Validator::new(ValidatorOptions {
            validate_root: true,
            ..options
        }))
    }

    /// Creates a guard around a prepared validator (custom types, formatter)
    pub fn with_validator(validator: Validator) -> Self {
        Self { validator }
    }

    pub fn validator(&self) -> &Validator {
        &self.validator
    }

    pub fn validator_mut(&mut self) -> &mut Validator {
        &mut self.validator
    }

    /// Validates `data`, ignoring fields that have no rule
    ///
    /// # Errors
    ///
    /// - `GuardError::NoData` if `data` is `null`. Other falsy values such as
    ///   `0`, `""` and `false` count as data and fail the root check instead.
    /// - `GuardError::Invalid` with every rule violation
    /// - `GuardError::Config` if the rules cannot be loaded or used
    pub fn check_open(&self, source: &RuleSource, data: &mut Value) -> Result<(), GuardError> {
        self.run(&*source.load()?, data)
    }

    /// Validates `data` and rejects fields that have no rule
    ///
    /// The field check runs only after every rule passes and reports the
    /// first unknown field alone.
    ///
    /// # Errors
    ///
    /// As [`Guard::check_open`], plus `GuardError::Invalid` with one
    /// `out_of_bounds_field` error.
    pub fn check_closed(&self, source: &RuleSource, data: &mut Value) -> Result<(), GuardError> {
        let rules = source.load()?;
        self.run(&rules, data)?;

        if let Value::Object(fields) = data
            && let Some(extra) = fields.keys().find(|key| !rules.contains_key(key))
        {
            let message = self
                .validator
                .format_message(templates::OUT_OF_BOUNDS, &[extra.clone()]);
            return Err(GuardError::Invalid(vec![FieldError::new(
                OUT_OF_BOUNDS_FIELD,
                message,
                ErrorCode::OutOfBoundsField,
            )]));
        }

        Ok(())
    }

    fn run(&self, rules: &RuleSet, data: &mut Value) -> Result<(), GuardError> {
        if data.is_null() {
            return Err(GuardError::NoData);
        }

        match self.validator.validate(rules, data)? {
            Some(errors) => Err(GuardError::Invalid(errors)),
            None => Ok(()),
        }
    }
}

impl Default for Guard {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn source(value: Value) -> RuleSource {
        RuleSource::Json(value)
    }

    #[test]
    fn test_open_mode_ignores_extra_fields() {
        let guard = Guard::new();
        let rules = source(json!({ "a": "string" }));
        assert!(guard.check_open(&rules, &mut json!({ "a": "x", "b": 1 })).is_ok());
    }

    #[test]
    fn test_closed_mode_rejects_extra_fields() {
        let guard = Guard::new();
        let rules = source(json!({ "a": { "type": "string" } }));
        let err = guard
            .check_closed(&rules, &mut json!({ "a": "x", "b": 1 }))
            .unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_deref(), Some(OUT_OF_BOUNDS_FIELD));
        assert_eq!(errors[0].code, ErrorCode::OutOfBoundsField);
        assert!(errors[0].message.ends_with(": b"));

        assert!(guard.check_closed(&rules, &mut json!({ "a": "x" })).is_ok());
    }

    #[test]
    fn test_closed_mode_reports_rule_errors_first() {
        let guard = Guard::new();
        let rules = source(json!({ "a": "string" }));
        let err = guard
            .check_closed(&rules, &mut json!({ "a": 5, "b": 1 }))
            .unwrap_err();
        let errors = err.field_errors().unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field.as_deref(), Some("a"));
        assert_eq!(errors[0].code, ErrorCode::Invalid);
    }

    #[test]
    fn test_closed_mode_keeps_optional_rule_fields() {
        let guard = Guard::new();
        let rules = source(json!({ "a": "string", "b": "int?" }));
        assert!(guard.check_closed(&rules, &mut json!({ "a": "x" })).is_ok());
    }

    #[test]
    fn test_no_data() {
        let guard = Guard::new();
        let rules = source(json!({ "a": "string" }));
        assert!(matches!(
            guard.check_open(&rules, &mut Value::Null),
            Err(GuardError::NoData)
        ));
    }

    #[test]
    fn test_root_must_be_structured() {
        let guard = Guard::new();
        let rules = source(json!({ "a": "string" }));
        let err = guard.check_open(&rules, &mut json!("text")).unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].code, ErrorCode::InvalidRoot);

        let err = guard.check_open(&rules, &mut json!([1])).unwrap_err();
        assert_eq!(err.field_errors().unwrap()[0].code, ErrorCode::MissingField);
    }

    #[test]
    fn test_falsy_scalars_are_data() {
        let guard = Guard::new();
        let rules = source(json!({ "a": "string?" }));
        for mut data in [json!(0), json!(""), json!(false)] {
            let err = guard.check_open(&rules, &mut data).unwrap_err();
            let errors = err.field_errors().unwrap();
            assert_eq!(errors.len(), 1);
            assert_eq!(errors[0].code, ErrorCode::InvalidRoot);
        }
    }

    #[test]
    fn test_config_errors() {
        let guard = Guard::new();
        assert!(matches!(
            guard.check_open(&source(json!(["a"])), &mut json!({})),
            Err(GuardError::Config(_))
        ));
        assert!(matches!(
            guard.check_open(&source(json!({ "a": "uuid" })), &mut json!({ "a": 1 })),
            Err(GuardError::Config(_))
        ));
        let missing = RuleSource::Path(PathBuf::from("/nonexistent/rules.json"));
        assert!(matches!(
            guard.check_open(&missing, &mut json!({})),
            Err(GuardError::Config(ValidatorError::Config(ConfigError::Io(_))))
        ));
    }

    #[test]
    fn test_inline_and_path_sources() {
        let guard = Guard::new();
        let inline = RuleSource::from(RuleSet::new().field("n", "int"));
        assert!(guard.check_open(&inline, &mut json!({ "n": 1 })).is_ok());

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("rules.toml");
        std::fs::write(&path, "n = \"int\"\n").unwrap();
        let from_file = RuleSource::from(path);
        assert!(guard.check_closed(&from_file, &mut json!({ "n": 1 })).is_ok());
        assert!(guard.check_closed(&from_file, &mut json!({ "n": "1" })).is_err());
    }

    #[test]
    fn test_guard_with_convert() {
        let guard = Guard::with_options(ValidatorOptions {
            convert: true,
            ..ValidatorOptions::default()
        });
        assert!(guard.validator().options().validate_root);
        let rules = source(json!({ "n": "int" }));
        let mut data = json!({ "n": "5" });
        assert!(guard.check_open(&rules, &mut data).is_ok());
        assert_eq!(data["n"], 5);
    }
}
