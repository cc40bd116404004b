#![forbid(unsafe_code)]

//! fieldguard: declarative field validation for JSON-shaped data
//!
//! A [`RuleSet`] maps field names to rules; a [`Validator`] checks a
//! `serde_json::Value` against it and reports every field that breaks its
//! rule, with dotted/bracketed paths into nested objects and arrays.
//!
//! ```
//! use fieldguard::{RuleSet, Validator, ValidatorOptions};
//! use serde_json::json;
//!
//! let rules = RuleSet::from_json(&json!({
//!     "name": "string",
//!     "age": { "type": "int?", "min": 0 },
//!     "tags": { "type": "array", "itemType": "string" }
//! }))?;
//!
//! let validator = Validator::new(ValidatorOptions::default());
//! let mut data = json!({ "name": "ann", "tags": ["a", 1] });
//! let errors = validator.validate(&rules, &mut data)?.unwrap_or_default();
//! assert_eq!(errors[0].field.as_deref(), Some("tags[1]"));
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod message;
pub mod output;
pub mod rules;
pub mod types;

// Re-export error types for convenient access
pub use error::{ConfigError, ValidatorError};

// Re-export the validation API for convenient access
pub use engine::{Guard, GuardError, RuleSource, Validator, ValidatorOptions};
pub use message::{MessageFormatter, SimpleFormatter};
pub use rules::{
    CheckContext, Checker, CheckerRegistry, ConvertType, Pattern, Rule, RuleCheck, RuleSet,
    RuleSpec, normalize,
};
pub use types::{CheckOutcome, ErrorCode, FieldError};
