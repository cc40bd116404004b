#![forbid(unsafe_code)]

//! Validation driver
//!
//! The [`Validator`] walks a [`RuleSet`] in order and, for each field:
//!
//! 1. normalizes the rule
//! 2. trims string values when the rule asks for it
//! 3. collapses `""` to `null` in widely-undefined mode
//! 4. reports a missing required field, or applies the default of an
//!    optional one, and moves on
//! 5. resolves the checker for the rule type
//! 6. coerces the value when conversion is enabled
//! 7. runs the checker and records what it reports
//!
//! The target is mutated in place by steps 2, 3, 4 and 6. Use
//! [`Validator::validate_cloned`] to leave the caller's data untouched.

use crate::error::{ConfigError, ValidatorError};
use crate::message::{MessageFormatter, SimpleFormatter, templates};
use crate::rules::coerce::Coercion;
use crate::rules::registry::{CheckContext, CheckerRegistry, RuleCheck};
use crate::rules::{ConvertType, Rule, RuleSet, normalize};
use crate::types::{CheckOutcome, ErrorCode, FieldError};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// Validator-wide switches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorOptions {
    /// Report a root error when the target is neither an object nor an array
    pub validate_root: bool,

    /// Coerce primitive values to each rule type before checking
    pub convert: bool,

    /// Treat empty strings as absent
    pub widely_undefined: bool,
}

/// Validates JSON values against rule sets
///
/// A validator owns its checker registry and message formatter. It is
/// `Send + Sync`, so one instance can serve many threads.
#[derive(Clone)]
pub struct Validator {
    options: ValidatorOptions,
    registry: CheckerRegistry,
    formatter: Arc<dyn MessageFormatter>,
}

impl Validator {
    /// Creates a validator with the built-in types
    pub fn new(options: ValidatorOptions) -> Self {
        Self::with_registry(options, CheckerRegistry::new())
    }

    /// Creates a validator over an existing registry
    pub fn with_registry(options: ValidatorOptions, registry: CheckerRegistry) -> Self {
        Self {
            options,
            registry,
            formatter: Arc::new(SimpleFormatter),
        }
    }

    /// Replaces the message formatter
    pub fn with_formatter(mut self, formatter: impl MessageFormatter + 'static) -> Self {
        self.formatter = Arc::new(formatter);
        self
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.options
    }

    pub fn registry(&self) -> &CheckerRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut CheckerRegistry {
        &mut self.registry
    }

    /// Registers or replaces a type on this validator only
    ///
    /// See [`CheckerRegistry::add_rule`].
    pub fn add_rule(
        &mut self,
        type_name: &str,
        check: impl Into<RuleCheck>,
        override_allowed: bool,
        coercion: Option<ConvertType>,
    ) -> Result<(), ConfigError> {
        self.registry
            .add_rule(type_name, check, override_allowed, coercion)
    }

    pub(crate) fn format_message(&self, template: &str, args: &[String]) -> String {
        self.formatter.format(template, args)
    }

    /// Validates `target` against `rules`, mutating it in place
    ///
    /// Returns `Ok(None)` when the target is valid and `Ok(Some(errors))`
    /// with the errors in rule order otherwise.
    ///
    /// # Errors
    ///
    /// Returns `ValidatorError` when the rule set is unusable: a rule type is
    /// not registered, or an enum rule has no values. Validation stops at
    /// the first such error.
    pub fn validate(
        &self,
        rules: &RuleSet,
        target: &mut Value,
    ) -> Result<Option<Vec<FieldError>>, ValidatorError> {
        if self.options.validate_root && !matches!(target, Value::Object(_) | Value::Array(_)) {
            let message = self.format_message(templates::ROOT_NOT_STRUCTURED, &[]);
            return Ok(Some(vec![FieldError::root(message)]));
        }

        // Arrays and scalars have no fields; writes land in a scratch map
        let mut scratch = Map::new();
        let fields = match target {
            Value::Object(map) => map,
            _ => &mut scratch,
        };

        let mut errors = Vec::new();
        for (key, spec) in rules.iter() {
            let rule = normalize(spec);
            trace!(field = key, rule_type = ?rule.rule_type, "validating field");
            self.validate_field(key, rule, fields, &mut errors)?;
        }

        Ok(if errors.is_empty() { None } else { Some(errors) })
    }

    /// Validates a copy of `target`, leaving the original untouched
    pub fn validate_cloned(
        &self,
        rules: &RuleSet,
        target: &Value,
    ) -> Result<Option<Vec<FieldError>>, ValidatorError> {
        let mut copy = target.clone();
        self.validate(rules, &mut copy)
    }

    fn validate_field(
        &self,
        key: &str,
        mut rule: Rule,
        fields: &mut Map<String, Value>,
        errors: &mut Vec<FieldError>,
    ) -> Result<(), ValidatorError> {
        if rule.trim
            && let Some(Value::String(text)) = fields.get_mut(key)
        {
            let trimmed = text.trim();
            if trimmed.len() != text.len() {
                *text = trimmed.to_string();
            }
        }

        let widely_undefined = rule
            .widely_undefined
            .unwrap_or(self.options.widely_undefined);
        if widely_undefined && matches!(fields.get(key), Some(Value::String(s)) if s.is_empty()) {
            fields.insert(key.to_string(), Value::Null);
        }

        if fields.get(key).is_none_or(Value::is_null) {
            if rule.is_required() {
                let message = self.format_message(templates::REQUIRED, &[key.to_string()]);
                errors.push(FieldError::new(key, message, ErrorCode::MissingField));
            } else if let Some(default) = rule.default.take() {
                fields.insert(key.to_string(), default);
            }
            return Ok(());
        }

        let checker = Arc::clone(self.registry.require(rule.rule_type.as_deref())?);

        self.coerce(&rule, key, fields);

        // The field reads as null to its own checker while it runs
        let mut value = fields.get_mut(key).map(std::mem::take).unwrap_or_default();
        let outcome = {
            let ctx = CheckContext::new(self, fields, key);
            checker.check(&ctx, &mut rule, &mut value)
        };
        fields.insert(key.to_string(), value);

        match outcome? {
            CheckOutcome::Valid => {}
            CheckOutcome::Invalid(message) => {
                errors.push(FieldError::new(key, message, ErrorCode::Invalid));
            }
            CheckOutcome::Nested(nested) => {
                let prefix = if rule.rule_type.as_deref() == Some("object") {
                    format!("{}.", key)
                } else {
                    key.to_string()
                };
                errors.extend(nested.into_iter().map(|e| e.reroot(&prefix)));
            }
        }

        Ok(())
    }

    /// Rewrites a primitive field value with the coercion that applies to
    /// `rule`, if any
    fn coerce(&self, rule: &Rule, key: &str, fields: &mut Map<String, Value>) {
        let coercion = match &rule.convert_type {
            Some(ConvertType::Custom(f)) => Some(Coercion::Custom(Arc::clone(f))),
            Some(ConvertType::Named(name)) => {
                let resolved = self.registry.resolve_coercion(name);
                if resolved.is_none() {
                    debug!(field = key, coercion = %name, "unknown coercion, value left as-is");
                }
                resolved
            }
            None if self.options.convert => rule
                .rule_type
                .as_deref()
                .and_then(|t| self.registry.coercion_for(t))
                .cloned(),
            None => None,
        };

        let Some(coercion) = coercion else {
            return;
        };
        let Some(value) = fields.get(key) else {
            return;
        };
        if value.is_array() || value.is_object() {
            return;
        }

        let converted = coercion.apply(value, fields);
        trace!(field = key, from = %value, to = %converted, "coerced value");
        fields.insert(key.to_string(), converted);
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidatorOptions::default())
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("options", &self.options)
            .field("registry", &self.registry)
            .finish_non_exhaustive()
    }
}
