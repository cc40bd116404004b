#![forbid(unsafe_code)]

//! Checker registry
//!
//! The `CheckerRegistry` maps type names to checkers and to the coercion
//! used for that type when a validator converts values. Each validator owns
//! its registry, so registering a type on one validator never affects
//! another. The registry is `Clone`, which doubles as snapshot/restore.

use crate::engine::validator::Validator;
use crate::error::{ConfigError, ValidatorError};
use crate::rules::builtin;
use crate::rules::coerce::{Coercion, CoercionKind};
use crate::rules::rule::{ConvertType, Pattern, Rule, RuleSet};
use crate::types::{CheckOutcome, FieldError};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Everything a checker can see besides its rule and value
pub struct CheckContext<'a> {
    validator: &'a Validator,
    target: &'a Map<String, Value>,
    field: &'a str,
}

impl<'a> CheckContext<'a> {
    pub(crate) fn new(
        validator: &'a Validator,
        target: &'a Map<String, Value>,
        field: &'a str,
    ) -> Self {
        Self {
            validator,
            target,
            field,
        }
    }

    /// Returns the same context with a different sibling view
    pub(crate) fn with_target<'b>(&self, target: &'b Map<String, Value>) -> CheckContext<'b>
    where
        'a: 'b,
    {
        CheckContext {
            validator: self.validator,
            target,
            field: self.field,
        }
    }

    /// The validator running this check
    pub fn validator(&self) -> &'a Validator {
        self.validator
    }

    /// Sibling fields of the value being checked
    ///
    /// The checked field itself reads as `null` while its checker runs.
    pub fn target(&self) -> &'a Map<String, Value> {
        self.target
    }

    /// Name of the field being checked (the array field for array items)
    pub fn field(&self) -> &'a str {
        self.field
    }

    /// Registry of the running validator
    pub fn registry(&self) -> &'a CheckerRegistry {
        self.validator.registry()
    }

    /// Formats a message through the validator's message formatter
    pub fn message(&self, template: &str, args: &[String]) -> String {
        self.validator.format_message(template, args)
    }

    /// Validates a nested value against a nested rule set
    pub fn validate(
        &self,
        rules: &RuleSet,
        value: &mut Value,
    ) -> Result<Option<Vec<FieldError>>, ValidatorError> {
        self.validator.validate(rules, value)
    }
}

/// Trait implemented by every type checker
///
/// A checker may rewrite its own `rule` (it receives a private copy) and the
/// value it checks. The trait is `Send + Sync` so validators can be shared
/// across threads.
pub trait Checker: Send + Sync {
    /// Checks `value` against `rule`
    ///
    /// Data problems are reported through the returned [`CheckOutcome`];
    /// `Err` is reserved for configuration errors and aborts validation.
    fn check(
        &self,
        ctx: &CheckContext<'_>,
        rule: &mut Rule,
        value: &mut Value,
    ) -> Result<CheckOutcome, ValidatorError>;
}

impl<F> Checker for F
where
    F: Fn(&CheckContext<'_>, &mut Rule, &mut Value) -> Result<CheckOutcome, ValidatorError>
        + Send
        + Sync,
{
    fn check(
        &self,
        ctx: &CheckContext<'_>,
        rule: &mut Rule,
        value: &mut Value,
    ) -> Result<CheckOutcome, ValidatorError> {
        self(ctx, rule, value)
    }
}

/// What `add_rule` registers for a type
#[derive(Clone)]
pub enum RuleCheck {
    /// A checker implementation
    Checker(Arc<dyn Checker>),
    /// A pattern, wrapped into a string-format checker
    Pattern(Pattern),
}

impl RuleCheck {
    /// Wraps any checker
    pub fn checker<C: Checker + 'static>(checker: C) -> Self {
        RuleCheck::Checker(Arc::new(checker))
    }
}

impl From<Pattern> for RuleCheck {
    fn from(pattern: Pattern) -> Self {
        RuleCheck::Pattern(pattern)
    }
}

impl From<Regex> for RuleCheck {
    fn from(regex: Regex) -> Self {
        RuleCheck::Pattern(regex.into())
    }
}

impl fmt::Debug for RuleCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleCheck::Checker(_) => f.write_str("Checker(<dyn Checker>)"),
            RuleCheck::Pattern(pattern) => f.debug_tuple("Pattern").field(pattern).finish(),
        }
    }
}

/// Registry of checkers and per-type coercions
#[derive(Clone)]
pub struct CheckerRegistry {
    checkers: HashMap<String, Arc<dyn Checker>>,
    coercions: HashMap<String, Coercion>,
}

impl CheckerRegistry {
    /// Creates a registry populated with the built-in types
    pub fn new() -> Self {
        let mut registry = Self::empty();
        builtin::register_builtin_checkers(&mut registry);
        registry
    }

    /// Creates a registry with no types at all
    pub fn empty() -> Self {
        Self {
            checkers: HashMap::new(),
            coercions: HashMap::new(),
        }
    }

    /// Inserts a checker, replacing any previous one
    pub(crate) fn register(&mut self, type_name: &str, checker: Arc<dyn Checker>) {
        self.checkers.insert(type_name.to_string(), checker);
    }

    /// Sets the coercion used for `type_name` when converting
    pub(crate) fn register_coercion(&mut self, type_name: &str, coercion: Coercion) {
        self.coercions.insert(type_name.to_string(), coercion);
    }

    /// Registers or replaces a type
    ///
    /// A [`RuleCheck::Pattern`] becomes a checker that accepts strings
    /// matching the pattern. `coercion` sets the conversion used for the
    /// type: a built-in name, the name of another type whose coercion is
    /// reused, or a custom function.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `type_name` is empty
    /// - the type exists and `override_allowed` is false
    /// - `coercion` names neither a built-in nor a registered coercion
    pub fn add_rule(
        &mut self,
        type_name: &str,
        check: impl Into<RuleCheck>,
        override_allowed: bool,
        coercion: Option<ConvertType>,
    ) -> Result<(), ConfigError> {
        if type_name.is_empty() {
            return Err(ConfigError::MissingType);
        }

        if !override_allowed && self.checkers.contains_key(type_name) {
            return Err(ConfigError::DuplicateType(type_name.to_string()));
        }

        if let Some(convert) = coercion {
            let coercion = match convert {
                ConvertType::Custom(f) => Coercion::Custom(f),
                ConvertType::Named(name) => self.resolve_coercion(&name).ok_or_else(|| {
                    ConfigError::InvalidDefinition(format!(
                        "Unknown coercion '{}' for type '{}'",
                        name, type_name
                    ))
                })?,
            };
            self.register_coercion(type_name, coercion);
        }

        let checker: Arc<dyn Checker> = match check.into() {
            RuleCheck::Checker(checker) => checker,
            RuleCheck::Pattern(pattern) => Arc::new(builtin::pattern_checker(pattern)),
        };

        debug!(type_name, "registered checker");
        self.register(type_name, checker);
        Ok(())
    }

    /// Looks up the checker for a type
    pub fn get(&self, type_name: &str) -> Option<&Arc<dyn Checker>> {
        self.checkers.get(type_name)
    }

    /// Looks up the checker for a type, failing with a configuration error
    pub fn require(&self, type_name: Option<&str>) -> Result<&Arc<dyn Checker>, ConfigError> {
        type_name
            .and_then(|name| self.checkers.get(name))
            .ok_or_else(|| ConfigError::UnknownType {
                type_name: type_name.unwrap_or("<none>").to_string(),
                known: self.type_names().join(", "),
            })
    }

    /// Returns true if `type_name` is registered
    pub fn contains(&self, type_name: &str) -> bool {
        self.checkers.contains_key(type_name)
    }

    /// Coercion used for `type_name` when the validator converts values
    pub fn coercion_for(&self, type_name: &str) -> Option<&Coercion> {
        self.coercions.get(type_name)
    }

    /// Resolves a coercion name: a built-in first, then a type's coercion
    pub fn resolve_coercion(&self, name: &str) -> Option<Coercion> {
        CoercionKind::from_name(name)
            .map(Coercion::Builtin)
            .or_else(|| self.coercions.get(name).cloned())
    }

    /// Registered type names, sorted
    pub fn type_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.checkers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }
}

impl Default for CheckerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CheckerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CheckerRegistry")
            .field("types", &self.type_names())
            .field("coercions", &self.coercions.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn always_valid(
        _ctx: &CheckContext<'_>,
        _rule: &mut Rule,
        _value: &mut Value,
    ) -> Result<CheckOutcome, ValidatorError> {
        Ok(CheckOutcome::Valid)
    }

    #[test]
    fn test_new_registry_has_builtins() {
        let registry = CheckerRegistry::new();
        for name in [
            "number", "int", "integer", "string", "id", "date", "dateTime", "datetime",
            "boolean", "bool", "array", "object", "enum", "email", "password", "url",
        ] {
            assert!(registry.contains(name), "missing builtin {}", name);
        }
        assert_eq!(registry.len(), 16);
    }

    #[test]
    fn test_empty_registry() {
        let registry = CheckerRegistry::empty();
        assert!(registry.is_empty());
        assert!(registry.get("string").is_none());
    }

    #[test]
    fn test_builtin_coercions() {
        let registry = CheckerRegistry::new();
        assert!(matches!(
            registry.coercion_for("integer"),
            Some(Coercion::Builtin(CoercionKind::Int))
        ));
        assert!(matches!(
            registry.coercion_for("email"),
            Some(Coercion::Builtin(CoercionKind::String))
        ));
        assert!(registry.coercion_for("array").is_none());
        assert!(registry.coercion_for("enum").is_none());
    }

    #[test]
    fn test_add_rule_requires_name() {
        let mut registry = CheckerRegistry::new();
        let result = registry.add_rule("", RuleCheck::checker(always_valid), true, None);
        assert!(matches!(result, Err(ConfigError::MissingType)));
    }

    #[test]
    fn test_add_rule_override_permission() {
        let mut registry = CheckerRegistry::new();
        let result = registry.add_rule("email", RuleCheck::checker(always_valid), false, None);
        assert!(matches!(result, Err(ConfigError::DuplicateType(name)) if name == "email"));

        assert!(
            registry
                .add_rule("email", RuleCheck::checker(always_valid), true, None)
                .is_ok()
        );
        assert!(
            registry
                .add_rule("slug", RuleCheck::checker(always_valid), false, None)
                .is_ok()
        );
    }

    #[test]
    fn test_add_rule_coercions() {
        let mut registry = CheckerRegistry::new();
        registry
            .add_rule(
                "age",
                RuleCheck::checker(always_valid),
                true,
                Some(ConvertType::from("int")),
            )
            .unwrap();
        assert!(matches!(
            registry.coercion_for("age"),
            Some(Coercion::Builtin(CoercionKind::Int))
        ));

        // reuse another type's coercion by name
        registry
            .add_rule("years", RuleCheck::checker(always_valid), true, Some("age".into()))
            .unwrap();
        assert!(registry.coercion_for("years").is_some());

        let result = registry.add_rule(
            "bad",
            RuleCheck::checker(always_valid),
            true,
            Some("no-such-coercion".into()),
        );
        assert!(matches!(result, Err(ConfigError::InvalidDefinition(_))));
        assert!(!registry.contains("bad"));
    }

    #[test]
    fn test_add_custom_coercion_function() {
        let mut registry = CheckerRegistry::new();
        registry
            .add_rule(
                "upper",
                RuleCheck::checker(always_valid),
                true,
                Some(ConvertType::custom(|value, _target| {
                    json!(value.as_str().unwrap_or_default().to_uppercase())
                })),
            )
            .unwrap();
        let coercion = registry.resolve_coercion("upper").unwrap();
        assert_eq!(coercion.apply(&json!("ab"), &Map::new()), json!("AB"));
    }

    #[test]
    fn test_require_unknown_type() {
        let registry = CheckerRegistry::new();
        let err = registry.require(Some("uuid")).err().unwrap();
        match err {
            ConfigError::UnknownType { type_name, known } => {
                assert_eq!(type_name, "uuid");
                assert!(known.contains("string"));
            }
            other => panic!("Expected UnknownType, got {:?}", other),
        }
        assert!(registry.require(None).is_err());
        assert!(registry.require(Some("int")).is_ok());
    }

    #[test]
    fn test_registry_clone_is_a_snapshot() {
        let mut registry = CheckerRegistry::new();
        let snapshot = registry.clone();
        registry
            .add_rule("slug", RuleCheck::checker(always_valid), true, None)
            .unwrap();
        assert!(registry.contains("slug"));
        assert!(!snapshot.contains("slug"));
    }

    #[test]
    fn test_type_names_sorted() {
        let registry = CheckerRegistry::new();
        let names = registry.type_names();
        let mut sorted = names.clone();
        sorted.sort_unstable();
        assert_eq!(names, sorted);
    }
}
