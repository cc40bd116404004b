#![forbid(unsafe_code)]

//! Loading rule sets from JSON and TOML
//!
//! Rule files use the same shapes as the in-memory API:
//!
//! ```json
//! {
//!   "name": "string",
//!   "age": { "type": "int?", "min": 0, "max": 150 },
//!   "role": ["admin", "member"],
//!   "code": "/^[A-Z]{3}$/",
//!   "tags": { "type": "array", "itemType": "string", "rule": { "type": "string", "max": 10 } }
//! }
//! ```
//!
//! Keys are accepted in camelCase (`allowEmpty`, `itemType`) or snake_case.

use crate::error::ConfigError;
use crate::rules::rule::{ConvertType, Pattern, Rule, RuleSet, RuleSpec, OPTIONAL_MARKER};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::debug;

/// Serde shape of a rule record in a rule file
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleDefinition {
    #[serde(rename = "type")]
    rule_type: Option<String>,
    required: Option<bool>,
    #[serde(alias = "allow_empty")]
    allow_empty: Option<bool>,
    empty: Option<bool>,
    #[serde(default)]
    trim: bool,
    min: Option<f64>,
    max: Option<f64>,
    values: Option<Value>,
    format: Option<String>,
    #[serde(alias = "item_type")]
    item_type: Option<String>,
    rule: Option<Value>,
    compare: Option<String>,
    default: Option<Value>,
    message: Option<String>,
    #[serde(alias = "convert_type")]
    convert_type: Option<String>,
    #[serde(alias = "widely_undefined")]
    widely_undefined: Option<bool>,
}

impl RuleDefinition {
    /// True when the nested `rule` key describes array items rather than a
    /// nested schema
    fn rule_describes_items(&self) -> bool {
        let base_type = self
            .rule_type
            .as_deref()
            .map(|t| t.trim_end_matches(OPTIONAL_MARKER));
        base_type == Some("array") && self.item_type.as_deref().is_some_and(|t| t != "object")
    }

    fn into_rule(self, field: &str) -> Result<Rule, ConfigError> {
        let describes_items = self.rule_describes_items();
        let format = self
            .format
            .as_deref()
            .map(Pattern::from_rule_str)
            .transpose()?;

        let values = match self.values {
            Some(Value::Array(values)) => Some(values),
            Some(other) => {
                // Enum rules without a list fail when they are checked
                debug!(field, ?other, "ignoring non-array `values`");
                None
            }
            None => None,
        };

        let (schema, item_rule) = match &self.rule {
            None => (None, None),
            Some(nested) if describes_items => {
                let spec = spec_from_json(&format!("{}[]", field), nested)?;
                (None, Some(Box::new(crate::rules::normalize(&spec))))
            }
            Some(nested) => (Some(rule_set_from_json(nested, Some(field))?), None),
        };

        Ok(Rule {
            rule_type: self.rule_type,
            required: self.required,
            allow_empty: self.allow_empty,
            empty: self.empty,
            trim: self.trim,
            min: self.min,
            max: self.max,
            values,
            format,
            item_type: self.item_type,
            rule: schema,
            item_rule,
            compare: self.compare,
            default: self.default,
            message: self.message,
            convert_type: self.convert_type.map(ConvertType::Named),
            widely_undefined: self.widely_undefined,
        })
    }
}

/// Parses one rule in any of its spellings
fn spec_from_json(field: &str, value: &Value) -> Result<RuleSpec, ConfigError> {
    match value {
        Value::String(text) => match Pattern::parse_literal(text) {
            Some(pattern) => Ok(RuleSpec::Pattern(pattern?)),
            None => Ok(RuleSpec::TypeName(text.clone())),
        },
        Value::Array(values) => Ok(RuleSpec::Enum(values.clone())),
        Value::Object(_) => {
            let definition = RuleDefinition::deserialize(value).map_err(|e| {
                ConfigError::InvalidDefinition(format!("Rule for '{}': {}", field, e))
            })?;
            Ok(RuleSpec::Record(definition.into_rule(field)?))
        }
        // Unrecognized shapes become an untyped record, rejected when used
        _ => Ok(RuleSpec::Record(Rule::default())),
    }
}

fn rule_set_from_json(value: &Value, parent: Option<&str>) -> Result<RuleSet, ConfigError> {
    let Value::Object(map) = value else {
        return Err(ConfigError::InvalidDefinition(match parent {
            Some(parent) => format!("Nested rule set for '{}' must be an object", parent),
            None => "Rule set must be an object".to_string(),
        }));
    };

    let mut rules = RuleSet::new();
    for (name, rule) in map {
        let path = match parent {
            Some(parent) => format!("{}.{}", parent, name),
            None => name.clone(),
        };
        rules.insert(name.clone(), spec_from_json(&path, rule)?);
    }
    Ok(rules)
}

impl RuleSet {
    /// Builds a rule set from a JSON object
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the value is not an object, a rule record is
    /// malformed, or a pattern does not compile.
    pub fn from_json(value: &Value) -> Result<Self, ConfigError> {
        rule_set_from_json(value, None)
    }

    /// Parses a rule set from JSON text
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(content)?;
        Self::from_json(&value)
    }

    /// Parses a rule set from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let table: toml::Table = toml::from_str(content)?;
        let value = serde_json::to_value(table)?;
        Self::from_json(&value)
    }

    /// Loads a rule set from a `.json` or `.toml` file
    ///
    /// Files without a `.toml` extension are read as JSON.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&content),
            _ => Self::from_json_str(&content),
        }
    }
}
