#![forbid(unsafe_code)]

//! Rule records, rule shorthands and rule sets
//!
//! A [`RuleSet`] maps field names to [`RuleSpec`]s. A spec is either a full
//! [`Rule`] record or one of the shorthands (bare type name, enum value
//! list, pattern); [`normalize`] turns any of them into a canonical `Rule`.

use crate::error::ConfigError;
use regex::{Regex, RegexBuilder};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;

/// Suffix on a type name marking the field as optional
pub const OPTIONAL_MARKER: char = '?';

/// A compiled string pattern used by `format` and pattern shorthands
///
/// Patterns keep the text they were written as so messages can show it.
/// Rule files may spell a pattern as a JavaScript-style literal such as
/// `/^\d+$/i`; the `i`, `m` and `s` flags map to regex flags and the
/// remaining JavaScript flags are accepted and ignored.
#[derive(Clone)]
pub struct Pattern {
    regex: Regex,
    display: String,
}

impl Pattern {
    /// Compiles a plain regular expression
    pub fn new(pattern: &str) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|e| {
            ConfigError::InvalidPattern(format!("Failed to compile pattern '{}': {}", pattern, e))
        })?;
        Ok(Self {
            display: format!("/{}/", pattern),
            regex,
        })
    }

    /// Parses a `/source/flags` literal
    ///
    /// Returns `None` when `literal` is not shaped like a pattern literal, so
    /// callers can fall back to treating the text as something else.
    pub fn parse_literal(literal: &str) -> Option<Result<Self, ConfigError>> {
        let body = literal.strip_prefix('/')?;
        let end = body.rfind('/')?;
        let (source, flags) = (&body[..end], &body[end + 1..]);
        if source.is_empty() || !flags.chars().all(|c| "gimsuy".contains(c)) {
            return None;
        }

        let regex = RegexBuilder::new(source)
            .case_insensitive(flags.contains('i'))
            .multi_line(flags.contains('m'))
            .dot_matches_new_line(flags.contains('s'))
            .build()
            .map_err(|e| {
                ConfigError::InvalidPattern(format!(
                    "Failed to compile pattern '{}': {}",
                    literal, e
                ))
            });

        Some(regex.map(|regex| Self {
            regex,
            display: literal.to_string(),
        }))
    }

    /// Parses the value of a `format` key: a literal if it looks like one,
    /// otherwise a plain regular expression
    pub fn from_rule_str(text: &str) -> Result<Self, ConfigError> {
        match Self::parse_literal(text) {
            Some(result) => result,
            None => Self::new(text),
        }
    }

    /// Returns true if `text` matches the pattern
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Returns the pattern as it was written
    pub fn as_str(&self) -> &str {
        &self.display
    }
}

impl From<Regex> for Pattern {
    fn from(regex: Regex) -> Self {
        Self {
            display: format!("/{}/", regex.as_str()),
            regex,
        }
    }
}

impl fmt::Debug for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pattern").field(&self.display).finish()
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl PartialEq for Pattern {
    fn eq(&self, other: &Self) -> bool {
        self.display == other.display
    }
}

/// A caller-supplied coercion: receives the field value and the sibling
/// fields of the target, returns the replacement value
pub type CoerceFn = Arc<dyn Fn(&Value, &Map<String, Value>) -> Value + Send + Sync>;

/// Coercion requested by a rule's `convert_type`
#[derive(Clone)]
pub enum ConvertType {
    /// A built-in coercion (`string`, `int`, `number`, `bool`) or the name of
    /// a type whose registered coercion should be used
    Named(String),
    /// An inline coercion function
    Custom(CoerceFn),
}

impl ConvertType {
    /// Wraps a closure as an inline coercion
    pub fn custom<F>(f: F) -> Self
    where
        F: Fn(&Value, &Map<String, Value>) -> Value + Send + Sync + 'static,
    {
        ConvertType::Custom(Arc::new(f))
    }
}

impl fmt::Debug for ConvertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertType::Named(name) => f.debug_tuple("Named").field(name).finish(),
            ConvertType::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

impl From<&str> for ConvertType {
    fn from(name: &str) -> Self {
        ConvertType::Named(name.to_string())
    }
}

/// Canonical constraint on one field
///
/// Which attributes matter depends on `rule_type`; checkers ignore the
/// rest. `min`/`max` bound numeric values for number types and lengths for
/// strings and arrays.
#[derive(Debug, Clone, Default)]
pub struct Rule {
    /// Registry key of the checker, `None` for an unrecognized rule shape
    pub rule_type: Option<String>,

    /// Whether the field must be present (`None` means required)
    pub required: Option<bool>,

    /// Whether an empty string is accepted
    pub allow_empty: Option<bool>,

    /// Legacy spelling of `allow_empty`, consulted when it is unset
    pub empty: Option<bool>,

    /// Trim string values in place before checking
    pub trim: bool,

    /// Inclusive lower bound (value or length)
    pub min: Option<f64>,

    /// Inclusive upper bound (value or length)
    pub max: Option<f64>,

    /// Allowed values of an enum rule
    pub values: Option<Vec<Value>>,

    /// Pattern a string value must match
    pub format: Option<Pattern>,

    /// Type of each element of an array rule
    pub item_type: Option<String>,

    /// Nested schema for object values and arrays of objects
    pub rule: Option<RuleSet>,

    /// Rule applied to each element of an array of non-object items
    pub item_rule: Option<Box<Rule>>,

    /// Sibling field a password must equal
    pub compare: Option<String>,

    /// Value stored when an optional field is absent
    pub default: Option<Value>,

    /// Replacement for the pattern-mismatch message
    pub message: Option<String>,

    /// Coercion overriding the validator-wide default
    pub convert_type: Option<ConvertType>,

    /// Per-rule override of the validator's widely-undefined setting
    pub widely_undefined: Option<bool>,
}

impl Rule {
    /// Creates a rule of the given type
    pub fn new(rule_type: impl Into<String>) -> Self {
        Self {
            rule_type: Some(rule_type.into()),
            ..Self::default()
        }
    }

    /// Returns true unless the rule was explicitly made optional
    pub fn is_required(&self) -> bool {
        self.required != Some(false)
    }

    pub fn optional(mut self) -> Self {
        self.required = Some(false);
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = Some(required);
        self
    }

    pub fn allow_empty(mut self, allow: bool) -> Self {
        self.allow_empty = Some(allow);
        self
    }

    pub fn trim(mut self) -> Self {
        self.trim = true;
        self
    }

    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    pub fn values(mut self, values: Vec<Value>) -> Self {
        self.values = Some(values);
        self
    }

    pub fn format(mut self, pattern: Pattern) -> Self {
        self.format = Some(pattern);
        self
    }

    pub fn item_type(mut self, item_type: impl Into<String>) -> Self {
        self.item_type = Some(item_type.into());
        self
    }

    /// Sets the nested schema used by object rules and arrays of objects
    pub fn schema(mut self, rules: RuleSet) -> Self {
        self.rule = Some(rules);
        self
    }

    pub fn item_rule(mut self, rule: Rule) -> Self {
        self.item_rule = Some(Box::new(rule));
        self
    }

    pub fn compare(mut self, field: impl Into<String>) -> Self {
        self.compare = Some(field.into());
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn convert_type(mut self, convert: ConvertType) -> Self {
        self.convert_type = Some(convert);
        self
    }

    pub fn widely_undefined(mut self, widely: bool) -> Self {
        self.widely_undefined = Some(widely);
        self
    }
}

/// The ways a rule can be written
#[derive(Debug, Clone)]
pub enum RuleSpec {
    /// A full rule record
    Record(Rule),
    /// Bare type name, e.g. `"string"` or `"int?"`
    TypeName(String),
    /// List of allowed values
    Enum(Vec<Value>),
    /// String that must match a pattern
    Pattern(Pattern),
}

impl From<Rule> for RuleSpec {
    fn from(rule: Rule) -> Self {
        RuleSpec::Record(rule)
    }
}

impl From<&str> for RuleSpec {
    fn from(type_name: &str) -> Self {
        RuleSpec::TypeName(type_name.to_string())
    }
}

impl From<String> for RuleSpec {
    fn from(type_name: String) -> Self {
        RuleSpec::TypeName(type_name)
    }
}

impl From<Vec<Value>> for RuleSpec {
    fn from(values: Vec<Value>) -> Self {
        RuleSpec::Enum(values)
    }
}

impl From<Pattern> for RuleSpec {
    fn from(pattern: Pattern) -> Self {
        RuleSpec::Pattern(pattern)
    }
}

impl From<Regex> for RuleSpec {
    fn from(regex: Regex) -> Self {
        RuleSpec::Pattern(regex.into())
    }
}

/// Converts any rule spelling into a canonical record
///
/// Never fails: a record without a type stays without one and is rejected
/// later as an unknown type.
pub fn normalize(spec: &RuleSpec) -> Rule {
    let mut rule = match spec {
        RuleSpec::Record(rule) => rule.clone(),
        RuleSpec::TypeName(type_name) => Rule::new(type_name.as_str()),
        RuleSpec::Enum(values) => Rule::new("enum").values(values.clone()),
        RuleSpec::Pattern(pattern) => Rule::new("string").format(pattern.clone()),
    };

    if let Some(type_name) = rule.rule_type.as_deref()
        && let Some(stripped) = type_name.strip_suffix(OPTIONAL_MARKER)
    {
        rule.rule_type = Some(stripped.to_string());
        rule.required = Some(false);
    }

    rule
}

/// Ordered mapping from field name to rule
///
/// Iteration follows insertion order, which fixes the order errors are
/// reported in.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    entries: Vec<(String, RuleSpec)>,
}

impl RuleSet {
    /// Creates an empty rule set
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a field rule, builder style
    pub fn field(mut self, name: impl Into<String>, spec: impl Into<RuleSpec>) -> Self {
        self.insert(name, spec);
        self
    }

    /// Inserts or replaces the rule for `name`
    ///
    /// A replaced field keeps its original position.
    pub fn insert(&mut self, name: impl Into<String>, spec: impl Into<RuleSpec>) {
        let name = name.into();
        let spec = spec.into();
        match self.entries.iter_mut().find(|(key, _)| *key == name) {
            Some(entry) => entry.1 = spec,
            None => self.entries.push((name, spec)),
        }
    }

    /// Returns the rule for `name`
    pub fn get(&self, name: &str) -> Option<&RuleSpec> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, spec)| spec)
    }

    /// Returns true if the set has a rule for `name`
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Iterates over field names and rules in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &RuleSpec)> {
        self.entries.iter().map(|(key, spec)| (key.as_str(), spec))
    }

    /// Iterates over field names in insertion order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K, S> FromIterator<(K, S)> for RuleSet
where
    K: Into<String>,
    S: Into<RuleSpec>,
{
    fn from_iter<I: IntoIterator<Item = (K, S)>>(iter: I) -> Self {
        let mut rules = RuleSet::new();
        for (name, spec) in iter {
            rules.insert(name, spec);
        }
        rules
    }
}
