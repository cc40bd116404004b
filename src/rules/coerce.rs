#![forbid(unsafe_code)]

//! Type coercion applied to primitive values before checking
//!
//! Coercion never fails: a value that cannot be parsed is left unchanged and
//! the checker that runs next rejects it through its own type check.

use crate::rules::rule::CoerceFn;
use serde_json::{Map, Number, Value};
use std::fmt;

/// Built-in coercion targets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoercionKind {
    /// Stringify the value
    String,
    /// Parse a leading base-10 integer
    Int,
    /// Parse a full numeric literal
    Number,
    /// Truthiness cast
    Bool,
}

impl CoercionKind {
    /// Resolves a built-in coercion name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(CoercionKind::String),
            "int" => Some(CoercionKind::Int),
            "number" => Some(CoercionKind::Number),
            "bool" | "boolean" => Some(CoercionKind::Bool),
            _ => None,
        }
    }

    /// Returns the canonical name of the coercion
    pub fn as_str(&self) -> &'static str {
        match self {
            CoercionKind::String => "string",
            CoercionKind::Int => "int",
            CoercionKind::Number => "number",
            CoercionKind::Bool => "bool",
        }
    }

    /// Applies the coercion to a primitive value
    pub fn apply(&self, value: &Value) -> Value {
        match self {
            CoercionKind::String => Value::String(stringify(value)),
            CoercionKind::Int => parse_int(value).map(number_value).unwrap_or_else(|| value.clone()),
            CoercionKind::Number => {
                parse_number(value).map(number_value).unwrap_or_else(|| value.clone())
            }
            CoercionKind::Bool => Value::Bool(is_truthy(value)),
        }
    }
}

/// Coercion registered for a type name
#[derive(Clone)]
pub enum Coercion {
    /// One of the built-in conversions
    Builtin(CoercionKind),
    /// A caller-supplied function
    Custom(CoerceFn),
}

impl Coercion {
    /// Applies the coercion; `target` holds the sibling fields
    pub fn apply(&self, value: &Value, target: &Map<String, Value>) -> Value {
        match self {
            Coercion::Builtin(kind) => kind.apply(value),
            Coercion::Custom(f) => f(value, target),
        }
    }
}

impl fmt::Debug for Coercion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Coercion::Builtin(kind) => f.debug_tuple("Builtin").field(kind).finish(),
            Coercion::Custom(_) => f.write_str("Custom(<fn>)"),
        }
    }
}

/// Turns a finite float into a JSON number, preferring an integer
/// representation for integral values
pub(crate) fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < 9_007_199_254_740_992.0 {
        Value::Number(Number::from(n as i64))
    } else {
        Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Formats a number the way JavaScript prints it (`5.0` prints as `5`)
pub(crate) fn format_number(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{:.0}", f),
        _ => n.to_string(),
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(n),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// `parseInt(value, 10)`: optional sign and the leading run of digits
fn parse_int(value: &Value) -> Option<f64> {
    let text = match value {
        Value::Number(n) => return n.as_f64().map(f64::trunc),
        Value::String(s) => s.as_str(),
        _ => return None,
    };

    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let parsed: f64 = digits[..end].parse().ok()?;
    Some(if negative { -parsed } else { parsed })
}

/// `Number(value)`: the whole trimmed string must be a numeric literal
fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        Value::String(s) => {
            let text = s.trim();
            if text.is_empty() {
                return Some(0.0);
            }
            if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
                return u64::from_str_radix(hex, 16).ok().map(|n| n as f64);
            }
            // Rust accepts "inf"/"nan" spellings JavaScript rejects
            if !text
                .chars()
                .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'))
            {
                return None;
            }
            text.parse::<f64>().ok().filter(|f| f.is_finite())
        }
        _ => None,
    }
}
