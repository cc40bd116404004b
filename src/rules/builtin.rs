#![forbid(unsafe_code)]

//! Built-in type checkers
//!
//! Each checker receives its own copy of the normalized rule, the value
//! (already trimmed and coerced) and a [`CheckContext`]. Bounds are
//! inclusive: a value equal to `min` or `max` passes.

use crate::error::{ConfigError, ValidatorError};
use crate::message::templates;
use crate::rules::coerce::{Coercion, CoercionKind, format_number};
use crate::rules::registry::{CheckContext, Checker, CheckerRegistry};
use crate::rules::rule::{Pattern, Rule, RuleSpec, normalize};
use crate::types::{CheckOutcome, ErrorCode, FieldError};
use regex::Regex;
use serde_json::{Map, Value};
use std::sync::{Arc, LazyLock};

type CheckResult = Result<CheckOutcome, ValidatorError>;

static DATE_RE: LazyLock<Pattern> = LazyLock::new(|| builtin_pattern(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$"));

static DATETIME_RE: LazyLock<Pattern> = LazyLock::new(|| {
    builtin_pattern(r"^[0-9]{4}-[0-9]{2}-[0-9]{2} [0-9]{2}:[0-9]{2}:[0-9]{2}$")
});

static ID_RE: LazyLock<Pattern> = LazyLock::new(|| builtin_pattern(r"^[0-9]+$"));

// http://www.regular-expressions.info/email.html
static EMAIL_RE: LazyLock<Pattern> = LazyLock::new(|| {
    builtin_pattern(
        r"(?i)^[a-z0-9!#$%&'*+/=?^_`{|}~-]+(?:\.[a-z0-9!#$%&'*+/=?^_`{|}~-]+)*@(?:[a-z0-9](?:[a-z0-9-]*[a-z0-9])?\.)+[a-z0-9](?:[a-z0-9-]*[a-z0-9])?$",
    )
});

static PASSWORD_RE: LazyLock<Pattern> = LazyLock::new(|| {
    builtin_pattern(r#"^[A-Za-z0-9_`~!@#$%^&*()\-=+\[\]{}|;:'",<.>/?]+$"#)
});

// https://gist.github.com/dperini/729294, minus the private-range
// look-aheads, which `is_private_ipv4` applies instead
static URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)^(?:(?:https?|ftp)://)(?:\S+(?::\S*)?@)?",
        r"(?:(?P<ip>(?:[1-9][0-9]?|1[0-9][0-9]|2[01][0-9]|22[0-3])",
        r"(?:\.(?:1?[0-9]{1,2}|2[0-4][0-9]|25[0-5])){2}",
        r"(?:\.(?:[1-9][0-9]?|1[0-9][0-9]|2[0-4][0-9]|25[0-4])))",
        r"|(?:(?:[a-z\x{00a1}-\x{ffff}0-9]-*)*[a-z\x{00a1}-\x{ffff}0-9]+)",
        r"(?:\.(?:[a-z\x{00a1}-\x{ffff}0-9]-*)*[a-z\x{00a1}-\x{ffff}0-9]+)*",
        r"(?:\.(?:[a-z\x{00a1}-\x{ffff}]{2,})))",
        r"(?::[0-9]{2,5})?(?:/\S*)?$",
    ))
    .expect("built-in url pattern compiles")
});

fn builtin_pattern(source: &str) -> Pattern {
    Pattern::from(Regex::new(source).expect("built-in pattern compiles"))
}

/// Registers every built-in checker and its default coercion
pub(crate) fn register_builtin_checkers(registry: &mut CheckerRegistry) {
    use CoercionKind as Kind;

    builtin(registry, "number", check_number, Some(Kind::Number));
    builtin(registry, "int", check_int, Some(Kind::Int));
    builtin(registry, "integer", check_int, Some(Kind::Int));
    builtin(registry, "string", check_string, Some(Kind::String));
    builtin(registry, "id", check_id, Some(Kind::String));
    builtin(registry, "date", check_date, Some(Kind::String));
    builtin(registry, "dateTime", check_date_time, Some(Kind::String));
    builtin(registry, "datetime", check_date_time, Some(Kind::String));
    builtin(registry, "boolean", check_boolean, Some(Kind::Bool));
    builtin(registry, "bool", check_boolean, Some(Kind::Bool));
    builtin(registry, "array", check_array, None);
    builtin(registry, "object", check_object, None);
    builtin(registry, "enum", check_enum, None);
    builtin(registry, "email", check_email, Some(Kind::String));
    builtin(registry, "password", check_password, Some(Kind::String));
    builtin(registry, "url", check_url, Some(Kind::String));
}

fn builtin(
    registry: &mut CheckerRegistry,
    name: &str,
    checker: impl Checker + 'static,
    coercion: Option<CoercionKind>,
) {
    registry.register(name, Arc::new(checker));
    if let Some(kind) = coercion {
        registry.register_coercion(name, Coercion::Builtin(kind));
    }
}

/// Builds the checker registered for a pattern type
pub(crate) fn pattern_checker(
    pattern: Pattern,
) -> impl Fn(&CheckContext<'_>, &mut Rule, &mut Value) -> CheckResult + Send + Sync {
    move |ctx: &CheckContext<'_>, _rule: &mut Rule, value: &mut Value| {
        let rule = Rule {
            format: Some(pattern.clone()),
            ..Rule::default()
        };
        Ok(string_outcome(ctx, &rule, value))
    }
}

/// Formats a bound the way messages show it (`5` rather than `5.0`)
fn bound(n: f64) -> String {
    match serde_json::Number::from_f64(n) {
        Some(number) => format_number(&number),
        None => n.to_string(),
    }
}

/// Renders a value inside a message (strings without quotes)
fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => format_number(n),
        other => other.to_string(),
    }
}

/// Strict equality with numbers compared by value (`1 == 1.0`)
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn check_bounds(ctx: &CheckContext<'_>, rule: &Rule, n: f64, length: bool) -> Option<String> {
    let (over, under) = if length {
        (templates::LENGTH_SMALLER_THAN, templates::LENGTH_BIGGER_THAN)
    } else {
        (templates::SMALLER_THAN, templates::BIGGER_THAN)
    };

    if let Some(max) = rule.max
        && n > max
    {
        return Some(ctx.message(over, &[bound(max)]));
    }
    if let Some(min) = rule.min
        && n < min
    {
        return Some(ctx.message(under, &[bound(min)]));
    }
    None
}

fn check_number(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    let Some(n) = value.as_f64() else {
        return Ok(CheckOutcome::Invalid(ctx.message(templates::NOT_NUMBER, &[])));
    };
    Ok(check_bounds(ctx, rule, n, false).into())
}

fn check_int(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    let Some(n) = value.as_f64().filter(|n| n.fract() == 0.0) else {
        return Ok(CheckOutcome::Invalid(ctx.message(templates::NOT_INTEGER, &[])));
    };
    Ok(check_bounds(ctx, rule, n, false).into())
}

/// Whether an empty string passes `rule`
///
/// An explicit `allow_empty` wins, then the legacy `empty` flag; with
/// neither set, optional fields accept empty strings and required ones do
/// not.
fn allows_empty(rule: &Rule) -> bool {
    rule.allow_empty.or(rule.empty).unwrap_or(!rule.is_required())
}

fn string_outcome(ctx: &CheckContext<'_>, rule: &Rule, value: &Value) -> CheckOutcome {
    let Value::String(text) = value else {
        return CheckOutcome::Invalid(ctx.message(templates::NOT_STRING, &[]));
    };

    if text.is_empty() {
        if allows_empty(rule) {
            return CheckOutcome::Valid;
        }
        return CheckOutcome::Invalid(ctx.message(templates::EMPTY, &[]));
    }

    let length = text.encode_utf16().count() as f64;
    if let Some(message) = check_bounds(ctx, rule, length, true) {
        return CheckOutcome::Invalid(message);
    }

    if let Some(pattern) = &rule.format
        && !pattern.is_match(text)
    {
        let message = rule
            .message
            .clone()
            .unwrap_or_else(|| ctx.message(templates::MATCH, &[pattern.to_string()]));
        return CheckOutcome::Invalid(message);
    }

    CheckOutcome::Valid
}

fn check_string(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    Ok(string_outcome(ctx, rule, value))
}

/// A string rule carrying only a fixed pattern and the emptiness flags of
/// the original rule
fn format_rule(rule: &Rule, pattern: &Pattern, message: Option<String>) -> Rule {
    Rule {
        format: Some(pattern.clone()),
        message,
        allow_empty: rule.allow_empty,
        required: rule.required,
        ..Rule::default()
    }
}

fn check_id(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    Ok(string_outcome(ctx, &format_rule(rule, &ID_RE, None), value))
}

fn check_date(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    Ok(string_outcome(ctx, &format_rule(rule, &DATE_RE, None), value))
}

fn check_date_time(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    Ok(string_outcome(ctx, &format_rule(rule, &DATETIME_RE, None), value))
}

fn check_boolean(ctx: &CheckContext<'_>, _rule: &mut Rule, value: &mut Value) -> CheckResult {
    if value.is_boolean() {
        Ok(CheckOutcome::Valid)
    } else {
        Ok(CheckOutcome::Invalid(ctx.message(templates::NOT_BOOLEAN, &[])))
    }
}

fn check_enum(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    let Some(values) = &rule.values else {
        return Err(ConfigError::InvalidEnum(ctx.field().to_string()).into());
    };

    if values.iter().any(|allowed| values_equal(allowed, value)) {
        return Ok(CheckOutcome::Valid);
    }

    let listed: Vec<String> = values.iter().map(display_value).collect();
    Ok(CheckOutcome::Invalid(
        ctx.message(templates::ONE_OF, &[listed.join(", ")]),
    ))
}

fn check_email(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    let message = rule
        .message
        .clone()
        .unwrap_or_else(|| ctx.message(templates::NOT_EMAIL, &[]));
    Ok(string_outcome(ctx, &format_rule(rule, &EMAIL_RE, Some(message)), value))
}

fn check_password(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    if rule.min.is_none_or(|min| min == 0.0) {
        rule.min = Some(6.0);
    }
    rule.format = Some(PASSWORD_RE.clone());

    let outcome = string_outcome(ctx, rule, value);
    if !outcome.is_valid() {
        return Ok(outcome);
    }

    if let Some(compare) = &rule.compare
        && ctx
            .target()
            .get(compare)
            .is_none_or(|other| !values_equal(other, value))
    {
        return Ok(CheckOutcome::Invalid(
            ctx.message(templates::EQUAL_TO, &[compare.clone()]),
        ));
    }

    Ok(CheckOutcome::Valid)
}

/// True for hosts in 10/8, 127/8, 169.254/16, 192.168/16 and 172.16/12
fn is_private_ipv4(host: &str) -> bool {
    let octets: Vec<u16> = host.split('.').filter_map(|o| o.parse().ok()).collect();
    match octets.as_slice() {
        [10 | 127, ..] => true,
        [169, 254, ..] | [192, 168, ..] => true,
        [172, second, ..] => (16..=31).contains(second),
        _ => false,
    }
}

fn check_url(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    let message = rule
        .message
        .clone()
        .unwrap_or_else(|| ctx.message(templates::NOT_URL, &[]));

    let Value::String(text) = value else {
        return Ok(CheckOutcome::Invalid(ctx.message(templates::NOT_STRING, &[])));
    };
    if text.is_empty() {
        if allows_empty(rule) {
            return Ok(CheckOutcome::Valid);
        }
        return Ok(CheckOutcome::Invalid(ctx.message(templates::EMPTY, &[])));
    }

    let valid = URL_RE
        .captures(text)
        .is_some_and(|caps| !caps.name("ip").is_some_and(|ip| is_private_ipv4(ip.as_str())));
    if valid {
        Ok(CheckOutcome::Valid)
    } else {
        Ok(CheckOutcome::Invalid(message))
    }
}

/// Accepts objects and arrays; a nested schema sees an array as having no
/// fields
fn check_object(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    if !matches!(value, Value::Object(_) | Value::Array(_)) {
        return Ok(CheckOutcome::Invalid(ctx.message(templates::NOT_OBJECT, &[])));
    }

    let Some(schema) = &rule.rule else {
        return Ok(CheckOutcome::Valid);
    };

    Ok(match ctx.validate(schema, value)? {
        Some(errors) => CheckOutcome::Nested(errors),
        None => CheckOutcome::Valid,
    })
}

fn check_array(ctx: &CheckContext<'_>, rule: &mut Rule, value: &mut Value) -> CheckResult {
    let Value::Array(items) = value else {
        return Ok(CheckOutcome::Invalid(ctx.message(templates::NOT_ARRAY, &[])));
    };

    if let Some(message) = check_bounds(ctx, rule, items.len() as f64, true) {
        return Ok(CheckOutcome::Invalid(message));
    }

    let Some(item_type) = rule.item_type.clone() else {
        return Ok(CheckOutcome::Valid);
    };
    let checker = Arc::clone(ctx.registry().require(Some(item_type.as_str()))?);

    // Object items are checked against this rule's own nested schema
    let mut item_rule = if item_type == "object" {
        rule.clone()
    } else {
        match &rule.item_rule {
            Some(item_rule) => (**item_rule).clone(),
            None => normalize(&RuleSpec::TypeName(item_type)),
        }
    };

    let no_siblings = Map::new();
    let item_ctx = ctx.with_target(&no_siblings);
    let mut errors = Vec::new();

    for (index, item) in items.iter_mut().enumerate() {
        match checker.check(&item_ctx, &mut item_rule, item)? {
            CheckOutcome::Valid => {}
            CheckOutcome::Invalid(message) => {
                errors.push(FieldError::new(format!("[{}]", index), message, ErrorCode::Invalid));
            }
            CheckOutcome::Nested(nested) => {
                let prefix = format!("[{}].", index);
                errors.extend(nested.into_iter().map(|e| e.reroot(&prefix)));
            }
        }
    }

    if errors.is_empty() {
        Ok(CheckOutcome::Valid)
    } else {
        Ok(CheckOutcome::Nested(errors))
    }
}
