//! Performance benchmarks for fieldguard
//!
//! These benchmarks measure the performance of key operations:
//! - Flat objects with many scalar fields
//! - Nested objects and arrays of objects
//! - Coercion overhead with `convert` on and off
//! - Rule set loading from JSON and TOML
//!
//! ## Running Benchmarks
//!
//! To run all benchmarks:
//! ```bash
//! cargo bench
//! ```
//!
//! To run specific benchmarks:
//! ```bash
//! cargo bench flat_objects
//! cargo bench nested
//! ```
//!
//! ## Expected Performance Characteristics
//!
//! ### Validation
//! - Linear in the number of fields and array items
//! - Built-in patterns are compiled once per process
//! - Each field's rule is normalized per call, so shorthand rules cost a
//!   clone of the rule record
//!
//! ### Coercion
//! - Only primitive values are coerced
//! - String parsing dominates the cost of `int` and `number` coercion

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use fieldguard::{Rule, RuleSet, Validator, ValidatorOptions};
use serde_json::{Map, Value, json};

// ============================================================================
// Helper Functions
// ============================================================================

/// Build a rule set and matching data with `count` fields of mixed types
fn flat_object(count: usize, as_strings: bool) -> (RuleSet, Value) {
    let mut rules = RuleSet::new();
    let mut data = Map::new();

    for i in 0..count {
        let name = format!("field{}", i);
        let (rule, value) = match i % 4 {
            0 => (Rule::new("int").min(0.0), json!(i)),
            1 => (Rule::new("number").max(1e9), json!(i as f64 / 2.0)),
            2 => (Rule::new("string").max(32.0), json!(format!("value {}", i))),
            _ => (Rule::new("email"), json!(format!("user{}@example.com", i))),
        };
        let value = match (&value, as_strings) {
            (Value::Number(n), true) => json!(n.to_string()),
            _ => value,
        };
        rules.insert(name.clone(), rule);
        data.insert(name, value);
    }

    (rules, Value::Object(data))
}

/// Build an array-of-objects rule set and `count` items
fn nested_array(count: usize) -> (RuleSet, Value) {
    let address = RuleSet::new()
        .field("city", "string")
        .field("zip", Rule::new("string").format(
            fieldguard::Pattern::new("^[0-9]{5}$").expect("valid pattern"),
        ));
    let user = RuleSet::new()
        .field("id", "int")
        .field("name", "string")
        .field("role", vec![json!("admin"), json!("member")])
        .field("address", Rule::new("object").schema(address));
    let rules = RuleSet::new().field(
        "users",
        Rule::new("array").item_type("object").schema(user),
    );

    let users: Vec<Value> = (0..count)
        .map(|i| {
            json!({
                "id": i,
                "name": format!("user {}", i),
                "role": if i % 2 == 0 { "admin" } else { "member" },
                "address": { "city": "Oslo", "zip": "01234" }
            })
        })
        .collect();

    (rules, json!({ "users": users }))
}

// ============================================================================
// Validation Benchmarks
// ============================================================================

/// Benchmark validation of flat objects
///
/// Measures the per-field cost of the driver and the scalar checkers.
fn bench_flat_objects(c: &mut Criterion) {
    let mut group = c.benchmark_group("flat_objects");
    let validator = Validator::default();

    for field_count in [10, 100, 1_000].iter() {
        let (rules, data) = flat_object(*field_count, false);
        group.throughput(Throughput::Elements(*field_count as u64));

        group.bench_with_input(
            BenchmarkId::new("validate", field_count),
            field_count,
            |b, _| {
                b.iter(|| {
                    let mut target = data.clone();
                    black_box(validator.validate(&rules, &mut target))
                });
            },
        );
    }

    group.finish();
}

/// Benchmark nested objects inside arrays
///
/// Every item recurses through two object levels, so this measures the
/// cost of nested validation and path building.
fn bench_nested(c: &mut Criterion) {
    let mut group = c.benchmark_group("nested");
    let validator = Validator::default();

    for item_count in [10, 100, 1_000].iter() {
        let (rules, data) = nested_array(*item_count);
        group.throughput(Throughput::Elements(*item_count as u64));

        group.bench_with_input(
            BenchmarkId::new("array_of_objects", item_count),
            item_count,
            |b, _| {
                b.iter(|| black_box(validator.validate_cloned(&rules, &data)));
            },
        );
    }

    group.finish();
}

// ============================================================================
// Coercion Benchmarks
// ============================================================================

/// Benchmark conversion of string-encoded numbers
fn bench_convert(c: &mut Criterion) {
    let mut group = c.benchmark_group("convert");
    let plain = Validator::default();
    let converting = Validator::new(ValidatorOptions {
        convert: true,
        ..ValidatorOptions::default()
    });

    let (rules, native) = flat_object(200, false);
    let (_, strings) = flat_object(200, true);

    group.bench_function("off_native_values", |b| {
        b.iter(|| black_box(plain.validate_cloned(&rules, &native)));
    });

    group.bench_function("on_native_values", |b| {
        b.iter(|| black_box(converting.validate_cloned(&rules, &native)));
    });

    group.bench_function("on_string_values", |b| {
        b.iter(|| black_box(converting.validate_cloned(&rules, &strings)));
    });

    group.finish();
}

// ============================================================================
// Rule Loading Benchmarks
// ============================================================================

/// Benchmark parsing rule files
fn bench_rule_loading(c: &mut Criterion) {
    let mut group = c.benchmark_group("rule_loading");

    let json_rules = r#"{
        "name": { "type": "string", "trim": true, "max": 64 },
        "age": "int?",
        "role": ["admin", "member"],
        "code": "/^[A-Z]{3}$/",
        "tags": { "type": "array", "itemType": "string", "rule": { "type": "string", "max": 10 } },
        "address": { "type": "object", "rule": { "city": "string", "zip": "/^[0-9]{5}$/" } }
    }"#;
    let toml_rules = r#"
name = { type = "string", trim = true, max = 64 }
age = "int?"
role = ["admin", "member"]
code = "/^[A-Z]{3}$/"
tags = { type = "array", itemType = "string", rule = { type = "string", max = 10 } }
address = { type = "object", rule = { city = "string", zip = "/^[0-9]{5}$/" } }
"#;

    group.bench_function("json", |b| {
        b.iter(|| black_box(RuleSet::from_json_str(json_rules)));
    });

    group.bench_function("toml", |b| {
        b.iter(|| black_box(RuleSet::from_toml_str(toml_rules)));
    });

    group.finish();
}

// ============================================================================
// Benchmark Registration
// ============================================================================

criterion_group!(validation_benches, bench_flat_objects, bench_nested,);

criterion_group!(convert_benches, bench_convert,);

criterion_group!(loading_benches, bench_rule_loading,);

criterion_main!(validation_benches, convert_benches, loading_benches);
