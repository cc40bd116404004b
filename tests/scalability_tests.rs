//! Scalability tests for fieldguard
//!
//! These tests verify that validation stays linear in the size of the data
//! and that the check command handles many files.
//!
//! ## Performance Requirements
//!
//! These tests ensure that:
//! - Wide objects (thousands of fields) validate quickly
//! - Large arrays report every bad item with its index
//! - One validator can be shared by many threads
//! - The check command handles hundreds of data files in one run

mod common;

use common::write_file;
use fieldguard::cli::args::CheckArgs;
use fieldguard::cli::common::{EXIT_INVALID, EXIT_SUCCESS};
use fieldguard::{Rule, RuleSet, Validator, ValidatorOptions};
use rayon::prelude::*;
use serde_json::{Map, Value, json};
use std::time::Instant;
use tempfile::TempDir;

/// Helper to build a rule set and a matching object with `count` fields
fn wide_object(count: usize) -> (RuleSet, Value) {
    let mut rules = RuleSet::new();
    let mut data = Map::new();
    for i in 0..count {
        let name = format!("field{}", i);
        rules.insert(name.clone(), Rule::new("int").min(0.0));
        data.insert(name, json!(i));
    }
    (rules, Value::Object(data))
}

#[test]
fn test_scalability_wide_object() {
    let (rules, mut data) = wide_object(5_000);
    let validator = Validator::default();

    let start = Instant::now();
    let errors = validator.validate(&rules, &mut data).unwrap();
    let elapsed = start.elapsed();
    println!("Validating 5000 fields took: {:?}", elapsed);

    assert_eq!(errors, None);
    assert!(
        elapsed.as_secs() < 2,
        "Validation should complete quickly: {:?}",
        elapsed
    );
}

#[test]
fn test_scalability_large_array() {
    let rules = RuleSet::new().field(
        "items",
        Rule::new("array").item_type("object").schema(
            RuleSet::new()
                .field("id", "int")
                .field("name", Rule::new("string").max(20.0)),
        ),
    );

    // Every tenth item has a bad name
    let items: Vec<Value> = (0..10_000)
        .map(|i| {
            let name = if i % 10 == 0 { json!(i) } else { json!(format!("item {}", i)) };
            json!({ "id": i, "name": name })
        })
        .collect();
    let mut data = json!({ "items": items });

    let start = Instant::now();
    let errors = Validator::default().validate(&rules, &mut data).unwrap().unwrap();
    println!("Validating 10000 array items took: {:?}", start.elapsed());

    assert_eq!(errors.len(), 1_000);
    assert_eq!(errors[0].field.as_deref(), Some("items[0].name"));
    assert_eq!(errors[999].field.as_deref(), Some("items[9990].name"));
}

#[test]
fn test_scalability_shared_validator() {
    let (rules, data) = wide_object(200);
    let validator = Validator::new(ValidatorOptions {
        convert: true,
        ..ValidatorOptions::default()
    });

    let results: Vec<_> = (0..1_000)
        .into_par_iter()
        .map(|_| validator.validate_cloned(&rules, &data).unwrap())
        .collect();

    assert_eq!(results.len(), 1_000);
    assert!(results.iter().all(Option::is_none));
}

#[test]
fn test_scalability_many_data_files() {
    let temp_dir = TempDir::new().unwrap();
    let rules = write_file(
        temp_dir.path(),
        "rules.json",
        r#"{ "id": "int", "name": "string", "email": "email?" }"#,
    );

    let mut data = Vec::new();
    for i in 0..500 {
        let content = format!(r#"{{ "id": {}, "name": "user {}" }}"#, i, i);
        data.push(write_file(temp_dir.path(), &format!("data/{}.json", i), &content));
    }

    let mut args = CheckArgs {
        data,
        rules: Some(rules),
        closed: false,
        convert: false,
        widely_undefined: false,
        no_validate_root: false,
        format: Some(fieldguard::cli::OutputFormat::Jsonl),
    };
    let config = write_file(temp_dir.path(), "fieldguard.toml", "");

    let start = Instant::now();
    let exit_code = fieldguard::cli::check::run_check(&args, None, Some(config.as_path()));
    println!("Checking 500 data files took: {:?}", start.elapsed());
    assert_eq!(exit_code, EXIT_SUCCESS);

    args.data.push(write_file(temp_dir.path(), "data/bad.json", r#"{ "id": "x" }"#));
    let exit_code = fieldguard::cli::check::run_check(&args, None, Some(config.as_path()));
    assert_eq!(exit_code, EXIT_INVALID);
}
