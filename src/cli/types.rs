//! Types command implementation
//!
//! Lists the rule types a fresh validator knows, with the coercion each one
//! uses when conversion is enabled.

use crate::cli::args::OutputFormat;
use crate::cli::common::EXIT_SUCCESS;
use crate::rules::{CheckerRegistry, Coercion};
use serde::Serialize;

/// One registered type
#[derive(Debug, Serialize)]
struct TypeRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    name: &'a str,
    coercion: Option<&'static str>,
}

/// Run the types command
///
/// # Returns
///
/// Always 0
pub fn run_types(format: OutputFormat) -> i32 {
    let registry = CheckerRegistry::new();
    print!("{}", format_types(&registry, format));
    EXIT_SUCCESS
}

fn coercion_name(registry: &CheckerRegistry, type_name: &str) -> Option<&'static str> {
    registry.coercion_for(type_name).map(|coercion| match coercion {
        Coercion::Builtin(kind) => kind.as_str(),
        Coercion::Custom(_) => "custom",
    })
}

fn format_types(registry: &CheckerRegistry, format: OutputFormat) -> String {
    let mut output = String::new();

    match format {
        OutputFormat::Human => {
            output.push_str(&format!("Rule types ({} registered):\n", registry.len()));
            for name in registry.type_names() {
                match coercion_name(registry, name) {
                    Some(coercion) => output.push_str(&format!("  {:<10} converts to {}\n", name, coercion)),
                    None => output.push_str(&format!("  {}\n", name)),
                }
            }
        }
        OutputFormat::Jsonl => {
            for name in registry.type_names() {
                let record = TypeRecord {
                    record_type: "rule_type",
                    name,
                    coercion: coercion_name(registry, name),
                };
                if let Ok(json) = serde_json::to_string(&record) {
                    output.push_str(&json);
                    output.push('\n');
                }
            }
        }
    }

    output
}
