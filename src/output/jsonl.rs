#![forbid(unsafe_code)]

//! JSONL output formatter for machine-readable output
//!
//! Outputs one JSON object per line:
//! 1. One error record per data error, in file order then rule order
//! 2. One status record

use crate::output::report::{FileReport, Summary};
use crate::types::{ErrorCode, FieldError};
use serde::Serialize;
use std::path::Path;

/// JSONL output formatter
#[derive(Debug, Default)]
pub struct JsonlFormatter;

impl JsonlFormatter {
    pub fn new() -> Self {
        JsonlFormatter
    }

    /// Formats the reports as JSONL
    pub fn format(&self, reports: &[FileReport]) -> String {
        let mut output = String::new();

        for report in reports {
            for error in &report.errors {
                push_line(&mut output, &ErrorRecord::new(&report.file, error));
            }
        }

        let summary = Summary::of(reports);
        push_line(
            &mut output,
            &StatusRecord {
                record_type: "status",
                passed: summary.passed(),
                files_checked: summary.files_checked,
                files_invalid: summary.files_invalid,
                total_errors: summary.total_errors,
            },
        );

        output
    }
}

fn push_line(output: &mut String, record: &impl Serialize) {
    if let Ok(json) = serde_json::to_string(record) {
        output.push_str(&json);
        output.push('\n');
    }
}

/// Error record for JSONL output
#[derive(Debug, Serialize)]
struct ErrorRecord<'a> {
    #[serde(rename = "type")]
    record_type: &'static str,
    file: &'a Path,
    field: Option<&'a str>,
    message: &'a str,
    code: ErrorCode,
}

impl<'a> ErrorRecord<'a> {
    fn new(file: &'a Path, error: &'a FieldError) -> Self {
        Self {
            record_type: "error",
            file,
            field: error.field.as_deref(),
            message: &error.message,
            code: error.code,
        }
    }
}

/// Status record for JSONL output
#[derive(Debug, Serialize)]
struct StatusRecord {
    #[serde(rename = "type")]
    record_type: &'static str,
    passed: bool,
    files_checked: u64,
    files_invalid: u64,
    total_errors: u64,
}
