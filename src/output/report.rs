#![forbid(unsafe_code)]

//! Per-file validation results shared by the output formatters

use crate::types::FieldError;
use std::path::PathBuf;

/// Errors found in one data file
#[derive(Debug, Clone, PartialEq)]
pub struct FileReport {
    pub file: PathBuf,
    pub errors: Vec<FieldError>,
}

impl FileReport {
    pub fn new(file: impl Into<PathBuf>, errors: Vec<FieldError>) -> Self {
        Self {
            file: file.into(),
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Totals over a batch of reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Summary {
    pub files_checked: u64,
    pub files_invalid: u64,
    pub total_errors: u64,
}

impl Summary {
    pub fn of(reports: &[FileReport]) -> Self {
        Self {
            files_checked: reports.len() as u64,
            files_invalid: reports.iter().filter(|r| !r.is_valid()).count() as u64,
            total_errors: reports.iter().map(|r| r.errors.len() as u64).sum(),
        }
    }

    pub fn passed(&self) -> bool {
        self.files_invalid == 0
    }
}
