//! Check command implementation
//!
//! This module implements the `fieldguard check` command, which:
//! - Loads configuration from fieldguard.toml (optional)
//! - Loads the rule file once
//! - Validates every data file in parallel
//! - Formats output (human or JSONL)
//! - Returns the exit code

use crate::cli::args::{CheckArgs, ColorChoice, OutputFormat};
use crate::cli::common::{
    EXIT_ERROR, EXIT_INVALID, EXIT_PARSE_ERROR, EXIT_SUCCESS, load_config, resolve_color,
    resolve_format,
};
use crate::engine::{Guard, GuardError, RuleSource, Validator, ValidatorOptions};
use crate::error::{ConfigError, ValidatorError};
use crate::output::{FileReport, HumanFormatter, JsonlFormatter};
use crate::rules::RuleSet;
use crate::types::FieldError;
use rayon::prelude::*;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Error type specific to check command
#[derive(Debug, thiserror::Error)]
pub(crate) enum CheckError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Validator(#[from] ValidatorError),

    #[error("No rule file given. Pass --rules or set check.rules in fieldguard.toml")]
    NoRules,

    #[error("Parse error in {file}: {message}")]
    Parse { file: PathBuf, message: String },

    #[error("Failed to read {file}: {source}")]
    Read {
        file: PathBuf,
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CheckError {
    fn exit_code(&self) -> i32 {
        match self {
            CheckError::Parse { .. } | CheckError::Config(ConfigError::Parse(_)) => {
                EXIT_PARSE_ERROR
            }
            _ => EXIT_ERROR,
        }
    }
}

/// Run the check command
///
/// # Returns
///
/// Exit code:
/// - 0: every data file is valid
/// - 1: at least one data file has errors
/// - 2: configuration or I/O error
/// - 3: parse error in the rule file, config file, or a data file
pub fn run_check(args: &CheckArgs, color: Option<ColorChoice>, config_path: Option<&Path>) -> i32 {
    match run_check_inner(args, color, config_path) {
        Ok(true) => EXIT_SUCCESS,
        Ok(false) => EXIT_INVALID,
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

/// How each data file is validated
enum Mode {
    Open(Validator, RuleSet),
    Closed(Guard, RuleSource),
}

fn run_check_inner(
    args: &CheckArgs,
    color: Option<ColorChoice>,
    config_path: Option<&Path>,
) -> Result<bool, CheckError> {
    // 1. Load config and merge flags over it
    let config = load_config(config_path)?;
    let options = ValidatorOptions {
        validate_root: config.validator.validate_root && !args.no_validate_root,
        convert: config.validator.convert || args.convert,
        widely_undefined: config.validator.widely_undefined || args.widely_undefined,
    };
    let closed = args.closed || config.check.closed;

    // 2. Load the rule file
    let rules_path = args
        .rules
        .clone()
        .or_else(|| config.check.rules.clone())
        .ok_or(CheckError::NoRules)?;
    let rules = RuleSet::from_path(&rules_path)?;
    debug!(path = %rules_path.display(), fields = rules.len(), closed, "loaded rules");

    let mode = if closed {
        Mode::Closed(Guard::with_options(options), RuleSource::Inline(rules))
    } else {
        Mode::Open(Validator::new(options), rules)
    };

    // 3. Validate data files in parallel, keeping argument order
    let reports = args
        .data
        .par_iter()
        .map(|path| check_file(path, &mode))
        .collect::<Result<Vec<_>, _>>()?;

    let passed = reports.iter().all(FileReport::is_valid);
    info!(files = reports.len(), passed, "check finished");

    // 4. Format and print output
    match resolve_format(args.format, &config) {
        OutputFormat::Human => {
            HumanFormatter::new(resolve_color(color, &config)).print(&reports)?;
        }
        OutputFormat::Jsonl => print!("{}", JsonlFormatter::new().format(&reports)),
    }

    Ok(passed)
}

fn check_file(path: &Path, mode: &Mode) -> Result<FileReport, CheckError> {
    let content = std::fs::read_to_string(path).map_err(|source| CheckError::Read {
        file: path.to_path_buf(),
        source,
    })?;
    let mut data: Value = serde_json::from_str(&content).map_err(|e| CheckError::Parse {
        file: path.to_path_buf(),
        message: e.to_string(),
    })?;

    let errors = match mode {
        Mode::Open(validator, rules) => validator.validate(rules, &mut data)?.unwrap_or_default(),
        Mode::Closed(guard, source) => match guard.check_closed(source, &mut data) {
            Ok(()) => Vec::new(),
            Err(GuardError::Invalid(errors)) => errors,
            Err(GuardError::NoData) => vec![FieldError::root(GuardError::NoData.to_string())],
            Err(GuardError::Config(e)) => return Err(e.into()),
        },
    };

    debug!(file = %path.display(), errors = errors.len(), "checked file");
    Ok(FileReport::new(path, errors))
}
