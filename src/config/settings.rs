//! Parsing and validation for fieldguard.toml configuration files
//!
//! ```toml
//! [validator]
//! validate_root = true
//! convert = false
//! widely_undefined = false
//!
//! [check]
//! rules = "rules/user.json"
//! closed = true
//!
//! [output]
//! format = "human"
//! color = "auto"
//! ```
//!
//! Every section is optional. Command-line flags override file values.

use crate::engine::ValidatorOptions;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// File name looked up in the current directory when `--config` is absent
pub const CONFIG_FILE: &str = "fieldguard.toml";

/// Main configuration struct for fieldguard.toml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Validator switches
    #[serde(default = "default_validator")]
    pub validator: ValidatorOptions,

    /// Settings of the `check` command
    #[serde(default)]
    pub check: CheckConfig,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,
}

// Data files are documents, so the CLI rejects non-object roots by default
fn default_validator() -> ValidatorOptions {
    ValidatorOptions {
        validate_root: true,
        ..ValidatorOptions::default()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            validator: default_validator(),
            check: CheckConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// A relative `check.rules` path is resolved against the directory of
    /// the configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let mut config = Self::parse(&content)?;

        if let Some(rules) = &config.check.rules
            && rules.is_relative()
            && let Some(base) = path.parent()
        {
            config.check.rules = Some(base.join(rules));
        }

        Ok(config)
    }

    /// Loads `path` if given, else `fieldguard.toml` from the current
    /// directory if it exists, else the defaults
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(CONFIG_FILE);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Parse configuration from a TOML string
    pub fn parse(s: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if let Some(rules) = &self.check.rules
            && rules.as_os_str().is_empty()
        {
            return Err(ConfigError::Validation(
                "check.rules must not be empty".to_string(),
            ));
        }

        // Closed mode reads the data's keys, which needs an object root
        if self.check.closed && !self.validator.validate_root {
            return Err(ConfigError::Validation(
                "check.closed requires validator.validate_root = true".to_string(),
            ));
        }

        Ok(())
    }
}

/// `[check]` section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CheckConfig {
    /// Rule file used when `--rules` is not given
    pub rules: Option<PathBuf>,

    /// Reject data fields that have no rule
    pub closed: bool,
}

/// Output configuration section
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Output format
    pub format: OutputFormat,

    /// Color output setting
    pub color: ColorOption,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output
    #[default]
    Human,
    /// JSON Lines format
    Jsonl,
}

/// Color output options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorOption {
    /// Auto-detect based on terminal capabilities
    #[default]
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}
