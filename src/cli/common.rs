//! Common helper functions shared across CLI commands
//!
//! Exit codes, configuration loading, and the merge of command-line flags
//! over configuration file values.

use crate::cli::args::{ColorChoice, OutputFormat};
use crate::config::{self, Config};
use crate::error::ConfigError;
use std::io::IsTerminal;
use std::path::Path;

pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_INVALID: i32 = 1;
pub const EXIT_ERROR: i32 = 2;
pub const EXIT_PARSE_ERROR: i32 = 3;

/// Load fieldguard.toml, or the file given with `--config`
///
/// # Errors
///
/// Returns `ConfigError::Io` if an explicit config file cannot be read.
/// Returns `ConfigError::Parse` if the file is not valid TOML.
pub(crate) fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    Config::discover(path)
}

/// Picks the output format: the flag if given, else the config file value
pub(crate) fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> OutputFormat {
    flag.unwrap_or(match config.output.format {
        config::OutputFormat::Human => OutputFormat::Human,
        config::OutputFormat::Jsonl => OutputFormat::Jsonl,
    })
}

/// Picks the color mode for stdout
pub(crate) fn resolve_color(flag: Option<ColorChoice>, config: &Config) -> termcolor::ColorChoice {
    let choice = flag.unwrap_or(match config.output.color {
        config::ColorOption::Auto => ColorChoice::Auto,
        config::ColorOption::Always => ColorChoice::Always,
        config::ColorOption::Never => ColorChoice::Never,
    });

    match choice {
        ColorChoice::Always => termcolor::ColorChoice::Always,
        ColorChoice::Never => termcolor::ColorChoice::Never,
        ColorChoice::Auto if std::io::stdout().is_terminal() => termcolor::ColorChoice::Auto,
        ColorChoice::Auto => termcolor::ColorChoice::Never,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        assert_eq!(EXIT_SUCCESS, 0);
        assert_eq!(EXIT_INVALID, 1);
        assert_eq!(EXIT_ERROR, 2);
        assert_eq!(EXIT_PARSE_ERROR, 3);
    }

    #[test]
    fn test_flag_overrides_config() {
        let config = Config::parse("[output]\nformat = \"jsonl\"\ncolor = \"always\"\n").unwrap();
        assert_eq!(resolve_format(None, &config), OutputFormat::Jsonl);
        assert_eq!(resolve_format(Some(OutputFormat::Human), &config), OutputFormat::Human);
        assert_eq!(resolve_color(None, &config), termcolor::ColorChoice::Always);
        assert_eq!(
            resolve_color(Some(ColorChoice::Never), &config),
            termcolor::ColorChoice::Never
        );
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(resolve_format(None, &config), OutputFormat::Human);
    }
}
