//! CLI argument parsing using clap

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for fieldguard commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON Lines format (one JSON object per line)
    Jsonl,
}

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Automatically detect if terminal supports color
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

/// fieldguard CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "fieldguard")]
#[command(about = "Declarative field validation for JSON data")]
#[command(version)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,

    /// Output coloring (defaults to the config file, then auto)
    #[arg(long, global = true)]
    pub color: Option<ColorChoice>,

    /// Configuration file (defaults to ./fieldguard.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available fieldguard subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Validate JSON data files against a rule file
    Check(CheckArgs),

    /// List the registered rule types
    Types {
        /// Output format
        #[arg(short, long, default_value = "human")]
        format: OutputFormat,
    },
}

/// Arguments of `fieldguard check`
#[derive(Args, Debug, Clone)]
pub struct CheckArgs {
    /// JSON data files to validate
    #[arg(required = true)]
    pub data: Vec<PathBuf>,

    /// Rule file (.json or .toml)
    #[arg(short, long)]
    pub rules: Option<PathBuf>,

    /// Reject data fields that have no rule
    #[arg(long)]
    pub closed: bool,

    /// Coerce primitive values to each rule's type before checking
    #[arg(long)]
    pub convert: bool,

    /// Treat empty strings as absent
    #[arg(long)]
    pub widely_undefined: bool,

    /// Accept data whose root is a scalar
    #[arg(long, conflicts_with = "closed")]
    pub no_validate_root: bool,

    /// Output format (defaults to the config file, then human)
    #[arg(short, long)]
    pub format: Option<OutputFormat>,
}
