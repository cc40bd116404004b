//! fieldguard CLI entry point

use clap::Parser;
use fieldguard::cli::{Command, args::Cli};
use std::process;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter
const LOG_ENV: &str = "FIELDGUARD_LOG";

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let exit_code = match cli.command {
        Command::Check(args) => {
            fieldguard::cli::check::run_check(&args, cli.color, cli.config.as_deref())
        }
        Command::Types { format } => fieldguard::cli::types::run_types(format),
    };

    process::exit(exit_code);
}
