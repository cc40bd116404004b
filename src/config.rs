//! Configuration file parsing and validation

pub mod settings;

pub use settings::{CheckConfig, ColorOption, Config, OutputConfig, OutputFormat, CONFIG_FILE};
