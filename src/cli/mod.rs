//! CLI definitions for the `layered-config` inspection tool.
//!
//! The tool runs the same stages as [`crate::load`] against a dynamic target
//! and prints the merged result, which makes it easy to check what a service
//! would see for a given file and environment.

use crate::options::{DEFAULT_DELIMITER, DEFAULT_SEPARATOR, LoadOptions};
use clap::Parser;
use std::path::PathBuf;

/// Merge defaults, a YAML file and environment variables, then print the result
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// YAML file layered over the defaults
    #[arg(short, long, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// YAML file holding default values (lowest precedence)
    #[arg(short, long, value_name = "FILE")]
    pub defaults: Option<PathBuf>,

    /// Prefix of the environment variables to read, e.g. QUICK_
    #[arg(short, long, default_value = "")]
    pub prefix: String,

    /// Separator standing in for the delimiter inside variable names
    #[arg(long, default_value = DEFAULT_SEPARATOR)]
    pub separator: String,

    /// Delimiter joining path segments in keys
    #[arg(long, default_value = DEFAULT_DELIMITER)]
    pub delimiter: String,

    /// Output format: json, yaml or keys
    #[arg(long, default_value = "json")]
    pub format: String,

    /// Print flat keys annotated with the layer that set them
    #[arg(long)]
    pub explain: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Logging output: 0/off, 1/stdout, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2")]
    pub log: String,
}

impl Cli {
    /// Loader options described by the flags.
    pub fn load_options(&self) -> LoadOptions {
        let mut options = LoadOptions::new(&self.prefix)
            .with_separator(&self.separator)
            .with_delimiter(&self.delimiter);
        if let Some(ref file) = self.file {
            options = options.with_yaml_file(file);
        }
        options
    }
}
