//! layered-config
//!
//! Prints the configuration a service would load from its defaults, YAML file
//! and environment.

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use layered_config::Loader;
use layered_config::cli::Cli;
use layered_config::format::{OutputFormat, format_store, format_tree};
use layered_config::logging::{self, LogTarget};
use layered_config::sources::read_yaml_file;
use serde_json::Value;
use tracing::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::init(&LogTarget::parse(&cli.log), cli.verbose)?;

    let format = OutputFormat::from_str(&cli.format)
        .ok_or_else(|| anyhow!("Unknown output format: {}", cli.format))?;
    let options = cli.load_options();
    debug!("Loading with {:?}", options);

    let defaults = match &cli.defaults {
        Some(path) => {
            let tree = read_yaml_file(path)
                .with_context(|| format!("Failed to load defaults from {}", path.display()))?;
            Some(Value::Object(tree))
        }
        None => None,
    };

    let mut loader = Loader::new(&options)?;
    loader.load_defaults(defaults.as_ref())?;
    loader.load_file()?;
    loader.load_env()?;

    let output = if cli.explain {
        format_store(loader.store(), true)
    } else {
        let mut merged = Value::Null;
        loader.decode_into(&mut merged)?;
        format_tree(&merged, format)?
    };

    print!("{}", output);
    Ok(())
}
