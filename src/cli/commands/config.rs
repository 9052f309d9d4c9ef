//! Config Command
//!
//! Usage:
//!   codelens config show [-f json]
//!   codelens config path
//!   codelens config init [-g] [--force]

use crate::cli::Output;
use crate::config::{Config, ConfigLoader};
use crate::types::Result;

/// Print the effective (merged) configuration
pub fn show(config: &Config, format: &str) -> Result<()> {
    let rendered = ConfigLoader::render(config, format == "json")?;
    println!("{}", rendered);
    if format != "json" {
        let key = match config.llm.resolve_api_key() {
            Some(_) => "(set, hidden)",
            None => "(not set)",
        };
        println!("# llm.api_key: {}", key);
    }
    Ok(())
}

pub fn path() -> Result<()> {
    ConfigLoader::show_path();
    Ok(())
}

pub fn init(global: bool, force: bool) -> Result<()> {
    let path = if global {
        ConfigLoader::init_global(force)?
    } else {
        ConfigLoader::init_project(force)?
    };
    Output::new().success(&format!("Configuration at {}", path.display()));
    Ok(())
}
