//! Config command - show or write the effective configuration.

use anyhow::Context;
use leap_core::Config;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Run the config command.
///
/// Prints the configuration after file and command-line overrides. With
/// `write`, saves it to `target` (or the default location) instead.
pub fn run(config: Config, write: bool, target: Option<&Path>) -> anyhow::Result<ExitCode> {
    if !write {
        print!("{}", config.to_toml()?);
        return Ok(ExitCode::SUCCESS);
    }

    let path: PathBuf = match target {
        Some(path) => path.to_path_buf(),
        None => Config::default_config_path()?,
    };
    config
        .save_to(&path)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    eprintln!("Wrote {}", path.display());

    Ok(ExitCode::SUCCESS)
}
