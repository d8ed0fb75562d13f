//! Add command - record a visit to a directory.

use crate::app::App;
use leap_core::platform::resolve_for_add;
use leap_core::Config;
use std::path::Path;
use std::process::ExitCode;

/// Run the add command.
pub fn run(config: Config, dir: &Path, weight: Option<f64>) -> anyhow::Result<ExitCode> {
    let mut app = App::new(config)?;
    let increment = weight.unwrap_or(app.config.weights.increment);

    let path = resolve_for_add(
        &dir.to_string_lossy(),
        app.config.matching.keep_symlinks,
        &app.probe,
    );

    if let Some(entry) = app.store.add(&path, increment) {
        tracing::debug!(path = %entry.path, weight = entry.weight, "Recorded visit");
    }

    Ok(ExitCode::SUCCESS)
}
