//! Jump command - resolve fragments to a directory.

use crate::app::App;
use leap_core::Config;
use std::process::ExitCode;

/// Run the jump command.
///
/// Prints the resolved directory and exits 0, or prints nothing and exits 1.
/// Maintenance runs afterwards either way.
pub fn run(config: Config, tokens: &[String]) -> anyhow::Result<ExitCode> {
    let mut app = App::new(config)?;

    let found = app.resolver()?.jump(tokens);

    let evicted = app.store.maintenance();
    if evicted > 0 {
        tracing::debug!(evicted, "Maintenance evicted entries");
    }

    match found {
        Some(path) => {
            println!("{}", path);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            tracing::info!(tokens = ?tokens, "No matching directory");
            Ok(ExitCode::FAILURE)
        }
    }
}
