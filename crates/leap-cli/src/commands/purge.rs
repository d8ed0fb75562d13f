//! Purge command - forget directories that no longer exist.

use crate::app::App;
use leap_core::Config;
use std::process::ExitCode;

/// Run the purge command.
pub fn run(config: Config) -> anyhow::Result<ExitCode> {
    let mut app = App::new(config)?;
    let probe = app.probe;

    let removed = app.store.purge(&probe);
    for path in &removed {
        println!("{}", path);
    }
    eprintln!("Purged {} entries.", removed.len());

    Ok(ExitCode::SUCCESS)
}
