//! Increase and decrease commands - adjust the current directory by hand.

use crate::app::App;
use leap_core::platform::resolve_for_add;
use leap_core::Config;
use std::process::ExitCode;

/// Run the increase command.
pub fn increase(config: Config, weight: Option<f64>) -> anyhow::Result<ExitCode> {
    let mut app = App::new(config)?;
    let increment = weight.unwrap_or(app.config.weights.increment);
    let path = current_path(&app)?;

    match app.store.add(&path, increment) {
        Some(entry) => println!("{}", entry),
        None => eprintln!("The home directory is never weighted."),
    }
    Ok(ExitCode::SUCCESS)
}

/// Run the decrease command.
pub fn decrease(config: Config, weight: Option<f64>) -> anyhow::Result<ExitCode> {
    let mut app = App::new(config)?;
    let decrement = weight.unwrap_or(app.config.weights.decrement);
    let path = current_path(&app)?;

    match app.store.decrease(&path, decrement) {
        Some(entry) => println!("{}", entry),
        None => eprintln!("The home directory is never weighted."),
    }
    Ok(ExitCode::SUCCESS)
}

fn current_path(app: &App) -> anyhow::Result<String> {
    let cwd = app.current_dir()?;
    Ok(resolve_for_add(&cwd, app.config.matching.keep_symlinks, &app.probe))
}
