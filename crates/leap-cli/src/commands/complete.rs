//! Complete command - print tab-completion candidates.

use crate::app::App;
use leap_core::Config;
use std::process::ExitCode;

/// Run the complete command.
pub fn run(config: Config, tokens: &[String]) -> anyhow::Result<ExitCode> {
    let app = App::new(config)?;

    for line in app.resolver()?.complete(tokens) {
        println!("{}", line);
    }

    Ok(ExitCode::SUCCESS)
}
