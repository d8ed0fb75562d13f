//! Stat command - show the database.

use crate::app::App;
use crate::OutputFormat;
use chrono::{DateTime, Local};
use leap_core::Config;
use std::fs;
use std::process::ExitCode;

/// Run the stat command.
pub fn run(config: Config, output: OutputFormat) -> anyhow::Result<ExitCode> {
    let app = App::new(config)?;

    let entries = app.store.entries_by_weight();
    let stats = app.store.stats();
    let last_saved: Option<DateTime<Local>> = fs::metadata(&stats.data_file)
        .and_then(|m| m.modified())
        .ok()
        .map(DateTime::from);

    match output {
        OutputFormat::Text => {
            // Lightest first so the heaviest entries end up next to the prompt.
            for entry in entries.iter().rev() {
                println!("{}", entry);
            }

            println!("________________________________________");
            println!();
            println!("{:.0}:\t total weight", stats.total_weight);
            println!("{}:\t number of entries", stats.entries);
            if let Ok(cwd) = app.current_dir() {
                println!("{:.2}:\t current directory weight", app.store.weight(&cwd));
            }
            println!();
            println!("data:\t {}", stats.data_file.display());
            if let Some(saved) = last_saved {
                println!("saved:\t {}", saved.format("%Y-%m-%d %H:%M:%S"));
            }
        }
        OutputFormat::Json => {
            let json = serde_json::json!({
                "data_file": stats.data_file,
                "last_saved": last_saved.map(|t| t.to_rfc3339()),
                "total_weight": stats.total_weight,
                "entries": entries,
            });

            println!("{}", serde_json::to_string_pretty(&json)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
