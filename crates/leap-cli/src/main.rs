//! # Leap CLI
//!
//! Command-line front end for the Leap directory jumper. Shell integrations
//! call it on every directory change (`leap add`) and to resolve a jump
//! (`leap jump`). Only paths are written to stdout; logs go to stderr.
//!
//! ## Commands
//!
//! - `leap add <dir>` - Record a visit to a directory
//! - `leap increase [weight]` / `leap decrease [weight]` - Adjust the current directory
//! - `leap jump <tokens>` - Print the best matching directory
//! - `leap complete <tokens>` - Print completion lines
//! - `leap purge` - Forget directories that no longer exist
//! - `leap stat` - Show the database
//! - `leap config [--write]` - Show or save the effective configuration
//!
//! ## Example Usage
//!
//! ```bash
//! # From a prompt hook
//! leap add "$PWD"
//!
//! # Jump to the heaviest directory ending in "leap" below something "proj"
//! cd "$(leap jump proj leap)"
//!
//! # Tab completion
//! leap complete proj__
//! ```

mod app;
mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Leap - jump to frequently used directories
#[derive(Parser)]
#[command(name = "leap")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Path to the database file
    #[arg(long, global = true, env = "LEAP_DATA_FILE")]
    data_file: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a visit to a directory
    #[command(alias = "a")]
    Add {
        /// Directory to add
        dir: PathBuf,

        /// Increment to apply (defaults to weights.increment)
        #[arg(short, long)]
        weight: Option<f64>,
    },

    /// Increase the weight of the current directory
    #[command(alias = "i")]
    Increase {
        /// Increment to apply (defaults to weights.increment)
        weight: Option<f64>,
    },

    /// Decrease the weight of the current directory
    #[command(alias = "d")]
    Decrease {
        /// Decrement to apply (defaults to weights.decrement)
        weight: Option<f64>,
    },

    /// Print the directory that best matches the given fragments
    #[command(alias = "j")]
    Jump {
        /// Path fragments, matched in order
        tokens: Vec<String>,

        /// Match case-insensitively from the first pass
        #[arg(short = 'I', long)]
        ignore_case: bool,
    },

    /// Print tab-completion candidates
    Complete {
        /// Path fragments, matched in order
        tokens: Vec<String>,

        /// Match case-insensitively from the first pass
        #[arg(short = 'I', long)]
        ignore_case: bool,
    },

    /// Remove directories that no longer exist
    Purge,

    /// Show database entries and totals
    #[command(alias = "s")]
    Stat {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        output: OutputFormat,
    },

    /// Show the effective configuration as TOML
    Config {
        /// Save it to --config (or the default location) instead of printing
        #[arg(long)]
        write: bool,
    },
}

#[derive(Clone, Debug, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown output format: {}", s)),
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration
    let mut config = match &cli.config {
        Some(path) => leap_core::Config::load_from(path)?,
        None => leap_core::Config::load()?,
    };
    if let Some(data_file) = cli.data_file {
        config.general.data_file = Some(data_file);
    }

    // Setup logging
    let log_level = if cli.quiet {
        "error".to_string()
    } else {
        match cli.verbose {
            0 => config.general.log_level.clone(),
            1 => "debug".to_string(),
            _ => "trace".to_string(),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)))
        .init();

    // Execute command
    match cli.command {
        Commands::Add { dir, weight } => commands::add::run(config, &dir, weight),
        Commands::Increase { weight } => commands::adjust::increase(config, weight),
        Commands::Decrease { weight } => commands::adjust::decrease(config, weight),
        Commands::Jump {
            tokens,
            ignore_case,
        } => {
            config.matching.ignore_case |= ignore_case;
            commands::jump::run(config, &tokens)
        }
        Commands::Complete {
            tokens,
            ignore_case,
        } => {
            config.matching.ignore_case |= ignore_case;
            commands::complete::run(config, &tokens)
        }
        Commands::Purge => commands::purge::run(config),
        Commands::Stat { output } => commands::stat::run(config, output),
        Commands::Config { write } => commands::config::run(config, write, cli.config.as_deref()),
    }
}
