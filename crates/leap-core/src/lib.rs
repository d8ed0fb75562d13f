//! # Leap Core Library
//!
//! This crate provides the weighted directory store and the query matcher
//! behind the `leap` command. It has no terminal or shell knowledge: callers
//! hand it a configuration and a list of query tokens and get back paths.
//!
//! ## Architecture
//!
//! - **Types** (`types`): Entries and the weight arithmetic
//! - **Store** (`store`): Durable path to weight mapping with backup recovery
//! - **Matcher** (`matcher`): Token, case-insensitive and fuzzy matching
//! - **Tab** (`tab`): Completion lines embedded in query tokens
//! - **Resolve** (`resolve`): Pass ordering and completion handling
//! - **Platform** (`platform`): Filesystem probing and path normalisation
//! - **Config** (`config`): Configuration management
//!
//! ## Example
//!
//! ```rust,no_run
//! use leap_core::{Config, LocalProbe, Resolver, StoreOptions, WeightedPathStore};
//!
//! let config = Config::load()?;
//! let mut store = WeightedPathStore::open(StoreOptions::from_config(&config)?);
//! let probe = LocalProbe::new();
//!
//! let resolver = Resolver::new(store.entries_by_weight(), &config.matching, &probe)?;
//! if let Some(path) = resolver.jump(&["proj", "leap"]) {
//!     println!("{}", path);
//! }
//! store.maintenance();
//! # Ok::<(), leap_core::LeapError>(())
//! ```

pub mod config;
pub mod error;
pub mod matcher;
pub mod platform;
pub mod resolve;
pub mod store;
pub mod tab;
pub mod types;

// Re-export commonly used types
pub use config::Config;
pub use error::{LeapError, Result};
pub use matcher::{find_matches, MatchOptions};
pub use platform::{LocalProbe, PathProbe, StaticProbe};
pub use resolve::Resolver;
pub use store::{SaveOutcome, StoreOptions, StoreStats, WeightedPathStore};
pub use tab::{TabCodec, TabEntry};
pub use types::Entry;
