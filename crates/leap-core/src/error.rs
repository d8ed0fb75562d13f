//! Error types for Leap core operations.
//!
//! Most failures inside the store are absorbed (a broken database falls back
//! to its backup, a failed save is logged and retried on the next write), so
//! these errors mostly travel between internal layers. The CLI wraps them in
//! `anyhow` at the command boundary.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using LeapError
pub type Result<T> = std::result::Result<T, LeapError>;

/// Core error types for Leap operations.
#[derive(Error, Debug)]
pub enum LeapError {
    // === Database Errors ===
    /// A line of the database file could not be parsed
    #[error("database {path} is corrupted at line {line}: {reason}")]
    DatabaseCorrupted {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The database file belongs to another user and must not be replaced
    #[error("database {path} is owned by another user")]
    ForeignOwner { path: PathBuf },

    // === Matching Errors ===
    /// The tab-completion separator could not be compiled into a pattern
    #[error("invalid pattern: {pattern}: {reason}")]
    InvalidPattern { pattern: String, reason: String },

    // === Configuration Errors ===
    /// Configuration file parsing failed or a required location is unknown
    #[error("configuration error: {reason}")]
    ConfigError { reason: String },

    // === I/O Errors ===
    /// Generic I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl LeapError {
    /// Returns true if loading can recover from this error by trying the
    /// backup file or starting empty.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            LeapError::Io(_) | LeapError::DatabaseCorrupted { .. }
        )
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        LeapError::ConfigError {
            reason: reason.into(),
        }
    }
}
