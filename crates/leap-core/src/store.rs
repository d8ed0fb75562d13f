//! Durable weighted directory store.
//!
//! The database is a UTF-8 text file with one entry per line:
//!
//! ```text
//! <weight>\t<absolute path>\n
//! ```
//!
//! There is no header and order carries no meaning, although saves always
//! write the heaviest entries first so the file reads well by eye.
//!
//! ## Durability
//!
//! - Loads never fail: a missing or unparsable database is replaced by its
//!   backup, and if that fails too the store starts empty.
//! - Saves write a temporary file in the database directory, sync it, then
//!   rename it over the database. A reader never sees a partial file.
//! - A database owned by another user is never replaced.
//! - The backup is refreshed from the freshly saved database when it is
//!   missing or older than the backup window.
//!
//! Concurrent invocations are last-writer-wins: each process reads the whole
//! file, mutates its copy and writes the whole file back.

use crate::config::Config;
use crate::error::{LeapError, Result};
use crate::platform::{normalize_path, owned_by_other_user, PathProbe};
use crate::types::{decay_weight, eviction_count, grow_weight, shrink_weight, Entry};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

/// Where the store keeps its files and how it maintains itself.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Primary database file
    pub data_file: PathBuf,

    /// Backup copy of the database
    pub backup_file: PathBuf,

    /// Directory that is never stored or weighted
    pub home: Option<String>,

    /// Minimum backup age before it is refreshed
    pub backup_window: Duration,

    /// Entry count above which maintenance evicts
    pub max_entries: usize,
}

impl StoreOptions {
    /// Options for a database at `data_file`, with the backup next to it and
    /// default housekeeping settings.
    pub fn new(data_file: impl Into<PathBuf>) -> Self {
        let data_file = data_file.into();
        let mut backup = data_file.as_os_str().to_os_string();
        backup.push(".bak");
        StoreOptions {
            data_file,
            backup_file: PathBuf::from(backup),
            home: None,
            backup_window: Duration::hours(24),
            max_entries: 1000,
        }
    }

    /// Set the home directory that is never weighted.
    pub fn with_home(mut self, home: impl AsRef<str>) -> Self {
        self.home = Some(normalize_path(home.as_ref()));
        self
    }

    /// Set the eviction ceiling.
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries;
        self
    }

    /// Set the backup refresh window.
    pub fn with_backup_window(mut self, window: Duration) -> Self {
        self.backup_window = window;
        self
    }

    /// Build options from the resolved configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let home = config.home_dir()?;
        let backup_window = i64::try_from(config.general.backup_window_hours)
            .ok()
            .and_then(Duration::try_hours)
            .ok_or_else(|| LeapError::config("general.backup_window_hours is too large"))?;
        Ok(StoreOptions {
            data_file: config.data_file()?,
            backup_file: config.backup_file()?,
            home: Some(normalize_path(&home.to_string_lossy())),
            backup_window,
            max_entries: config.general.max_entries,
        })
    }
}

/// What happened to a save request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The database was replaced
    Saved {
        /// Whether the backup was refreshed as well
        backup_refreshed: bool,
    },

    /// The database belongs to another user and was left alone
    SkippedForeignOwner,

    /// Writing failed; the previous database is untouched
    Failed(String),
}

/// Summary of the store contents.
#[derive(Debug, Clone)]
pub struct StoreStats {
    /// Number of entries
    pub entries: usize,

    /// Sum of all weights
    pub total_weight: f64,

    /// Location of the database
    pub data_file: PathBuf,
}

/// Mapping from directory path to weight, persisted to a text file.
///
/// ## Example
///
/// ```rust,no_run
/// use leap_core::{StoreOptions, WeightedPathStore};
///
/// let mut store = WeightedPathStore::open(
///     StoreOptions::new("/tmp/leap.txt").with_home("/home/me"),
/// );
/// store.add("/home/me/projects/leap", 10.0);
/// assert!(store.weight("/home/me/projects/leap") > 0.0);
/// ```
#[derive(Debug)]
pub struct WeightedPathStore {
    options: StoreOptions,
    entries: HashMap<String, f64>,
}

impl WeightedPathStore {
    /// Create an empty store without touching the disk.
    pub fn new(options: StoreOptions) -> Self {
        WeightedPathStore {
            options,
            entries: HashMap::new(),
        }
    }

    /// Create a store and hydrate it from disk.
    pub fn open(options: StoreOptions) -> Self {
        let mut store = Self::new(options);
        store.load();
        store
    }

    /// Get the path to the primary database file.
    pub fn data_file(&self) -> &Path {
        &self.options.data_file
    }

    /// Get the path to the backup file.
    pub fn backup_file(&self) -> &Path {
        &self.options.backup_file
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace the in-memory state with the database contents.
    ///
    /// On failure the backup is copied over the database and the read is
    /// retried once. If that fails as well the store is left empty.
    pub fn load(&mut self) {
        let data_file = self.options.data_file.clone();

        match read_database(&data_file) {
            Ok(entries) => {
                debug!(path = %data_file.display(), entries = entries.len(), "Loaded database");
                self.entries = entries;
                return;
            }
            Err(LeapError::Io(ref e)) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %data_file.display(), "Database not found");
            }
            Err(e) if e.is_recoverable() => {
                warn!(path = %data_file.display(), error = %e, "Failed to read database");
            }
            Err(e) => {
                warn!(path = %data_file.display(), error = %e, "Database is unusable, starting empty");
                self.entries = HashMap::new();
                return;
            }
        }

        self.entries = match self.recover_from_backup() {
            Ok(entries) => {
                info!(
                    backup = %self.options.backup_file.display(),
                    entries = entries.len(),
                    "Recovered database from backup"
                );
                entries
            }
            Err(e) => {
                debug!(error = %e, "No usable backup, starting with an empty database");
                HashMap::new()
            }
        };
    }

    fn recover_from_backup(&self) -> Result<HashMap<String, f64>> {
        fs::copy(&self.options.backup_file, &self.options.data_file)?;
        read_database(&self.options.data_file)
    }

    /// Write the whole store to disk.
    ///
    /// Never returns an error: failures are logged and reported through the
    /// outcome, and the existing database is left as it was.
    pub fn save(&self) -> SaveOutcome {
        let data_file = &self.options.data_file;
        let dir = match data_file.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };

        if let Err(e) = fs::create_dir_all(&dir) {
            warn!(dir = %dir.display(), error = %e, "Cannot create database directory, skipping save");
            return SaveOutcome::Failed(e.to_string());
        }

        let temp = match NamedTempFile::new_in(&dir) {
            Ok(temp) => temp,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Cannot create temporary file, skipping save");
                return SaveOutcome::Failed(e.to_string());
            }
        };

        if data_file.exists() && owned_by_other_user(data_file, temp.path()) {
            warn!(
                path = %data_file.display(),
                "{}",
                LeapError::ForeignOwner { path: data_file.clone() }
            );
            return SaveOutcome::SkippedForeignOwner;
        }

        if let Err(e) = self.write_and_replace(temp) {
            warn!(path = %data_file.display(), error = %e, "Failed to save database");
            return SaveOutcome::Failed(e.to_string());
        }

        debug!(path = %data_file.display(), entries = self.entries.len(), "Database saved");

        let backup_refreshed = self.refresh_backup();
        SaveOutcome::Saved { backup_refreshed }
    }

    fn write_and_replace(&self, mut temp: NamedTempFile) -> Result<()> {
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            for entry in self.entries_by_weight() {
                writeln!(writer, "{}\t{}", entry.weight, entry.path)?;
            }
            writer.flush()?;
        }
        temp.as_file().sync_all()?;
        temp.persist(&self.options.data_file)
            .map_err(|e| LeapError::Io(e.error))?;
        Ok(())
    }

    /// Copy the database over the backup if the backup is missing or stale.
    fn refresh_backup(&self) -> bool {
        if !self.backup_is_stale() {
            return false;
        }

        match fs::copy(&self.options.data_file, &self.options.backup_file) {
            Ok(_) => {
                debug!(backup = %self.options.backup_file.display(), "Backup refreshed");
                true
            }
            Err(e) => {
                warn!(backup = %self.options.backup_file.display(), error = %e, "Failed to refresh backup");
                false
            }
        }
    }

    fn backup_is_stale(&self) -> bool {
        let modified = match fs::metadata(&self.options.backup_file).and_then(|m| m.modified()) {
            Ok(modified) => DateTime::<Utc>::from(modified),
            Err(_) => return true,
        };
        Utc::now().signed_duration_since(modified) > self.options.backup_window
    }

    fn is_home(&self, path: &str) -> bool {
        self.options.home.as_deref() == Some(path)
    }

    /// Record a visit to `path`.
    ///
    /// Existing weights grow in quadrature with `increment`; new paths start
    /// at `increment`. Returns the updated entry, or `None` for the home
    /// directory, which is never weighted.
    pub fn add(&mut self, path: &str, increment: f64) -> Option<Entry> {
        let path = normalize_path(path);
        if path.is_empty() || self.is_home(&path) {
            debug!(path = %path, "Ignoring add");
            return None;
        }

        let weight = grow_weight(self.weight(&path), increment);
        self.entries.insert(path.clone(), weight);
        self.save();
        Some(Entry::new(path, weight))
    }

    /// Lower the weight of `path`, stopping at zero.
    ///
    /// Unknown paths are treated as weight zero and are not inserted.
    /// Returns `None` for the home directory.
    pub fn decrease(&mut self, path: &str, decrement: f64) -> Option<Entry> {
        let path = normalize_path(path);
        if path.is_empty() || self.is_home(&path) {
            debug!(path = %path, "Ignoring decrease");
            return None;
        }

        let weight = shrink_weight(self.weight(&path), decrement);
        if let Some(existing) = self.entries.get_mut(&path) {
            *existing = weight;
        }
        self.save();
        Some(Entry::new(path, weight))
    }

    /// Stored weight of `path`, or 0 if absent.
    pub fn weight(&self, path: &str) -> f64 {
        self.entries
            .get(path)
            .or_else(|| self.entries.get(&normalize_path(path)))
            .copied()
            .unwrap_or(0.0)
    }

    /// Decay every weight and evict the lightest entries when over capacity.
    ///
    /// Returns the number of evicted entries. The database is only written
    /// when something was evicted.
    pub fn maintenance(&mut self) -> usize {
        for weight in self.entries.values_mut() {
            *weight = decay_weight(*weight);
        }

        let evict = eviction_count(self.entries.len(), self.options.max_entries);
        if evict == 0 {
            return 0;
        }

        let mut lightest = self.entries_by_weight();
        lightest.reverse();
        for entry in lightest.into_iter().take(evict) {
            self.entries.remove(&entry.path);
        }

        info!(evicted = evict, remaining = self.entries.len(), "Evicted lightest entries");
        self.save();
        evict
    }

    /// Remove every entry whose directory no longer exists.
    ///
    /// Always saves. Returns the removed paths, sorted.
    pub fn purge(&mut self, probe: &dyn PathProbe) -> Vec<String> {
        let mut removed: Vec<String> = self
            .entries
            .keys()
            .filter(|path| !probe.exists(path))
            .cloned()
            .collect();
        removed.sort();

        for path in &removed {
            self.entries.remove(path);
        }

        info!(removed = removed.len(), probe = probe.name(), "Purged missing directories");
        self.save();
        removed
    }

    /// Snapshot of all entries, heaviest first.
    pub fn entries_by_weight(&self) -> Vec<Entry> {
        let mut entries: Vec<Entry> = self
            .entries
            .iter()
            .map(|(path, weight)| Entry::new(path.clone(), *weight))
            .collect();
        entries.sort_by(Entry::rank_cmp);
        entries
    }

    /// Summary statistics.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            entries: self.entries.len(),
            total_weight: self.entries.values().sum(),
            data_file: self.options.data_file.clone(),
        }
    }
}

/// Parse a database file.
///
/// Blank lines are skipped. Any other line that is not `<weight>\t<path>`
/// with a finite, non-negative weight makes the whole file invalid.
/// Duplicate paths keep the larger weight.
fn read_database(path: &Path) -> Result<HashMap<String, f64>> {
    let contents = fs::read_to_string(path)?;
    let mut entries = HashMap::new();

    for (idx, line) in contents.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let corrupted = |reason: &str| LeapError::DatabaseCorrupted {
            path: path.to_path_buf(),
            line: idx + 1,
            reason: reason.to_string(),
        };

        let (weight, entry_path) = line
            .split_once('\t')
            .ok_or_else(|| corrupted("missing tab separator"))?;
        let weight: f64 = weight
            .trim()
            .parse()
            .map_err(|_| corrupted("weight is not a number"))?;
        if !weight.is_finite() || weight < 0.0 {
            return Err(corrupted("weight out of range"));
        }
        let entry_path = normalize_path(entry_path);
        if entry_path.is_empty() {
            return Err(corrupted("empty path"));
        }

        let slot = entries.entry(entry_path).or_insert(weight);
        if weight > *slot {
            *slot = weight;
        }
    }

    Ok(entries)
}
