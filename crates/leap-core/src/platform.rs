//! Filesystem probing and path normalisation.
//!
//! The store and the matcher never touch the filesystem directly to ask
//! "does this directory exist" or "where am I". They go through a
//! [`PathProbe`], which keeps the matching logic OS-agnostic and lets tests
//! describe a filesystem without creating one.
//!
//! ## Implementing a New Probe
//!
//! Implement [`PathProbe`] for your type. `exists` must be cheap enough to be
//! called once per candidate; the matcher only calls it for candidates that
//! already matched every token.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, MAIN_SEPARATOR};

/// Interface to the filesystem as seen by the matcher and the store.
pub trait PathProbe {
    /// Returns true if `path` currently exists.
    fn exists(&self, path: &str) -> bool;

    /// The process's current working directory, if it can be determined.
    fn current_dir(&self) -> Option<String>;

    /// Resolve symlinks and relative components.
    fn canonicalize(&self, path: &str) -> Option<String>;

    /// Name of this probe, for logging
    fn name(&self) -> &'static str;
}

/// Probe backed by the real local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalProbe;

impl LocalProbe {
    /// Create a new local probe.
    pub fn new() -> Self {
        LocalProbe
    }
}

impl PathProbe for LocalProbe {
    fn exists(&self, path: &str) -> bool {
        Path::new(path).exists()
    }

    fn current_dir(&self) -> Option<String> {
        std::env::current_dir()
            .ok()
            .map(|p| normalize_path(&p.to_string_lossy()))
    }

    fn canonicalize(&self, path: &str) -> Option<String> {
        fs::canonicalize(path)
            .ok()
            .map(|p| normalize_path(&p.to_string_lossy()))
    }

    fn name(&self) -> &'static str {
        "local"
    }
}

/// In-memory probe with a fixed set of existing paths, for tests.
///
/// `canonicalize` only normalises.
#[derive(Debug, Default, Clone)]
pub struct StaticProbe {
    existing: HashSet<String>,
    cwd: Option<String>,
    assume_exists: bool,
}

impl StaticProbe {
    /// Create a probe where nothing exists.
    pub fn new() -> Self {
        StaticProbe::default()
    }

    /// Create a probe where every path exists.
    pub fn permissive() -> Self {
        StaticProbe {
            assume_exists: true,
            ..StaticProbe::default()
        }
    }

    /// Mark paths as existing.
    pub fn with_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.existing
            .extend(paths.into_iter().map(|p| normalize_path(p.as_ref())));
        self
    }

    /// Set the reported working directory.
    pub fn with_cwd(mut self, cwd: impl AsRef<str>) -> Self {
        self.cwd = Some(normalize_path(cwd.as_ref()));
        self
    }
}

impl PathProbe for StaticProbe {
    fn exists(&self, path: &str) -> bool {
        self.assume_exists || self.existing.contains(path)
    }

    fn current_dir(&self) -> Option<String> {
        self.cwd.clone()
    }

    fn canonicalize(&self, path: &str) -> Option<String> {
        Some(normalize_path(path))
    }

    fn name(&self) -> &'static str {
        "static"
    }
}

/// Strip trailing separators. The filesystem root keeps its single separator.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim_end_matches(['/', MAIN_SEPARATOR]);
    if trimmed.is_empty() && !path.is_empty() {
        path[..1].to_string()
    } else {
        trimmed.to_string()
    }
}

/// Final `/`-delimited segment of a path.
pub fn last_segment(path: &str) -> &str {
    path.rsplit(['/', MAIN_SEPARATOR]).next().unwrap_or(path)
}

/// Path to record when a directory is added.
///
/// Symlinks are resolved unless `keep_symlinks` is set; if resolution fails
/// (for example because the directory was already removed) the normalised
/// input is used.
pub fn resolve_for_add(path: &str, keep_symlinks: bool, probe: &dyn PathProbe) -> String {
    if keep_symlinks {
        return normalize_path(path);
    }
    probe
        .canonicalize(path)
        .unwrap_or_else(|| normalize_path(path))
}

/// Returns true if `target` exists and belongs to a different user than
/// `reference`.
///
/// `reference` should be a file the current process just created, so its
/// owner is the current user. Always false on platforms without unix
/// ownership.
#[cfg(unix)]
pub fn owned_by_other_user(target: &Path, reference: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    match (fs::metadata(target), fs::metadata(reference)) {
        (Ok(target_meta), Ok(reference_meta)) => target_meta.uid() != reference_meta.uid(),
        _ => false,
    }
}

#[cfg(not(unix))]
pub fn owned_by_other_user(_target: &Path, _reference: &Path) -> bool {
    false
}
