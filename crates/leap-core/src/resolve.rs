//! Query resolution: from raw user tokens to a directory.
//!
//! The matcher runs up to three passes and the first non-empty result wins:
//!
//! 1. case-sensitive token matching (skipped when ignore-case is configured)
//! 2. case-insensitive token matching
//! 3. fuzzy matching on the last token
//!
//! Fuzzy matching is only a last resort because it is the pass most likely
//! to pick something the user did not mean.
//!
//! The last token is decoded with [`TabCodec`] first, so completion lines and
//! `needle<sep>N` selections printed by the shell integration come back
//! through the same entry points.

use crate::config::MatchingConfig;
use crate::error::Result;
use crate::matcher::{find_matches, MatchOptions};
use crate::platform::{normalize_path, PathProbe};
use crate::tab::{TabCodec, TabEntry};
use crate::types::Entry;
use std::path::Path;
use tracing::debug;

/// Resolves queries against a snapshot of the store.
pub struct Resolver<'a> {
    entries: Vec<Entry>,
    codec: TabCodec,
    ignore_case: bool,
    completion_count: usize,
    check_existence: bool,
    probe: &'a dyn PathProbe,
}

impl<'a> Resolver<'a> {
    /// Create a resolver over `entries`.
    pub fn new(entries: Vec<Entry>, matching: &MatchingConfig, probe: &'a dyn PathProbe) -> Result<Self> {
        Ok(Resolver {
            entries,
            codec: TabCodec::new(&matching.separator)?,
            ignore_case: matching.ignore_case,
            completion_count: matching.completion_count.max(1),
            check_existence: true,
            probe,
        })
    }

    /// Accept candidates whether or not they exist.
    pub fn with_check_existence(mut self, check_existence: bool) -> Self {
        self.check_existence = check_existence;
        self
    }

    /// Run the matching passes and return up to `max_matches` paths.
    pub fn candidates<S: AsRef<str>>(&self, tokens: &[S], max_matches: usize) -> Vec<String> {
        let base = MatchOptions::default()
            .max_matches(max_matches)
            .exclude(self.probe.current_dir())
            .check_existence(self.check_existence);

        if !self.ignore_case {
            let exact = find_matches(&self.entries, tokens, &base, self.probe);
            if !exact.is_empty() {
                return exact;
            }
        }

        let folded = base.clone().ignore_case(true);
        let insensitive = find_matches(&self.entries, tokens, &folded, self.probe);
        if !insensitive.is_empty() {
            return insensitive;
        }

        debug!("No token match, falling back to fuzzy matching");
        find_matches(&self.entries, tokens, &folded.fuzzy(true), self.probe)
    }

    /// Resolve a jump request to a single directory.
    pub fn jump<S: AsRef<str>>(&self, tokens: &[S]) -> Option<String> {
        let mut tokens = sanitize(tokens);
        let last = tokens.pop()?;

        match self.codec.parse(&last) {
            TabEntry::Path {
                needle,
                index,
                path,
            } => self.select(tokens, needle, index, Some(&path)),
            TabEntry::Index { needle, index } => self.select(tokens, needle, index, None),
            TabEntry::Redisplay { needle } => {
                tokens.push(needle);
                self.candidates(&tokens, 1).into_iter().next()
            }
            TabEntry::Plain(token) => {
                if tokens.is_empty() && Path::new(&token).is_absolute() && self.probe.exists(&token) {
                    return Some(token);
                }
                tokens.push(token);
                self.candidates(&tokens, 1).into_iter().next()
            }
        }
    }

    /// Produce completion lines for the shell.
    ///
    /// Each line is `<needle><sep><i><sep><path>` with `i` counting from 1.
    pub fn complete<S: AsRef<str>>(&self, tokens: &[S]) -> Vec<String> {
        let mut tokens = sanitize(tokens);
        let Some(last) = tokens.pop() else {
            return Vec::new();
        };

        match self.codec.parse(&last) {
            TabEntry::Path {
                needle,
                index,
                path,
            } => self
                .select(tokens, needle.clone(), index, Some(&path))
                .map(|path| vec![self.codec.format(&needle, index, &path)])
                .unwrap_or_default(),
            TabEntry::Index { needle, index } => self
                .select(tokens, needle.clone(), index, None)
                .map(|path| vec![self.codec.format(&needle, index, &path)])
                .unwrap_or_default(),
            TabEntry::Redisplay { needle } | TabEntry::Plain(needle) => {
                tokens.push(needle.clone());
                self.candidates(&tokens, self.completion_count)
                    .iter()
                    .enumerate()
                    .map(|(i, path)| self.codec.format(&needle, i + 1, path))
                    .collect()
            }
        }
    }

    /// Pick the `index`-th candidate (1-based) for `needle`.
    ///
    /// A path echoed back from a completion line is only a hint: it is
    /// returned when it is still among the candidates, otherwise the
    /// candidate at `index` is used. Either way the result has passed the
    /// same existence and current-directory checks as any other match.
    fn select(
        &self,
        mut tokens: Vec<String>,
        needle: String,
        index: usize,
        echoed: Option<&str>,
    ) -> Option<String> {
        tokens.push(needle);
        let found = self.candidates(&tokens, self.completion_count.max(index));
        if let Some(echoed) = echoed.map(normalize_path) {
            if found.contains(&echoed) {
                return Some(echoed);
            }
            debug!(path = %echoed, "Completion path is no longer a candidate");
        }
        found.into_iter().nth(index - 1)
    }
}

/// Strip trailing separators from tokens and drop empty ones.
fn sanitize<S: AsRef<str>>(tokens: &[S]) -> Vec<String> {
    tokens
        .iter()
        .map(|t| t.as_ref())
        .filter(|t| !t.is_empty())
        .map(normalize_path)
        .collect()
}
