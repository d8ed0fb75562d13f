//! Pattern matching over a weighted snapshot.
//!
//! Two matchers are provided:
//!
//! - **Token matching** ([`find_matches`] with `fuzzy = false`): every token
//!   must occur in the candidate path, in order. All tokens but the last
//!   consume the text they match, so two tokens never match the same
//!   characters. The last token is end-anchored: it must occur within the
//!   trailing path segments, as many as the token itself spans.
//! - **Fuzzy matching** (`fuzzy = true`): the last token is compared against
//!   the final segment of every path using a sequence-similarity ratio.
//!
//! Candidates are visited heaviest first and the filesystem is only probed
//! for candidates that already matched, so a query never stats the whole
//! database.

use crate::platform::{last_segment, PathProbe};
use crate::types::Entry;
use similar::TextDiff;
use std::collections::HashSet;
use tracing::debug;

/// Minimum similarity ratio for a fuzzy candidate.
pub const FUZZY_CUTOFF: f32 = 0.6;

/// Options for a single matching pass.
#[derive(Debug, Clone)]
pub struct MatchOptions {
    /// Compare lower-cased paths and tokens
    pub ignore_case: bool,

    /// Use similarity matching on the last token instead of token matching
    pub fuzzy: bool,

    /// Maximum number of results
    pub max_matches: usize,

    /// Path that is only returned when nothing else matches
    pub exclude: Option<String>,

    /// Require candidates to exist on the filesystem
    pub check_existence: bool,
}

impl Default for MatchOptions {
    fn default() -> Self {
        MatchOptions {
            ignore_case: false,
            fuzzy: false,
            max_matches: 1,
            exclude: None,
            check_existence: true,
        }
    }
}

impl MatchOptions {
    /// Set case-insensitive comparison.
    pub fn ignore_case(mut self, ignore_case: bool) -> Self {
        self.ignore_case = ignore_case;
        self
    }

    /// Set fuzzy matching.
    pub fn fuzzy(mut self, fuzzy: bool) -> Self {
        self.fuzzy = fuzzy;
        self
    }

    /// Set the maximum number of results.
    pub fn max_matches(mut self, max_matches: usize) -> Self {
        self.max_matches = max_matches.max(1);
        self
    }

    /// Set the path to avoid, usually the working directory.
    pub fn exclude(mut self, exclude: Option<String>) -> Self {
        self.exclude = exclude;
        self
    }

    /// Set whether candidates must exist.
    pub fn check_existence(mut self, check_existence: bool) -> Self {
        self.check_existence = check_existence;
        self
    }
}

/// Find the best candidates for `tokens`, heaviest first.
///
/// `entries` does not need to be sorted. An empty token list matches nothing.
pub fn find_matches<S: AsRef<str>>(
    entries: &[Entry],
    tokens: &[S],
    options: &MatchOptions,
    probe: &dyn PathProbe,
) -> Vec<String> {
    if tokens.is_empty() {
        return Vec::new();
    }

    let mut ranked: Vec<&Entry> = entries.iter().collect();
    ranked.sort_by(|a, b| a.rank_cmp(b));

    let tokens: Vec<String> = tokens
        .iter()
        .map(|t| fold_case(t.as_ref(), options.ignore_case))
        .collect();

    if options.fuzzy {
        return fuzzy_match(&ranked, &tokens[tokens.len() - 1], options, probe)
            .into_iter()
            .collect();
    }

    let mut results: Vec<String> = Vec::new();
    let mut excluded_matched = false;

    for entry in ranked {
        let haystack = fold_case(&entry.path, options.ignore_case);
        if !matches_tokens(&haystack, &tokens) {
            continue;
        }

        match check_candidate(&entry.path, options, probe) {
            Candidate::Rejected => continue,
            Candidate::Excluded => {
                excluded_matched = true;
                continue;
            }
            Candidate::Accepted => {}
        }

        if !results.contains(&entry.path) {
            results.push(entry.path.clone());
        }
        if results.len() >= options.max_matches {
            break;
        }
    }

    if results.is_empty() && excluded_matched {
        if let Some(ref exclude) = options.exclude {
            debug!(path = %exclude, "Only the excluded directory matched");
            results.push(exclude.clone());
        }
    }

    results
}

/// Check that every token occurs in `path`, in order.
///
/// Inputs must already be case-folded.
pub fn matches_tokens<S: AsRef<str>>(path: &str, tokens: &[S]) -> bool {
    let mut remaining = path;

    for (n, token) in tokens.iter().enumerate() {
        let token = token.as_ref();
        if n + 1 == tokens.len() {
            let window = tail_segments(remaining, token.matches('/').count() + 1);
            return window.contains(token);
        }

        match remaining.find(token) {
            Some(idx) => remaining = &remaining[idx + token.len()..],
            None => return false,
        }
    }

    true
}

/// The last `count` `/`-delimited segments of `path`, or all of it.
fn tail_segments(path: &str, count: usize) -> &str {
    path.rmatch_indices('/')
        .nth(count.saturating_sub(1))
        .map(|(idx, _)| &path[idx + 1..])
        .unwrap_or(path)
}

fn fold_case(text: &str, ignore_case: bool) -> String {
    if ignore_case {
        text.to_lowercase()
    } else {
        text.to_string()
    }
}

enum Candidate {
    Accepted,
    Excluded,
    Rejected,
}

/// Existence and self-jump check. Runs only for candidates that matched.
fn check_candidate(path: &str, options: &MatchOptions, probe: &dyn PathProbe) -> Candidate {
    if options.check_existence && !probe.exists(path) {
        return Candidate::Rejected;
    }

    if let Some(ref exclude) = options.exclude {
        if path == exclude || probe.canonicalize(path).as_deref() == Some(exclude.as_str()) {
            return Candidate::Excluded;
        }
    }

    Candidate::Accepted
}

/// Similarity ratio between two strings, in `[0, 1]`.
pub fn similarity(a: &str, b: &str) -> f32 {
    TextDiff::from_chars(a, b).ratio()
}

/// Best fuzzy candidate for `token` among final path segments.
///
/// Each segment maps to the heaviest path that ends with it. Candidates are
/// tried from the best ratio down until one passes the checks. Among equal
/// ratios the heavier path wins.
fn fuzzy_match(
    ranked: &[&Entry],
    token: &str,
    options: &MatchOptions,
    probe: &dyn PathProbe,
) -> Option<String> {
    let mut seen = HashSet::new();
    let mut pool: Vec<(f32, String, &str)> = Vec::new();
    for entry in ranked {
        let key = fold_case(last_segment(&entry.path), options.ignore_case);
        if !seen.insert(key.clone()) {
            continue;
        }
        let ratio = similarity(token, &key);
        if ratio >= FUZZY_CUTOFF {
            pool.push((ratio, key, entry.path.as_str()));
        }
    }

    // Stable sort keeps weight order among equal ratios.
    pool.sort_by(|a, b| b.0.total_cmp(&a.0));

    for (ratio, key, path) in pool {
        match check_candidate(path, options, probe) {
            Candidate::Accepted => {
                debug!(token = %token, key = %key, ratio, path = %path, "Fuzzy match");
                return Some(path.to_string());
            }
            Candidate::Excluded | Candidate::Rejected => continue,
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::StaticProbe;

    fn mail_and_work() -> Vec<Entry> {
        vec![
            Entry::new("/home/user/work/inbox", 10.0),
            Entry::new("/home/user/mail/inbox", 30.0),
        ]
    }

    fn opts() -> MatchOptions {
        MatchOptions::default()
    }

    #[test]
    fn test_heaviest_match_first() {
        let probe = StaticProbe::permissive();
        let found = find_matches(&mail_and_work(), &["in"], &opts(), &probe);
        assert_eq!(found, vec!["/home/user/mail/inbox"]);

        let found = find_matches(&mail_and_work(), &["in"], &opts().max_matches(5), &probe);
        assert_eq!(found, vec!["/home/user/mail/inbox", "/home/user/work/inbox"]);
    }

    #[test]
    fn test_multiple_tokens() {
        let probe = StaticProbe::permissive();
        let found = find_matches(&mail_and_work(), &["w", "in"], &opts(), &probe);
        assert_eq!(found, vec!["/home/user/work/inbox"]);
    }

    #[test]
    fn test_empty_tokens_match_nothing() {
        let probe = StaticProbe::permissive();
        let tokens: [&str; 0] = [];
        assert!(find_matches(&mail_and_work(), &tokens, &opts(), &probe).is_empty());
    }

    #[test]
    fn test_last_token_is_end_anchored() {
        assert!(matches_tokens("/home/user/projects/leap", &["leap"]));
        assert!(!matches_tokens("/home/user/projects/leap", &["proj"]));
        assert!(matches_tokens("/home/user/projects/leap", &["ects/le"]));
        assert!(matches_tokens("/home/user/projects/leap", &["proj", "leap"]));
        assert!(!matches_tokens("/home/user/projects/leap", &["user/proj"]));
    }

    #[test]
    fn test_tokens_consume_matched_text() {
        // "foo" cannot be matched twice by the same characters.
        assert!(!matches_tokens("/srv/foo", &["foo", "foo"]));
        assert!(matches_tokens("/srv/foo/foo", &["foo", "foo"]));
        // Order matters.
        assert!(!matches_tokens("/b/a", &["a", "b"]));
    }

    #[test]
    fn test_tail_segments() {
        assert_eq!(tail_segments("/a/b/c", 1), "c");
        assert_eq!(tail_segments("/a/b/c", 2), "b/c");
        assert_eq!(tail_segments("/a/b/c", 3), "a/b/c");
        assert_eq!(tail_segments("/a/b/c", 4), "/a/b/c");
        assert_eq!(tail_segments("c", 1), "c");
    }

    #[test]
    fn test_ignore_case() {
        let entries = vec![Entry::new("/home/user/Documents", 10.0)];
        let probe = StaticProbe::permissive();

        assert!(find_matches(&entries, &["docu"], &opts(), &probe).is_empty());
        let found = find_matches(&entries, &["docu"], &opts().ignore_case(true), &probe);
        assert_eq!(found, vec!["/home/user/Documents"]);
    }

    #[test]
    fn test_missing_directories_are_skipped() {
        let probe = StaticProbe::new().with_paths(["/home/user/work/inbox"]);
        let found = find_matches(&mail_and_work(), &["in"], &opts(), &probe);
        assert_eq!(found, vec!["/home/user/work/inbox"]);

        let found = find_matches(
            &mail_and_work(),
            &["in"],
            &opts().check_existence(false),
            &StaticProbe::new(),
        );
        assert_eq!(found, vec!["/home/user/mail/inbox"]);
    }

    #[test]
    fn test_current_directory_is_a_last_resort() {
        let probe = StaticProbe::permissive();
        let options = opts().exclude(Some("/home/user/mail/inbox".to_string()));
        let found = find_matches(&mail_and_work(), &["in"], &options, &probe);
        assert_eq!(found, vec!["/home/user/work/inbox"]);

        let options = opts().exclude(Some("/home/user/work/inbox".to_string()));
        let found = find_matches(&mail_and_work(), &["w", "in"], &options, &probe);
        assert_eq!(found, vec!["/home/user/work/inbox"]);
    }

    #[test]
    fn test_fuzzy_match() {
        let entries = vec![
            Entry::new("/home/user/projects", 10.0),
            Entry::new("/home/user/music", 20.0),
        ];
        let probe = StaticProbe::permissive();
        let found = find_matches(&entries, &["projcts"], &opts().fuzzy(true), &probe);
        assert_eq!(found, vec!["/home/user/projects"]);

        let found = find_matches(&entries, &["zzzz"], &opts().fuzzy(true), &probe);
        assert!(found.is_empty());
    }

    #[test]
    fn test_fuzzy_returns_at_most_one() {
        let entries = vec![
            Entry::new("/a/leap", 10.0),
            Entry::new("/b/leap", 5.0),
            Entry::new("/c/leaps", 1.0),
        ];
        let probe = StaticProbe::permissive();
        let found = find_matches(&entries, &["lep"], &opts().fuzzy(true).max_matches(9), &probe);
        assert_eq!(found, vec!["/a/leap"]);
    }

    #[test]
    fn test_fuzzy_with_many_paths_sharing_a_segment() {
        let mut entries: Vec<Entry> = (0..500)
            .map(|i| Entry::new(format!("/srv/{i}/build"), 1000.0 - i as f64))
            .collect();
        entries.push(Entry::new("/home/user/builds", 2000.0));
        entries.sort_by(Entry::rank_cmp);

        let probe = StaticProbe::permissive();
        let found = find_matches(&entries, &["buidl"], &opts().fuzzy(true), &probe);
        assert_eq!(found, vec!["/srv/0/build"]);
    }

    #[test]
    fn test_fuzzy_skips_rejected_candidates() {
        let entries = vec![
            Entry::new("/a/projects", 10.0),
            Entry::new("/b/project", 5.0),
        ];
        let probe = StaticProbe::new().with_paths(["/b/project"]);
        let found = find_matches(&entries, &["projects"], &opts().fuzzy(true), &probe);
        assert_eq!(found, vec!["/b/project"]);

        let probe = StaticProbe::permissive();
        let options = opts().fuzzy(true).exclude(Some("/a/projects".to_string()));
        let found = find_matches(&entries, &["projects"], &options, &probe);
        assert_eq!(found, vec!["/b/project"]);
    }

    #[test]
    fn test_similarity() {
        assert_eq!(similarity("abc", "abc"), 1.0);
        assert_eq!(similarity("abc", "xyz"), 0.0);
        assert!(similarity("projcts", "projects") >= FUZZY_CUTOFF);
    }
}
