//! Tab-completion encoding carried inside query tokens.
//!
//! Shell integrations complete a query by printing one line per candidate:
//!
//! ```text
//! <needle><sep><index><sep><path>
//! ```
//!
//! where `<index>` is 1-based. Whatever the user then submits comes back as
//! the last query token, in one of these shapes:
//!
//! | token                         | meaning                               |
//! |-------------------------------|---------------------------------------|
//! | `needle<sep>3<sep>/some/path` | a completion line, jump to the path   |
//! | `needle<sep>3`                | the third candidate for `needle`      |
//! | `needle<sep>`                 | show the candidates for `needle` again|
//! | anything else                 | an ordinary token                     |
//!
//! The first `<sep><digits>` in the token decides the shape. Text after the
//! digits that does not start with another separator is ignored, so
//! `needle<sep>2b` selects the second candidate for `needle`.

use crate::error::{LeapError, Result};
use regex::Regex;

/// Decoded form of the last query token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabEntry {
    /// A full completion line: jump straight to `path`.
    Path {
        needle: String,
        index: usize,
        path: String,
    },

    /// Pick the `index`-th (1-based) candidate for `needle`.
    Index { needle: String, index: usize },

    /// Redisplay the candidates for `needle`.
    Redisplay { needle: String },

    /// No completion suffix.
    Plain(String),
}

impl TabEntry {
    /// The needle to match with, whichever shape the token had.
    pub fn needle(&self) -> &str {
        match self {
            TabEntry::Path { needle, .. }
            | TabEntry::Index { needle, .. }
            | TabEntry::Redisplay { needle } => needle,
            TabEntry::Plain(token) => token,
        }
    }
}

/// Parser and formatter for completion tokens with a fixed separator.
#[derive(Debug, Clone)]
pub struct TabCodec {
    separator: String,
    pattern: Regex,
}

impl TabCodec {
    /// Build a codec for `separator`.
    pub fn new(separator: &str) -> Result<Self> {
        if separator.is_empty() {
            return Err(LeapError::InvalidPattern {
                pattern: separator.to_string(),
                reason: "separator must not be empty".to_string(),
            });
        }

        let sep = regex::escape(separator);
        let source = format!(r"^(?s)(?P<needle>.*?){sep}(?P<index>[0-9]+)(?:{sep}(?P<path>.*))?");
        let pattern = Regex::new(&source).map_err(|e| LeapError::InvalidPattern {
            pattern: source.clone(),
            reason: e.to_string(),
        })?;

        Ok(TabCodec {
            separator: separator.to_string(),
            pattern,
        })
    }

    /// Decode a token.
    ///
    /// An index of 0 or one too large to represent is not a valid selection,
    /// so such tokens are treated as plain.
    pub fn parse(&self, token: &str) -> TabEntry {
        if let Some(caps) = self.pattern.captures(token) {
            let needle = caps["needle"].to_string();
            if let Some(index) = caps["index"].parse::<usize>().ok().filter(|i| *i > 0) {
                return match caps.name("path") {
                    Some(path) if !path.as_str().is_empty() => TabEntry::Path {
                        needle,
                        index,
                        path: path.as_str().to_string(),
                    },
                    _ => TabEntry::Index { needle, index },
                };
            }
        }

        if let Some(needle) = token.strip_suffix(self.separator.as_str()) {
            return TabEntry::Redisplay {
                needle: needle.to_string(),
            };
        }

        TabEntry::Plain(token.to_string())
    }

    /// Format one completion line. `index` is 1-based.
    pub fn format(&self, needle: &str, index: usize, path: &str) -> String {
        format!("{needle}{sep}{index}{sep}{path}", sep = self.separator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TabCodec {
        TabCodec::new("__").unwrap()
    }

    #[test]
    fn test_plain() {
        assert_eq!(codec().parse("proj"), TabEntry::Plain("proj".to_string()));
        assert_eq!(codec().parse("my_dir"), TabEntry::Plain("my_dir".to_string()));
    }

    #[test]
    fn test_index() {
        assert_eq!(
            codec().parse("proj__2"),
            TabEntry::Index {
                needle: "proj".to_string(),
                index: 2
            }
        );
        assert_eq!(
            codec().parse("__3"),
            TabEntry::Index {
                needle: String::new(),
                index: 3
            }
        );
    }

    #[test]
    fn test_text_after_index_is_ignored() {
        assert_eq!(
            codec().parse("a__2b"),
            TabEntry::Index {
                needle: "a".to_string(),
                index: 2
            }
        );
        assert_eq!(
            codec().parse("proj__12x__"),
            TabEntry::Index {
                needle: "proj".to_string(),
                index: 12
            }
        );
    }

    #[test]
    fn test_zero_index_is_plain() {
        assert_eq!(codec().parse("proj__0"), TabEntry::Plain("proj__0".to_string()));
    }

    #[test]
    fn test_redisplay() {
        assert_eq!(
            codec().parse("proj__"),
            TabEntry::Redisplay {
                needle: "proj".to_string()
            }
        );
    }

    #[test]
    fn test_completion_line_round_trip() {
        let line = codec().format("proj", 1, "/home/me/projects");
        assert_eq!(line, "proj__1__/home/me/projects");
        assert_eq!(
            codec().parse(&line),
            TabEntry::Path {
                needle: "proj".to_string(),
                index: 1,
                path: "/home/me/projects".to_string()
            }
        );
    }

    #[test]
    fn test_path_may_contain_separator() {
        assert_eq!(
            codec().parse("a__2__/srv/odd__name__7"),
            TabEntry::Path {
                needle: "a".to_string(),
                index: 2,
                path: "/srv/odd__name__7".to_string()
            }
        );
    }

    #[test]
    fn test_custom_separator_is_escaped() {
        let codec = TabCodec::new("..").unwrap();
        assert_eq!(
            codec.parse("x..4"),
            TabEntry::Index {
                needle: "x".to_string(),
                index: 4
            }
        );
        assert_eq!(codec.parse("xab4"), TabEntry::Plain("xab4".to_string()));
    }

    #[test]
    fn test_empty_separator_rejected() {
        assert!(TabCodec::new("").is_err());
    }

    #[test]
    fn test_needle_accessor() {
        assert_eq!(codec().parse("proj__2").needle(), "proj");
        assert_eq!(codec().parse("proj").needle(), "proj");
    }
}
