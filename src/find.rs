//! Find and replace over subtitle text.

use crate::srt::{Document, StableKey, Subtitle};

use std::borrow::Cow;
use std::collections::HashSet;
use std::ops::Range;

use regex::{NoExpand, Regex, RegexBuilder};
use tracing::warn;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub case_sensitive: bool,
    /// Only match the pattern between word boundaries.
    pub whole_word: bool,
    /// Treat the pattern as a regular expression instead of literal text.
    pub is_regex: bool,
}

/// Compiles `pattern` the way a [`Matcher`] would, reporting syntax errors.
pub fn check_pattern(pattern: &str, opts: FindOptions) -> Result<(), regex::Error> {
    build_regex(pattern, opts).map(|_| ())
}

fn build_regex(pattern: &str, opts: FindOptions) -> Result<Regex, regex::Error> {
    let source = if opts.is_regex {
        pattern.to_string()
    } else if opts.whole_word {
        format!(r"\b{}\b", regex::escape(pattern))
    } else {
        regex::escape(pattern)
    };
    RegexBuilder::new(&source)
        .case_insensitive(!opts.case_sensitive)
        .build()
}

/// A compiled search pattern.
///
/// An empty or invalid pattern yields a matcher that matches nothing.
#[derive(Debug, Clone)]
pub struct Matcher {
    regex: Option<Regex>,
    expand_captures: bool,
}

impl Matcher {
    pub fn new(pattern: &str, opts: FindOptions) -> Self {
        let regex = if pattern.is_empty() {
            None
        } else {
            match build_regex(pattern, opts) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    warn!(pattern, error = %err, "Invalid search pattern, matching nothing");
                    None
                }
            }
        };
        Self {
            regex,
            expand_captures: opts.is_regex,
        }
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().map_or(false, |r| r.is_match(text))
    }

    /// Byte ranges of every match in `text`.
    pub fn find_ranges(&self, text: &str) -> Vec<Range<usize>> {
        match &self.regex {
            Some(regex) => regex.find_iter(text).map(|m| m.range()).collect(),
            None => Vec::new(),
        }
    }

    /// Replaces every match in `text`. Regular expression patterns may refer to
    /// capture groups (`$1`, `${name}`); otherwise the replacement is literal.
    pub fn replace_all<'t>(&self, text: &'t str, replacement: &str) -> Cow<'t, str> {
        match &self.regex {
            Some(regex) if self.expand_captures => regex.replace_all(text, replacement),
            Some(regex) => regex.replace_all(text, NoExpand(replacement)),
            None => Cow::Borrowed(text),
        }
    }
}

/// Entries whose text matches, in document order.
pub fn find_matches<'d>(doc: &'d Document, matcher: &Matcher) -> Vec<&'d Subtitle> {
    doc.iter().filter(|s| matcher.is_match(&s.text)).collect()
}

/// Replaces matches in the selected entries only. Every other entry is kept
/// as is, so an empty selection yields an equal document.
pub fn apply_replace(
    doc: &Document,
    matcher: &Matcher,
    replacement: &str,
    selected: &HashSet<StableKey>,
) -> Document {
    let entries = doc
        .iter()
        .map(|sub| {
            if selected.contains(&sub.key) && matcher.is_match(&sub.text) {
                Subtitle {
                    text: matcher.replace_all(&sub.text, replacement).into_owned(),
                    ..sub.clone()
                }
            } else {
                sub.clone()
            }
        })
        .collect();
    Document::from_entries(entries)
}
