use std::fmt;
use std::ops::Deref;
use std::time::Duration;

use uuid::Uuid;

/// Text given to entries created by `add` and by starting from scratch.
pub const NEW_SUBTITLE_TEXT: &str = "New subtitle";

/// Length of an entry appended after the last one.
pub const DEFAULT_DURATION: Duration = Duration::from_secs(3);

/// Identity of an entry that survives renumbering.
///
/// Keys are minted once, when an entry is created, and are never reassigned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StableKey(Uuid);

impl StableKey {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for StableKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for StableKey {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(fmt, "{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subtitle {
    pub(crate) key: StableKey,
    pub(crate) sequence_number: usize,
    pub(crate) show_at: Duration,
    pub(crate) hide_at: Duration,
    pub(crate) text: String,
}

impl Subtitle {
    /// Creates an entry with a fresh key. Its sequence number is assigned
    /// once it becomes part of a document.
    pub fn new(show_at: Duration, hide_at: Duration, text: impl Into<String>) -> Self {
        Self {
            key: StableKey::new(),
            sequence_number: 0,
            show_at,
            hide_at,
            text: text.into(),
        }
    }

    pub fn key(&self) -> StableKey {
        self.key
    }

    pub fn sequence_number(&self) -> usize {
        self.sequence_number
    }

    pub fn show_at(&self) -> Duration {
        self.show_at
    }

    pub fn hide_at(&self) -> Duration {
        self.hide_at
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Compares timing and text only, ignoring identity.
    pub fn same_cue(&self, other: &Subtitle) -> bool {
        self.show_at == other.show_at && self.hide_at == other.hide_at && self.text == other.text
    }
}

/// An ordered list of subtitles whose sequence numbers are `1..=N` in order.
///
/// Documents are values: every edit builds a new document and leaves its
/// input untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    entries: Vec<Subtitle>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from entries in order, renumbering them.
    pub fn from_entries(entries: Vec<Subtitle>) -> Self {
        let mut doc = Self { entries };
        doc.renumber();
        doc
    }

    /// Builds a document of freshly keyed entries from `(start, end, text)` triples.
    pub fn from_cues<I, S>(cues: I) -> Self
    where
        I: IntoIterator<Item = (Duration, Duration, S)>,
        S: Into<String>,
    {
        Self::from_entries(
            cues.into_iter()
                .map(|(show_at, hide_at, text)| Subtitle::new(show_at, hide_at, text))
                .collect(),
        )
    }

    /// The single placeholder entry an empty editing session starts with.
    pub fn from_scratch() -> Self {
        Self::from_entries(vec![Subtitle::new(
            Duration::ZERO,
            DEFAULT_DURATION,
            NEW_SUBTITLE_TEXT,
        )])
    }

    pub fn entries(&self) -> &[Subtitle] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<Subtitle> {
        self.entries
    }

    pub fn position(&self, key: StableKey) -> Option<usize> {
        self.entries.iter().position(|s| s.key == key)
    }

    pub fn get(&self, key: StableKey) -> Option<&Subtitle> {
        self.entries.iter().find(|s| s.key == key)
    }

    /// Key of the entry currently numbered `sequence_number`.
    pub fn key_at(&self, sequence_number: usize) -> Option<StableKey> {
        sequence_number
            .checked_sub(1)
            .and_then(|i| self.entries.get(i))
            .map(|s| s.key)
    }

    pub(crate) fn renumber(&mut self) {
        for (i, sub) in self.entries.iter_mut().enumerate() {
            sub.sequence_number = i + 1;
        }
    }
}

impl Deref for Document {
    type Target = [Subtitle];

    fn deref(&self) -> &[Subtitle] {
        &self.entries
    }
}

impl<'a> IntoIterator for &'a Document {
    type Item = &'a Subtitle;
    type IntoIter = std::slice::Iter<'a, Subtitle>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
