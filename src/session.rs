//! One editing session: a document plus its undo history.
//!
//! This is the surface an editor front end drives. Every edit is a single
//! commit, so it is undone in one step.

use crate::error::EditError;
use crate::find::{self, FindOptions, Matcher};
use crate::history::History;
use crate::parser;
use crate::processor;
use crate::serialiser;
use crate::srt::{Document, StableKey, Subtitle};
use crate::timecode::parse_timestamp;

use std::collections::HashSet;
use std::time::Duration;

use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct Session {
    history: History<Document>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            history: History::new(Document::new()),
        }
    }

    pub fn with_document(doc: Document) -> Self {
        Self {
            history: History::new(doc),
        }
    }

    /// Replaces the document with parsed SRT text. Loading cannot be undone.
    pub fn load(&mut self, srt: &str) {
        let doc = parser::parse(srt);
        info!(entries = doc.len(), "Loaded subtitles");
        self.history.replace_initial(doc);
    }

    pub fn start_from_scratch(&mut self) {
        self.history.replace_initial(Document::from_scratch());
    }

    pub fn document(&self) -> &Document {
        self.history.present()
    }

    pub fn key_at(&self, sequence_number: usize) -> Option<StableKey> {
        self.document().key_at(sequence_number)
    }

    /// Applies an arbitrary document transform as one undoable step.
    pub fn commit<F>(&mut self, transform: F) -> bool
    where
        F: FnOnce(&Document) -> Document,
    {
        self.history.commit(transform)
    }

    pub fn update_text(&mut self, key: StableKey, text: &str) -> bool {
        self.commit(|doc| processor::update_text(doc, key, text))
    }

    /// Moves the start of an entry, refusing to put it after the entry's end.
    pub fn set_start(&mut self, key: StableKey, show_at: Duration) -> Result<bool, EditError> {
        let Some(sub) = self.document().get(key) else {
            return Ok(false);
        };
        check_timing(show_at, sub.hide_at())?;
        Ok(self.commit(|doc| processor::update_start(doc, key, show_at)))
    }

    /// Moves the end of an entry, refusing to put it before the entry's start.
    pub fn set_end(&mut self, key: StableKey, hide_at: Duration) -> Result<bool, EditError> {
        let Some(sub) = self.document().get(key) else {
            return Ok(false);
        };
        check_timing(sub.show_at(), hide_at)?;
        Ok(self.commit(|doc| processor::update_end(doc, key, hide_at)))
    }

    pub fn set_timing(
        &mut self,
        key: StableKey,
        show_at: Duration,
        hide_at: Duration,
    ) -> Result<bool, EditError> {
        check_timing(show_at, hide_at)?;
        Ok(self.commit(|doc| processor::update_timing(doc, key, show_at, hide_at)))
    }

    /// Like [`Session::set_start`], taking a timestamp typed by the user.
    pub fn set_start_text(&mut self, key: StableKey, show_at: &str) -> Result<bool, EditError> {
        self.set_start(key, parse_timestamp(show_at)?)
    }

    pub fn set_end_text(&mut self, key: StableKey, hide_at: &str) -> Result<bool, EditError> {
        self.set_end(key, parse_timestamp(hide_at)?)
    }

    pub fn merge(&mut self, first: StableKey, second: StableKey) -> bool {
        self.commit(|doc| processor::merge(doc, first, second))
    }

    pub fn delete(&mut self, key: StableKey) -> bool {
        self.commit(|doc| processor::delete(doc, key))
    }

    /// Adds an entry after `before`, filling the gap up to the next entry.
    /// Nothing happens when that gap is too small.
    pub fn add_after(&mut self, before: StableKey) -> bool {
        let doc = self.document();
        if !processor::has_room_after(doc, before) {
            debug!(%before, "No room to add a subtitle");
            return false;
        }
        let after = doc
            .position(before)
            .and_then(|i| doc.entries().get(i + 1))
            .map(Subtitle::key);
        self.commit(|doc| processor::add(doc, before, after))
    }

    pub fn split(&mut self, key: StableKey, caret: usize, text_len: usize) -> bool {
        self.commit(|doc| processor::split(doc, key, caret, text_len))
    }

    pub fn find(&self, pattern: &str, opts: FindOptions) -> Vec<&Subtitle> {
        find::find_matches(self.document(), &Matcher::new(pattern, opts))
    }

    /// Replaces matches in the selected entries as a single undoable step.
    pub fn replace(
        &mut self,
        matcher: &Matcher,
        replacement: &str,
        selected: &HashSet<StableKey>,
    ) -> bool {
        self.commit(|doc| find::apply_replace(doc, matcher, replacement, selected))
    }

    /// Replaces matches in every entry.
    pub fn replace_all(&mut self, matcher: &Matcher, replacement: &str) -> bool {
        let selected = self.document().iter().map(Subtitle::key).collect();
        self.replace(matcher, replacement, &selected)
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo()
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn to_srt(&self) -> String {
        serialiser::to_srt(self.document())
    }

    pub fn to_vtt(&self) -> String {
        serialiser::to_vtt(self.document())
    }
}

fn check_timing(show_at: Duration, hide_at: Duration) -> Result<(), EditError> {
    if show_at > hide_at {
        return Err(EditError::InvalidTiming {
            start: show_at,
            end: hide_at,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    const SAMPLE: &str = "1\n00:00:00,000 --> 00:00:01,000\nHi\n\n2\n00:00:01,000 --> 00:00:02,000\nthere\n";

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn loaded() -> Session {
        let mut session = Session::new();
        session.load(SAMPLE);
        session
    }

    #[test]
    fn load_is_not_undoable() {
        let mut session = loaded();
        assert!(session.update_text(session.key_at(1).unwrap(), "Hello"));
        session.load(SAMPLE);
        assert!(!session.can_undo());
        assert!(!session.can_redo());
        assert_eq!(session.document()[0].text(), "Hi");
    }

    #[test]
    fn rejects_reversed_timing() {
        let mut session = loaded();
        let key = session.key_at(1).unwrap();

        assert_eq!(
            session.set_start(key, ms(1500)),
            Err(EditError::InvalidTiming {
                start: ms(1500),
                end: ms(1000)
            })
        );
        assert!(session.set_end(key, ms(0)).unwrap());
        assert!(session.set_timing(key, ms(900), ms(800)).is_err());
        assert!(session.set_end_text(key, "00:00:00,500").unwrap());
        assert_eq!(
            session.set_start_text(key, "0:0:0,1"),
            Err(EditError::Format(FormatError::new("0:0:0,1")))
        );
        assert_eq!(session.document()[0].hide_at(), ms(500));
        assert!(session.set_start(StableKey::new(), ms(0)) == Ok(false));
    }

    #[test]
    fn add_requires_room() {
        let mut session = loaded();
        assert!(!session.add_after(session.key_at(1).unwrap()));
        assert!(!session.can_undo());

        assert!(session.add_after(session.key_at(2).unwrap()));
        assert_eq!(session.document().len(), 3);
        assert_eq!(session.document()[2].show_at(), ms(2000));
        assert_eq!(session.document()[2].hide_at(), ms(5000));
    }

    #[test]
    fn add_fills_gap_to_next_entry() {
        let mut session = loaded();
        let second = session.key_at(2).unwrap();
        session.set_timing(second, ms(1500), ms(2000)).unwrap();
        assert!(session.add_after(session.key_at(1).unwrap()));

        let doc = session.document();
        assert_eq!(doc[1].show_at(), ms(1000));
        assert_eq!(doc[1].hide_at(), ms(1500));
        assert_eq!(doc[2].key(), second);
    }

    #[test]
    fn replace_is_one_step() {
        let mut session = Session::new();
        session.load("1\n00:00:00,000 --> 00:00:01,000\ncat\n\n2\n00:00:01,000 --> 00:00:02,000\ncat cat\n");
        let matcher = Matcher::new("cat", FindOptions::default());

        assert!(session.replace_all(&matcher, "dog"));
        assert_eq!(session.document()[1].text(), "dog dog");
        assert!(session.undo());
        assert!(!session.can_undo());
        assert_eq!(session.document()[0].text(), "cat");

        assert!(!session.replace(&matcher, "dog", &HashSet::new()));
        assert!(session.can_redo());
    }

    #[test]
    fn scratch_start() {
        let mut session = loaded();
        session.start_from_scratch();
        assert_eq!(
            session.to_srt(),
            "1\n00:00:00,000 --> 00:00:03,000\nNew subtitle\n"
        );
        assert!(!session.can_undo());
    }
}
