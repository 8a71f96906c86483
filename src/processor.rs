//! Edits over a [`Document`].
//!
//! Every function returns a new document and leaves its input alone. An edit
//! that names a key not present in the document returns the document
//! unchanged, so a stale key is harmless.

use crate::srt::{Document, StableKey, Subtitle, DEFAULT_DURATION, NEW_SUBTITLE_TEXT};

use std::time::Duration;

use tracing::trace;

/// Smallest gap between two entries that still leaves room for a new one.
pub const ADD_GAP_TOLERANCE: Duration = Duration::from_millis(1);

fn map_entry<F>(doc: &Document, key: StableKey, f: F) -> Document
where
    F: FnOnce(&Subtitle) -> Subtitle,
{
    let Some(index) = doc.position(key) else {
        trace!(%key, "Edit targets a missing subtitle");
        return doc.clone();
    };
    let mut entries = doc.entries().to_vec();
    entries[index] = f(&doc[index]);
    Document::from_entries(entries)
}

pub fn update_text(doc: &Document, key: StableKey, text: &str) -> Document {
    map_entry(doc, key, |sub| Subtitle {
        text: text.to_string(),
        ..sub.clone()
    })
}

/// Sets the start of one entry. Callers check `show_at <= hide_at` first.
pub fn update_start(doc: &Document, key: StableKey, show_at: Duration) -> Document {
    map_entry(doc, key, |sub| Subtitle {
        show_at,
        ..sub.clone()
    })
}

/// Sets the end of one entry. Callers check `show_at <= hide_at` first.
pub fn update_end(doc: &Document, key: StableKey, hide_at: Duration) -> Document {
    map_entry(doc, key, |sub| Subtitle {
        hide_at,
        ..sub.clone()
    })
}

pub fn update_timing(doc: &Document, key: StableKey, show_at: Duration, hide_at: Duration) -> Document {
    map_entry(doc, key, |sub| Subtitle {
        show_at,
        hide_at,
        ..sub.clone()
    })
}

/// Joins two entries into one.
///
/// The entry earlier in the document survives with its key; its text is
/// followed directly by the other entry's text. The result spans from the
/// earliest start to the latest end of the pair.
pub fn merge(doc: &Document, first: StableKey, second: StableKey) -> Document {
    let (Some(a), Some(b)) = (doc.position(first), doc.position(second)) else {
        trace!(%first, %second, "Merge targets a missing subtitle");
        return doc.clone();
    };
    if a == b {
        return doc.clone();
    }
    let (keep, removed) = (a.min(b), a.max(b));
    let (head, tail) = (&doc[keep], &doc[removed]);

    let merged = Subtitle {
        show_at: head.show_at.min(tail.show_at),
        hide_at: head.hide_at.max(tail.hide_at),
        text: format!("{}{}", head.text, tail.text),
        ..head.clone()
    };

    let entries = doc
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != removed)
        .map(|(i, sub)| if i == keep { merged.clone() } else { sub.clone() })
        .collect();
    Document::from_entries(entries)
}

pub fn delete(doc: &Document, key: StableKey) -> Document {
    if doc.position(key).is_none() {
        return doc.clone();
    }
    Document::from_entries(doc.iter().filter(|s| s.key != key).cloned().collect())
}

/// Inserts a new entry directly after `before`.
///
/// With a following entry the new one fills the gap up to its start, otherwise
/// it lasts [`DEFAULT_DURATION`]. Use [`has_room_after`] to check that the gap
/// is not empty first.
pub fn add(doc: &Document, before: StableKey, after: Option<StableKey>) -> Document {
    let Some(index) = doc.position(before) else {
        return doc.clone();
    };
    let show_at = doc[index].hide_at;
    let hide_at = match after {
        None => show_at + DEFAULT_DURATION,
        Some(after) => match doc.get(after) {
            Some(next) => next.show_at,
            None => return doc.clone(),
        },
    };

    let mut entries = doc.entries().to_vec();
    entries.insert(index + 1, Subtitle::new(show_at, hide_at, NEW_SUBTITLE_TEXT));
    Document::from_entries(entries)
}

/// Whether an entry can be added after `key`: there must be more than
/// [`ADD_GAP_TOLERANCE`] between it and the next entry. The last entry always
/// has room.
pub fn has_room_after(doc: &Document, key: StableKey) -> bool {
    let Some(index) = doc.position(key) else {
        return false;
    };
    match doc.entries().get(index + 1) {
        None => true,
        Some(next) => next
            .show_at
            .checked_sub(doc[index].hide_at)
            .map_or(false, |gap| gap > ADD_GAP_TOLERANCE),
    }
}

/// Splits an entry in two at a caret position in its text.
///
/// `caret` and `text_len` count characters. The time span is divided in the
/// same ratio as the text. The first half keeps the original key, the second
/// gets a new one. Splitting at either edge of the text is a no-op.
pub fn split(doc: &Document, key: StableKey, caret: usize, text_len: usize) -> Document {
    if caret == 0 || caret >= text_len {
        return doc.clone();
    }
    let Some(index) = doc.position(key) else {
        return doc.clone();
    };
    let sub = &doc[index];

    let span = sub.hide_at.saturating_sub(sub.show_at).as_millis();
    let offset = (span * caret as u128 + text_len as u128 / 2) / text_len as u128;
    let split_at = sub.show_at + Duration::from_millis(offset as u64);

    let byte_index = sub
        .text
        .char_indices()
        .nth(caret)
        .map_or(sub.text.len(), |(i, _)| i);
    let (head, tail) = sub.text.split_at(byte_index);

    let first = Subtitle {
        hide_at: split_at,
        text: head.to_string(),
        ..sub.clone()
    };
    let second = Subtitle::new(split_at, sub.hide_at, tail);

    let mut entries = doc.entries().to_vec();
    entries[index] = first;
    entries.insert(index + 1, second);
    Document::from_entries(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timecode::{format_timestamp, parse_timestamp};

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    fn secs(seconds: u64) -> Duration {
        Duration::from_secs(seconds)
    }

    fn assert_dense(doc: &Document) {
        let seqs: Vec<usize> = doc.iter().map(|s| s.sequence_number()).collect();
        let expected: Vec<usize> = (1..=doc.len()).collect();
        assert_eq!(seqs, expected);
    }

    fn hi_there() -> Document {
        Document::from_cues(vec![(secs(0), secs(1), "Hi"), (secs(1), secs(2), "there")])
    }

    #[test]
    fn merge_example() {
        let doc = hi_there();
        let merged = merge(&doc, doc[0].key(), doc[1].key());
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].sequence_number(), 1);
        assert_eq!(merged[0].show_at(), secs(0));
        assert_eq!(merged[0].hide_at(), secs(2));
        assert_eq!(merged[0].text(), "Hithere");
        assert_eq!(merged[0].key(), doc[0].key());
    }

    #[test]
    fn merge_in_either_order_keeps_earlier_entry() {
        let doc = hi_there();
        let merged = merge(&doc, doc[1].key(), doc[0].key());
        assert_eq!(merged[0].key(), doc[0].key());
        assert_eq!(merged[0].text(), "Hithere");
        assert_eq!(merged[0].hide_at(), secs(2));
    }

    #[test]
    fn merge_with_missing_or_same_key_is_noop() {
        let doc = hi_there();
        assert_eq!(merge(&doc, doc[0].key(), StableKey::new()), doc);
        assert_eq!(merge(&doc, doc[0].key(), doc[0].key()), doc);
    }

    #[test]
    fn merge_renumbers() {
        let doc = Document::from_cues(vec![
            (secs(0), secs(1), "a"),
            (secs(1), secs(2), "b"),
            (secs(2), secs(3), "c"),
            (secs(3), secs(4), "d"),
        ]);
        let merged = merge(&doc, doc[1].key(), doc[2].key());
        assert_dense(&merged);
        assert_eq!(merged[2].key(), doc[3].key());
        assert_eq!(merged[2].sequence_number(), 3);
    }

    #[test]
    fn add_at_end_example() {
        let doc = Document::from_cues(vec![(secs(0), secs(1), "Hi")]);
        let added = add(&doc, doc[0].key(), None);
        assert_eq!(added.len(), 2);
        assert_eq!(added[1].sequence_number(), 2);
        assert_eq!(added[1].show_at(), secs(1));
        assert_eq!(added[1].hide_at(), secs(4));
        assert_eq!(added[1].text(), NEW_SUBTITLE_TEXT);
        assert_ne!(added[1].key(), doc[0].key());
    }

    #[test]
    fn add_between_fills_gap() {
        let doc = Document::from_cues(vec![(secs(0), secs(1), "a"), (ms(2500), secs(3), "b")]);
        let added = add(&doc, doc[0].key(), Some(doc[1].key()));
        assert_eq!(added.len(), 3);
        assert_eq!(added[1].show_at(), secs(1));
        assert_eq!(added[1].hide_at(), ms(2500));
        assert_eq!(added[2].key(), doc[1].key());
        assert_dense(&added);
    }

    #[test]
    fn add_with_missing_keys_is_noop() {
        let doc = hi_there();
        assert_eq!(add(&doc, StableKey::new(), None), doc);
        assert_eq!(add(&doc, doc[0].key(), Some(StableKey::new())), doc);
    }

    #[test]
    fn room_after() {
        let doc = Document::from_cues(vec![
            (secs(0), secs(1), "a"),
            (ms(1001), secs(2), "b"),
            (ms(2002), secs(3), "c"),
            (ms(2900), secs(4), "d"),
        ]);
        assert!(!has_room_after(&doc, doc[0].key()));
        assert!(has_room_after(&doc, doc[1].key()));
        assert!(!has_room_after(&doc, doc[2].key()));
        assert!(has_room_after(&doc, doc[3].key()));
        assert!(!has_room_after(&doc, StableKey::new()));
    }

    #[test]
    fn delete_renumbers() {
        let doc = Document::from_cues(vec![(secs(0), secs(1), "a"), (secs(1), secs(2), "b"), (secs(2), secs(3), "c")]);
        let deleted = delete(&doc, doc[0].key());
        assert_eq!(deleted.len(), 2);
        assert_dense(&deleted);
        assert_eq!(deleted[0].key(), doc[1].key());
        assert_eq!(delete(&doc, StableKey::new()), doc);
    }

    #[test]
    fn split_example() {
        let start = parse_timestamp("00:00:00,000").unwrap();
        let end = parse_timestamp("00:00:10,000").unwrap();
        let doc = Document::from_cues(vec![(start, end, "abcde")]);
        let halves = split(&doc, doc[0].key(), 3, 5);

        assert_eq!(halves.len(), 2);
        assert_eq!(format_timestamp(halves[0].hide_at()), "00:00:06,000");
        assert_eq!(halves[0].text(), "abc");
        assert_eq!(halves[0].key(), doc[0].key());
        assert_eq!(format_timestamp(halves[1].show_at()), "00:00:06,000");
        assert_eq!(halves[1].hide_at(), end);
        assert_eq!(halves[1].text(), "de");
        assert_ne!(halves[1].key(), doc[0].key());
        assert_dense(&halves);
    }

    #[test]
    fn split_at_edges_is_noop() {
        let doc = Document::from_cues(vec![(secs(0), secs(10), "abcde")]);
        let key = doc[0].key();
        assert_eq!(split(&doc, key, 0, 5), doc);
        assert_eq!(split(&doc, key, 5, 5), doc);
        assert_eq!(split(&doc, key, 6, 5), doc);
        assert_eq!(split(&doc, StableKey::new(), 2, 5), doc);
    }

    #[test]
    fn split_respects_multibyte_text() {
        let doc = Document::from_cues(vec![(secs(0), secs(4), "héllo")]);
        let halves = split(&doc, doc[0].key(), 2, 5);
        assert_eq!(halves[0].text(), "hé");
        assert_eq!(halves[1].text(), "llo");
    }

    #[test]
    fn split_then_merge_restores_entry() {
        let doc = Document::from_cues(vec![
            (secs(0), secs(1), "before"),
            (ms(1200), ms(4700), "split me\nplease"),
        ]);
        let original = doc[1].clone();
        for caret in 1..original.text().chars().count() {
            let halves = split(&doc, original.key(), caret, original.text().chars().count());
            let merged = merge(&halves, halves[1].key(), halves[2].key());
            assert_eq!(merged.len(), 2);
            assert!(merged[1].same_cue(&original));
            assert_eq!(merged[1].key(), original.key());
        }
    }

    #[test]
    fn retiming_keeps_keys() {
        let doc = hi_there();
        let key = doc[1].key();
        let edited = update_text(&doc, key, "world");
        let edited = update_start(&edited, key, ms(1100));
        let edited = update_end(&edited, key, ms(2200));
        let edited = update_timing(&edited, doc[0].key(), ms(100), ms(900));

        assert_eq!(edited[1].key(), key);
        assert_eq!(edited[1].text(), "world");
        assert_eq!(edited[1].show_at(), ms(1100));
        assert_eq!(edited[1].hide_at(), ms(2200));
        assert_eq!(edited[0].key(), doc[0].key());
        assert_eq!(edited[0].show_at(), ms(100));
        assert_eq!(edited[0].hide_at(), ms(900));
        // input untouched
        assert_eq!(doc[1].text(), "there");
    }

    #[test]
    fn updates_with_missing_key_are_noops() {
        let doc = hi_there();
        let missing = StableKey::new();
        assert_eq!(update_text(&doc, missing, "x"), doc);
        assert_eq!(update_start(&doc, missing, secs(5)), doc);
        assert_eq!(update_end(&doc, missing, secs(5)), doc);
        assert_eq!(update_timing(&doc, missing, secs(5), secs(6)), doc);
    }

    #[test]
    fn structural_edits_stay_dense() {
        let mut doc = Document::from_cues(vec![(secs(0), secs(2), "one two"), (secs(5), secs(6), "three")]);
        doc = add(&doc, doc[0].key(), Some(doc[1].key()));
        doc = split(&doc, doc[0].key(), 3, 7);
        doc = add(&doc, doc[3].key(), None);
        doc = delete(&doc, doc[2].key());
        doc = merge(&doc, doc[0].key(), doc[1].key());
        assert_eq!(doc.len(), 3);
        assert_dense(&doc);
        assert_eq!(doc[0].text(), "one two");
    }
}
