//! Subtitle (SRT) document model with undoable editing.
//!
//! A [`Document`] is an ordered list of [`Subtitle`]s. Each entry carries a
//! [`StableKey`] that follows it through edits and a sequence number that is
//! always `1..=N` in document order. The functions in [`processor`] and
//! [`find`] build new documents from old ones; a [`Session`] runs them through
//! a bounded undo/redo [`History`].

pub mod error;
pub mod find;
pub mod history;
pub mod parser;
pub mod processor;
pub mod script;
pub mod serialiser;
pub mod session;
pub mod srt;
pub mod timecode;

pub use crate::error::{EditError, FormatError};
pub use crate::find::{FindOptions, Matcher};
pub use crate::history::{History, MAX_HISTORY};
pub use crate::parser::parse;
pub use crate::serialiser::{to_srt, to_vtt, Format};
pub use crate::session::Session;
pub use crate::srt::{Document, StableKey, Subtitle};
