use std::time::Duration;

use thiserror::Error;

use crate::timecode;

/// A timestamp string that does not match `HH:MM:SS,mmm`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid timestamp '{input}': expected HH:MM:SS,mmm")]
pub struct FormatError {
    pub input: String,
}

impl FormatError {
    pub fn new(input: &str) -> Self {
        Self {
            input: input.to_string(),
        }
    }
}

/// Rejections surfaced by the checked editing operations of a session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EditError {
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("Start time {} cannot be later than end time {}", ts(.start), ts(.end))]
    InvalidTiming { start: Duration, end: Duration },
    #[error("No subtitle with sequence number {0}")]
    UnknownSequence(usize),
}

fn ts(timestamp: &Duration) -> String {
    timecode::format_timestamp(*timestamp)
}
