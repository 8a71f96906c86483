use crate::srt::{Document, Subtitle};
use crate::timecode::timestamp;

use std::time::Duration;

use nom::bytes::complete::tag;
use nom::character::complete::{space0, space1};
use nom::combinator::opt;
use nom::IResult;
use tracing::{debug, warn};

/// Parses SRT text into a document.
///
/// Blocks are separated by blank lines. A block needs a sequence number line,
/// a timing line and at least one text line; blocks that don't have that shape
/// are skipped instead of failing the whole file. Sequence numbers in the input
/// are ignored and every entry gets a fresh key.
pub fn parse(input: &str) -> Document {
    let (input, _) = optional_bom(input);

    let mut subs = Vec::new();
    for (index, block) in blocks(input).into_iter().enumerate() {
        match subtitle(&block) {
            Some(sub) => subs.push(sub),
            None => warn!(block = index + 1, first_line = ?block.first(), "Skipping malformed subtitle block"),
        }
    }

    debug!(entries = subs.len(), "Parsed SRT input");
    Document::from_entries(subs)
}

fn optional_bom(input: &str) -> (&str, Option<&str>) {
    match opt(tag::<_, _, nom::error::Error<&str>>("\u{FEFF}"))(input) {
        Ok((rest, bom)) => (rest, bom),
        Err(_) => (input, None),
    }
}

/// Groups the input's lines into runs of non-blank lines.
fn blocks(input: &str) -> Vec<Vec<&str>> {
    let mut blocks = Vec::new();
    let mut current = Vec::new();
    for line in input.lines() {
        if line.trim().is_empty() {
            if !current.is_empty() {
                blocks.push(std::mem::take(&mut current));
            }
        } else {
            current.push(line);
        }
    }
    if !current.is_empty() {
        blocks.push(current);
    }
    blocks
}

fn subtitle(lines: &[&str]) -> Option<Subtitle> {
    if lines.len() < 3 {
        return None;
    }
    let (_, (show_at, hide_at)) = show_hide(lines[1].trim()).ok()?;
    let text = lines[2..].join("\n");

    Some(Subtitle::new(show_at, hide_at, text))
}

/// Parses `<start> --> <end>`. Anything after the end timestamp, such as cue
/// positioning, is left unconsumed.
fn show_hide(input: &str) -> IResult<&str, (Duration, Duration)> {
    let (input, show_at) = timestamp(input)?;
    let (input, _) = space1(input)?;
    let (input, _) = tag("-->")(input)?;
    let (input, _) = space1(input)?;
    let (input, hide_at) = timestamp(input)?;
    let (input, _) = space0(input)?;

    Ok((input, (show_at, hide_at)))
}
