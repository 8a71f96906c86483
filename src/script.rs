//! Line-based edit scripts, for driving a [`Session`] without a front end.
//!
//! Each non-empty line holds one command. Entries are addressed by their
//! sequence number at the time the line runs, so numbers shift after
//! structural edits just as they would on screen.
//!
//! ```text
//! # fix the first line and join the next two
//! text 1 Hello,\nworld
//! merge 2 3
//! timing 2 00:00:04,000 00:00:06,500
//! split 4 10
//! undo
//! ```

use crate::error::EditError;
use crate::session::Session;
use crate::srt::StableKey;
use crate::timecode::timestamp;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::{digit1, space0, space1};
use nom::combinator::{all_consuming, map, map_res, rest, value};
use nom::sequence::{preceded, tuple};
use nom::IResult;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Text(usize, String),
    Start(usize, Duration),
    End(usize, Duration),
    Timing(usize, Duration, Duration),
    Merge(usize, usize),
    Delete(usize),
    Add(usize),
    Split(usize, usize),
    Undo,
    Redo,
}

/// Parses a whole script, skipping blank lines and `#` comments.
pub fn parse_script(input: &str) -> Result<Vec<Command>> {
    input
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            all_consuming(command)(line)
                .map(|(_, cmd)| cmd)
                .map_err(|_| anyhow!("Invalid command on line {}: '{}'", number, line))
        })
        .collect()
}

/// Runs every command against the session, stopping at the first failure.
pub fn run(session: &mut Session, commands: &[Command]) -> Result<()> {
    for (i, cmd) in commands.iter().enumerate() {
        let changed = apply(session, cmd).with_context(|| format!("Command {} failed: {:?}", i + 1, cmd))?;
        debug!(?cmd, changed, "Applied command");
    }
    Ok(())
}

pub fn apply(session: &mut Session, cmd: &Command) -> Result<bool, EditError> {
    let changed = match cmd {
        Command::Text(seq, text) => session.update_text(key(session, *seq)?, text),
        Command::Start(seq, ts) => session.set_start(key(session, *seq)?, *ts)?,
        Command::End(seq, ts) => session.set_end(key(session, *seq)?, *ts)?,
        Command::Timing(seq, start, end) => session.set_timing(key(session, *seq)?, *start, *end)?,
        Command::Merge(first, second) => {
            session.merge(key(session, *first)?, key(session, *second)?)
        }
        Command::Delete(seq) => session.delete(key(session, *seq)?),
        Command::Add(seq) => session.add_after(key(session, *seq)?),
        Command::Split(seq, caret) => {
            let target = key(session, *seq)?;
            let text_len = session
                .document()
                .get(target)
                .map_or(0, |s| s.text().chars().count());
            session.split(target, *caret, text_len)
        }
        Command::Undo => session.undo(),
        Command::Redo => session.redo(),
    };
    Ok(changed)
}

fn key(session: &Session, seq: usize) -> Result<StableKey, EditError> {
    session.key_at(seq).ok_or(EditError::UnknownSequence(seq))
}

fn command(input: &str) -> IResult<&str, Command> {
    alt((
        map(preceded(tag("text"), tuple((arg_seq, text_arg))), |(seq, text)| {
            Command::Text(seq, text)
        }),
        map(preceded(tag("start"), tuple((arg_seq, arg_ts))), |(seq, ts)| {
            Command::Start(seq, ts)
        }),
        map(preceded(tag("end"), tuple((arg_seq, arg_ts))), |(seq, ts)| {
            Command::End(seq, ts)
        }),
        map(
            preceded(tag("timing"), tuple((arg_seq, arg_ts, arg_ts))),
            |(seq, start, end)| Command::Timing(seq, start, end),
        ),
        map(preceded(tag("merge"), tuple((arg_seq, arg_seq))), |(a, b)| {
            Command::Merge(a, b)
        }),
        map(preceded(tag("delete"), arg_seq), Command::Delete),
        map(preceded(tag("add"), arg_seq), Command::Add),
        map(preceded(tag("split"), tuple((arg_seq, arg_seq))), |(seq, caret)| {
            Command::Split(seq, caret)
        }),
        value(Command::Undo, tag("undo")),
        value(Command::Redo, tag("redo")),
    ))(input)
}

fn arg_seq(input: &str) -> IResult<&str, usize> {
    preceded(space1, map_res(digit1, |s: &str| s.parse()))(input)
}

fn arg_ts(input: &str) -> IResult<&str, Duration> {
    preceded(space1, timestamp)(input)
}

/// The rest of the line, with `\n` standing for a line break.
fn text_arg(input: &str) -> IResult<&str, String> {
    let (input, _) = space0(input)?;
    let (input, text) = rest(input)?;
    Ok((input, text.replace("\\n", "\n")))
}
