//! Conversion between `HH:MM:SS,mmm` timestamps and time values.
//!
//! Times are held as [`Duration`]s with millisecond resolution. The seconds
//! helpers exist for callers that work in fractional seconds (media players,
//! waveform positions) and round to the nearest millisecond on the way in.

use crate::error::FormatError;

use std::time::Duration;

use nom::bytes::complete::{tag, take_while_m_n};
use nom::combinator::{all_consuming, map_res};
use nom::IResult;

/// Parses a timestamp at the start of `input`, returning the remaining input.
///
/// Minutes and seconds take exactly two digits and milliseconds three. Hours
/// take at least two, so timestamps past 99 hours read back as written.
pub(crate) fn timestamp(input: &str) -> IResult<&str, Duration> {
    let (input, hours) = digits(input, 2, MAX_HOUR_DIGITS)?;
    let (input, _) = tag(":")(input)?;
    let (input, minutes) = digits(input, 2, 2)?;
    let (input, _) = tag(":")(input)?;
    let (input, seconds) = digits(input, 2, 2)?;
    let (input, _) = tag(",")(input)?;
    let (input, millis) = digits(input, 3, 3)?;

    Ok((
        input,
        Duration::from_millis(
            millis + seconds * 1000 + minutes * 60 * 1000 + hours * 60 * 60 * 1000,
        ),
    ))
}

// Keeps the millisecond total within u64.
const MAX_HOUR_DIGITS: usize = 10;

fn digits(input: &str, min: usize, max: usize) -> IResult<&str, u64> {
    map_res(
        take_while_m_n(min, max, |c: char| c.is_ascii_digit()),
        |s: &str| s.parse::<u64>(),
    )(input)
}

/// Parses a complete `HH:MM:SS,mmm` string.
pub fn parse_timestamp(text: &str) -> Result<Duration, FormatError> {
    all_consuming(timestamp)(text)
        .map(|(_, ts)| ts)
        .map_err(|_| FormatError::new(text))
}

/// Non-failing variant of [`parse_timestamp`] for validating free-text input.
pub fn is_valid_timestamp(text: &str) -> bool {
    parse_timestamp(text).is_ok()
}

pub fn format_timestamp(timestamp: Duration) -> String {
    format_ts(timestamp, ',')
}

/// Formats `timestamp` as `HH:MM:SS<sep>mmm`. Hours widen past two digits
/// rather than wrapping.
pub(crate) fn format_ts(timestamp: Duration, separator: char) -> String {
    let total_secs = timestamp.as_secs();
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;
    let millis = timestamp.subsec_millis();
    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours, minutes, seconds, separator, millis
    )
}

/// Converts fractional seconds to a millisecond-aligned duration.
/// Negative and non-finite values clamp to zero.
pub fn from_seconds(seconds: f64) -> Duration {
    if !seconds.is_finite() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::from_millis((seconds * 1000.0).round() as u64)
}

pub fn to_seconds(timestamp: Duration) -> f64 {
    timestamp.as_millis() as f64 / 1000.0
}

pub fn parse_seconds(text: &str) -> Result<f64, FormatError> {
    parse_timestamp(text).map(to_seconds)
}

pub fn format_seconds(seconds: f64) -> String {
    format_timestamp(from_seconds(seconds))
}
