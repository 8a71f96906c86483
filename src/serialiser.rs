use crate::srt::{Document, Subtitle};
use crate::timecode::format_ts;

use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};

/// Output flavour of the serialiser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Srt,
    /// WebVTT projection of the document, for players that need it.
    Vtt,
}

impl Format {
    fn decimal_separator(self) -> char {
        match self {
            Format::Srt => ',',
            Format::Vtt => '.',
        }
    }
}

pub fn serialise<P: AsRef<Path>>(doc: &Document, output: P, format: Format) -> Result<()> {
    let file = std::fs::File::create(output).context("Failed to create file!")?;
    let mut writer = BufWriter::new(file);
    write_doc(&mut writer, doc, format).context("Failed to write to output file.")?;
    writer.flush().context("Failed to write to output file.")?;
    Ok(())
}

pub fn to_srt(doc: &Document) -> String {
    render(doc, Format::Srt)
}

/// Renders the WebVTT projection: a `WEBVTT` header, then the SRT blocks with
/// `.` as the millisecond separator. Blocks stay separated by a blank line,
/// since WebVTT players need it to tell one cue from the next.
pub fn to_vtt(doc: &Document) -> String {
    render(doc, Format::Vtt)
}

pub fn write_doc<W: Write>(buf: &mut W, doc: &Document, format: Format) -> std::io::Result<()> {
    buf.write_all(render(doc, format).as_bytes())
}

/// Renders every entry in sequence-number order, separated by blank lines.
fn render(doc: &Document, format: Format) -> String {
    let mut subs: Vec<&Subtitle> = doc.iter().collect();
    subs.sort_by_key(|s| s.sequence_number);

    let blocks: Vec<String> = subs.into_iter().map(|sub| render_sub(sub, format)).collect();
    let body = blocks.join("\n");
    match format {
        Format::Srt => body,
        Format::Vtt => format!("WEBVTT\n\n{}", body),
    }
}

fn render_sub(sub: &Subtitle, format: Format) -> String {
    let separator = format.decimal_separator();
    format!(
        "{}\n{} --> {}\n{}\n",
        sub.sequence_number,
        format_ts(sub.show_at, separator),
        format_ts(sub.hide_at, separator),
        sub.text
    )
}
