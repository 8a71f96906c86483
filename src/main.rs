use subedit::find::{self, FindOptions, Matcher};
use subedit::serialiser::{self, Format};
use subedit::{script, timecode, Session};

use std::collections::HashSet;
use std::io::{self, Read, Write};

use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser as ClapParser, Subcommand, ValueEnum};
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => (),
        Err(err) => {
            eprintln!("An error occurred: {}", err);
            for cause in err.chain().skip(1) {
                eprintln!("    {}", cause);
            }
            std::process::exit(1);
        }
    }
}

#[derive(ClapParser)]
#[command(about = "Edit SRT subtitles from the command line")]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to read from. If not supplied, the subtitles will be read from standard input.",
        default_value = "-",
        global = true
    )]
    input: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "The file to write to. If not supplied, the subtitles will be written to standard output.",
        default_value = "-",
        global = true
    )]
    output: String,
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Write a backup of the original input to the specified file.",
        global = true
    )]
    backup: Option<String>,
    #[arg(
        long,
        value_enum,
        default_value_t = OutputFormat::Srt,
        help = "The format to write.",
        global = true
    )]
    format: OutputFormat,
    #[arg(
        short,
        long,
        action = clap::ArgAction::Count,
        help = "Log more details to stderr. Repeat for more. Overrides RUST_LOG.",
        global = true
    )]
    verbose: u8,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Renumber and rewrite the subtitles.
    Normalise,
    /// List the subtitles whose text matches a pattern.
    Find {
        pattern: String,
        #[command(flatten)]
        opts: SearchArgs,
    },
    /// Replace matches of a pattern, optionally in selected subtitles only.
    Replace {
        pattern: String,
        replacement: String,
        #[command(flatten)]
        opts: SearchArgs,
        #[arg(
            long = "only",
            value_name = "SEQ",
            help = "Only replace in the subtitle with this sequence number. May be repeated."
        )]
        only: Vec<usize>,
    },
    /// Apply an edit script, one command per line.
    Edit {
        #[arg(value_name = "SCRIPT")]
        script: String,
    },
}

#[derive(Args)]
struct SearchArgs {
    #[arg(short = 'c', long, help = "Match case exactly.")]
    case_sensitive: bool,
    #[arg(short = 'w', long, help = "Only match whole words.")]
    whole_word: bool,
    #[arg(short = 'r', long, help = "Treat the pattern as a regular expression.")]
    regex: bool,
}

impl From<&SearchArgs> for FindOptions {
    fn from(args: &SearchArgs) -> Self {
        FindOptions {
            case_sensitive: args.case_sensitive,
            whole_word: args.whole_word,
            is_regex: args.regex,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Srt,
    Vtt,
}

impl From<OutputFormat> for Format {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Srt => Format::Srt,
            OutputFormat::Vtt => Format::Vtt,
        }
    }
}

fn init_logging(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let data = if cli.input == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        buffer
    } else {
        std::fs::read_to_string(&cli.input)
            .context(format!("Failed to open input file: '{}'", cli.input))?
    };

    if let Some(backup_path) = &cli.backup {
        std::fs::write(backup_path, &data)
            .context(format!("Failed to write backup file: '{}'", backup_path))?;
    }

    let mut session = Session::new();
    session.load(&data);
    if session.document().is_empty() {
        return Err(anyhow!("You appear to have supplied an empty file."));
    }

    match &cli.command {
        Command::Normalise => (),
        Command::Find { pattern, opts } => return list_matches(&session, pattern, opts.into()),
        Command::Replace {
            pattern,
            replacement,
            opts,
            only,
        } => {
            let opts = FindOptions::from(opts);
            find::check_pattern(pattern, opts).context("Invalid search pattern")?;
            let matcher = Matcher::new(pattern, opts);
            if only.is_empty() {
                session.replace_all(&matcher, replacement);
            } else {
                let selected = only
                    .iter()
                    .map(|seq| {
                        session
                            .key_at(*seq)
                            .ok_or_else(|| anyhow!("No subtitle with sequence number {}", seq))
                    })
                    .collect::<Result<HashSet<_>>>()?;
                session.replace(&matcher, replacement, &selected);
            }
        }
        Command::Edit { script: path } => {
            let text = std::fs::read_to_string(path)
                .context(format!("Failed to open edit script: '{}'", path))?;
            let commands = script::parse_script(&text)?;
            script::run(&mut session, &commands)?;
        }
    }

    let format = Format::from(cli.format);
    if cli.output == "-" {
        let mut dst = io::stdout().lock();
        serialiser::write_doc(&mut dst, session.document(), format)?;
        dst.flush()?;
    } else {
        serialiser::serialise(session.document(), &cli.output, format)?;
    }

    Ok(())
}

fn list_matches(session: &Session, pattern: &str, opts: FindOptions) -> Result<()> {
    find::check_pattern(pattern, opts).context("Invalid search pattern")?;
    let matcher = Matcher::new(pattern, opts);
    let matches = find::find_matches(session.document(), &matcher);

    let mut out = io::stdout().lock();
    for sub in &matches {
        writeln!(
            out,
            "{}\t{} --> {}\t{}",
            sub.sequence_number(),
            timecode::format_timestamp(sub.show_at()),
            timecode::format_timestamp(sub.hide_at()),
            highlight(sub.text(), &matcher).replace('\n', " / ")
        )?;
    }
    info!(matches = matches.len(), "Search finished");
    Ok(())
}

/// Wraps each match in brackets.
fn highlight(text: &str, matcher: &Matcher) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for range in matcher.find_ranges(text) {
        out.push_str(&text[last..range.start]);
        out.push('[');
        out.push_str(&text[range.clone()]);
        out.push(']');
        last = range.end;
    }
    out.push_str(&text[last..]);
    out
}
