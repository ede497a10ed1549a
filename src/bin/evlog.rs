// src/bin/evlog.rs

//! Driver program _evlog_ drives the [_evloglib_].
//!
//! Processes user-passed command-line arguments. Then opens the event log
//! at the passed path and prints each event, with dictionary codes resolved
//! to names, one per line.
//!
//! If passed `--position-file`, reading resumes from the position saved in
//! that file and the position after the last printed event is saved back.
//! Repeated runs print each event once, following the log as the producer
//! appends to it.
//!
//! If passed CLI option `--summary`, the counters of the reader are printed
//! to stderr.
//!
//! [_evloglib_]: evloglib

#![allow(non_camel_case_types)]

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::ExitCode;

use ::anyhow::{
    Context,
    Result,
};
use ::clap::{
    Parser,
    ValueEnum,
};
use ::const_format::concatcp;
#[allow(unused_imports)]
use ::si_trace_print::stack::stack_offset_set;
#[allow(unused_imports)]
use ::si_trace_print::{
    defn,
    defo,
    defx,
    defñ,
};
use ::termcolor::{
    Color,
    ColorChoice,
    ColorSpec,
    StandardStream,
    WriteColor,
};

use ::evloglib::common::{
    Count,
    DATA_FILE_EXTENSION,
    REFERENCE_FILE_NAME,
    EventNumber,
    FPath,
};
use ::evloglib::data::event::{
    ResolvedEvent,
    Severity,
};
use ::evloglib::data::position::CursorState;
use ::evloglib::data::reference::ReferenceLayout;
use ::evloglib::debug::printers::e_err;
use ::evloglib::readers::blockreader::{
    BlockSz,
    BLOCKSZ_DEF,
    BLOCKSZ_MAX,
    BLOCKSZ_MIN,
};
use ::evloglib::readers::eventlogreader::{
    EventLogReader,
    LogSource,
    ReaderConfig,
};
use ::evloglib::readers::hooks::ReaderHooks;
use ::evloglib::readers::recorddecoder::RecordLayout;

/// CLI enum that maps to [`termcolor::ColorChoice`].
///
/// [`termcolor::ColorChoice`]: https://docs.rs/termcolor/1.4.1/termcolor/enum.ColorChoice.html
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    ValueEnum, // from `clap`
)]
enum CLI_Color_Choice {
    always,
    auto,
    never,
}

/// CLI enum that selects the record layouts of [`ReaderConfig`].
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    ValueEnum, // from `clap`
)]
enum CLI_Layout {
    /// events of exactly 17 fields, dictionary records `{tag, code, name}`
    exact,
    /// events of 17 to 19 fields, dictionary records `{tag, name, code}`
    /// or `{tag, uuid, name, code}`
    #[value(name = "platform-v8")]
    platform_v8,
}

const CLI_HELP_AFTER: &str = concatcp!(
    "PATH may be a log directory, its reference file (", REFERENCE_FILE_NAME, "), or one data file (*.", DATA_FILE_EXTENSION, ").

With --position-file, a missing file starts from the first event.

Exit status is 0 if all events were read, 1 on any error.
"
);

// * the `about` is taken from `Cargo.toml:[package]:description`.
#[derive(Parser, Debug)]
#[clap(
    about = env!("CARGO_PKG_DESCRIPTION"),
    name = "evlog",
    // write expanded information for the `--version` output
    version = concatcp!(
        "Version: ",
        env!("CARGO_PKG_VERSION_MAJOR"), ".",
        env!("CARGO_PKG_VERSION_MINOR"), ".",
        env!("CARGO_PKG_VERSION_PATCH"), "\n",
        "MSRV: ", env!("CARGO_PKG_RUST_VERSION"), "\n",
        "License: ", env!("CARGO_PKG_LICENSE"), "\n",
    ),
    after_help = CLI_HELP_AFTER,
    verbatim_doc_comment,
)]
struct CLI_Args {
    /// Path of the event log.
    #[clap(
        required = true,
        verbatim_doc_comment,
    )]
    path: String,

    /// Print the count of events and exit.
    #[clap(
        long,
        verbatim_doc_comment,
        conflicts_with_all = &["seek", "position_file"],
    )]
    count: bool,

    /// Start printing at this event number, the first event is 1.
    #[clap(
        long,
        verbatim_doc_comment,
    )]
    seek: Option<EventNumber>,

    /// Print at most this many events.
    #[clap(
        long,
        verbatim_doc_comment,
    )]
    limit: Option<Count>,

    /// Resume from the position saved in this file, and save the position
    /// after the last printed event to it.
    #[clap(
        long = "position-file",
        verbatim_doc_comment,
    )]
    position_file: Option<String>,

    /// Field layout of records.
    #[clap(
        long,
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Layout::exact,
    )]
    layout: CLI_Layout,

    /// Read blocks of this size in bytes.
    /// Using the default value is recommended.
    /// Most useful for developers.
    #[clap(
        required = false,
        long,
        verbatim_doc_comment,
        default_value_t = BLOCKSZ_DEF,
        value_parser = cli_parse_blocksz,
    )]
    blocksz: BlockSz,

    /// Choose to print using colors.
    #[clap(
        required = false,
        short = 'c',
        long = "color",
        verbatim_doc_comment,
        value_enum,
        default_value_t = CLI_Color_Choice::auto,
    )]
    color_choice: CLI_Color_Choice,

    /// Print a summary of the reader to stderr.
    /// Most useful for developers.
    #[clap(
        short,
        long,
        verbatim_doc_comment,
    )]
    summary: bool,
}

/// `clap` argument validator for `--blocksz`.
fn cli_parse_blocksz(blockszs: &str) -> std::result::Result<BlockSz, String> {
    let blocksz: BlockSz = match blockszs.strip_prefix("0x") {
        Some(hex) => BlockSz::from_str_radix(hex, 16),
        None => blockszs.parse::<BlockSz>(),
    }
    .map_err(|err| format!("Unable to parse a number for --blocksz {:?} {}", blockszs, err))?;
    if !(BLOCKSZ_MIN..=BLOCKSZ_MAX).contains(&blocksz) {
        return Err(format!("--blocksz must be {} ≤ BLOCKSZ ≤ {}, it was {:?}", BLOCKSZ_MIN, BLOCKSZ_MAX, blockszs));
    }

    Ok(blocksz)
}

fn severity_color(severity: Severity) -> Option<Color> {
    match severity {
        Severity::Error => Some(Color::Red),
        Severity::Warning => Some(Color::Yellow),
        Severity::Note => Some(Color::Cyan),
        Severity::Information | Severity::Unknown => None,
    }
}

fn print_event(
    stdout: &mut StandardStream,
    event_number: EventNumber,
    event: &ResolvedEvent,
) -> Result<()> {
    let mut color_spec = ColorSpec::new();
    color_spec.set_fg(severity_color(event.severity));
    stdout.set_color(&color_spec)?;
    write!(stdout, "{:>8} {}", event_number, event)?;
    stdout.reset()?;
    writeln!(stdout)?;

    Ok(())
}

fn load_position(position_file: &str) -> Result<Option<CursorState>> {
    if !Path::new(position_file).exists() {
        defñ!("no position file {:?}", position_file);
        return Ok(None);
    }
    let json = fs::read_to_string(position_file).with_context(|| format!("reading {:?}", position_file))?;
    let state = CursorState::from_json(&json).with_context(|| format!("parsing {:?}", position_file))?;

    Ok(Some(state))
}

fn save_position(
    position_file: &str,
    state: &CursorState,
) -> Result<()> {
    let json = state.to_json()?;
    fs::write(position_file, json).with_context(|| format!("writing {:?}", position_file))?;

    Ok(())
}

fn run(args: CLI_Args) -> Result<()> {
    defn!("{:?}", args);
    let path: FPath = args.path.clone();
    let (record_layout, reference_layout) = match args.layout {
        CLI_Layout::exact => (RecordLayout::EXACT, ReferenceLayout::default()),
        CLI_Layout::platform_v8 => (RecordLayout::PLATFORM_V8_3, ReferenceLayout::platform_v8()),
    };
    let config = ReaderConfig {
        blocksz: args.blocksz,
        record_layout,
        reference_layout,
        ..ReaderConfig::default()
    };
    let source = LogSource::detect(&path).with_context(|| format!("opening {:?}", path))?;
    let mut reader = EventLogReader::with_config(source, config, ReaderHooks::default())
        .with_context(|| format!("opening {:?}", path))?;

    if args.count {
        let count = reader
            .count()
            .with_context(|| format!("counting {:?}", path))?;
        println!("{}", count);
        if args.summary {
            eprintln!("{}", reader.summary());
        }
        defx!();
        return Ok(());
    }

    if let Some(position_file) = args.position_file.as_ref() {
        if let Some(state) = load_position(position_file)? {
            reader.set_position(state)?;
        }
    }

    let color_choice: ColorChoice = match args.color_choice {
        CLI_Color_Choice::always => ColorChoice::Always,
        CLI_Color_Choice::auto => ColorChoice::Auto,
        CLI_Color_Choice::never => ColorChoice::Never,
    };
    let mut stdout = StandardStream::stdout(color_choice);
    let mut printed: Count = 0;
    let limit: Count = args.limit.unwrap_or(Count::MAX);

    if let Some(n) = args.seek {
        if !reader.seek(n)? {
            e_err!("there is no event {}", n);
        } else if printed < limit {
            if let Some(row) = reader.current_row().cloned() {
                let event = reader.resolve_row(&row)?;
                print_event(&mut stdout, n, &event)?;
                printed += 1;
            }
        }
    }

    let mut result: Result<()> = Ok(());
    while printed < limit {
        match reader.read_next() {
            Ok(Some(row)) => {
                let event_number = reader.get_position().logical_event_number;
                let event = reader.resolve_row(&row)?;
                print_event(&mut stdout, event_number, &event)?;
                printed += 1;
            }
            Ok(None) => break,
            // the producer is still writing the last record
            Err(err) if err.is_truncated() => {
                defo!("{}", err);
                break;
            }
            Err(err) => {
                result = Err(err).with_context(|| format!("reading {:?}", path));
                break;
            }
        }
    }
    stdout.flush()?;

    if let Some(position_file) = args.position_file.as_ref() {
        save_position(position_file, &reader.get_position())?;
    }
    if args.summary {
        eprintln!("{}", reader.summary());
    }
    defx!("printed {}", printed);

    result
}

/// Process the user-passed command-line arguments.
/// Determine a process return code.
pub fn main() -> ExitCode {
    if cfg!(debug_assertions) {
        stack_offset_set(Some(0));
    }
    let args = CLI_Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            e_err!("{:?}", err);
            ExitCode::FAILURE
        }
    }
}
