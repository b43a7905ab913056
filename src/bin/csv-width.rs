//! csv-width - pad or truncate every CSV row to the header's column count.
//!
//! # Usage
//!
//! ```bash
//! # stdin to stdout
//! csv-width < export.csv > fixed.csv
//!
//! # semicolon separated, rows wider than the header are an error
//! csv-width -d ';' --truncate reject export.csv -o fixed.csv
//!
//! # Windows-1252 input, tokenizer on its own thread
//! csv-width --encoding windows-1252 --threaded legacy.csv -o fixed.csv
//! ```
//!
//! When `-o` is given, output goes to a temporary file next to the target and is
//! renamed into place only after a successful run.

use clap::{Parser, ValueEnum};
use csv_width::pipeline::DEFAULT_QUEUE_CAPACITY;
use csv_width::{Dialect, LineTerminator, NormalizeOptions, Pipeline, Report, TruncatePolicy};
use std::fs::{self, File};
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TerminatorArg {
    Lf,
    Crlf,
    Auto,
}

impl From<TerminatorArg> for LineTerminator {
    fn from(arg: TerminatorArg) -> Self {
        match arg {
            TerminatorArg::Lf => LineTerminator::Lf,
            TerminatorArg::Crlf => LineTerminator::CrLf,
            TerminatorArg::Auto => LineTerminator::Auto,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum TruncateArg {
    /// Keep the leftmost columns.
    Trailing,
    /// Keep the rightmost columns.
    Leading,
    /// Fail on the first row wider than the header.
    Reject,
}

impl From<TruncateArg> for TruncatePolicy {
    fn from(arg: TruncateArg) -> Self {
        match arg {
            TruncateArg::Trailing => TruncatePolicy::DropTrailing,
            TruncateArg::Leading => TruncatePolicy::DropLeading,
            TruncateArg::Reject => TruncatePolicy::Reject,
        }
    }
}

#[derive(Parser, Debug)]
#[clap(name = "csv-width", version, about)]
struct Arguments {
    /// Input file. Reads stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Output file. Writes stdout when omitted.
    #[clap(short, long)]
    output: Option<PathBuf>,

    /// Field delimiter.
    #[clap(short, long, default_value_t = ',')]
    delimiter: char,

    /// Quote character.
    #[clap(short, long, default_value_t = '"')]
    quote: char,

    /// Line terminator written on output.
    #[clap(long, value_enum, default_value = "auto")]
    line_terminator: TerminatorArg,

    /// What to drop from rows wider than the header.
    #[clap(long, value_enum, default_value = "trailing")]
    truncate: TruncateArg,

    /// Value appended to rows shorter than the header.
    #[clap(long, default_value = "")]
    pad: String,

    /// Encoding label of the input.
    #[clap(long, default_value = "utf-8")]
    encoding: String,

    /// Strip surrounding whitespace from unquoted fields.
    #[clap(long)]
    trim: bool,

    /// Tokenize on a separate thread.
    #[clap(long)]
    threaded: bool,

    /// Rows buffered between threads with --threaded.
    #[clap(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue: usize,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[clap(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Arguments {
    fn options(&self) -> NormalizeOptions {
        let dialect = Dialect::new()
            .with_delimiter(self.delimiter)
            .with_quote(self.quote)
            .with_line_terminator(self.line_terminator.into())
            .with_trim(self.trim);

        NormalizeOptions::new()
            .with_dialect(dialect)
            .with_truncate_policy(self.truncate.into())
            .with_pad_value(self.pad.clone())
            .with_encoding(self.encoding.clone())
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn open_input(path: Option<&Path>) -> io::Result<Box<dyn Read + Send>> {
    match path {
        Some(path) if path != Path::new("-") => Ok(Box::new(BufReader::new(File::open(path)?))),
        _ => Ok(Box::new(io::stdin())),
    }
}

fn temp_path(target: &Path) -> PathBuf {
    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    target.with_file_name(format!(".{}.{}.tmp", name, process::id()))
}

/// Removes a partial output file. A file that was never created is not a failure.
fn discard_temp(temp: &Path) -> bool {
    match fs::remove_file(temp) {
        Ok(()) => true,
        Err(e) if e.kind() == io::ErrorKind::NotFound => true,
        Err(e) => {
            tracing::warn!(
                path = %temp.display(),
                error = %e,
                "failed to remove temporary output"
            );
            false
        }
    }
}

fn normalize(pipeline: &Pipeline, args: &Arguments, writer: impl Write) -> csv_width::Result<Report> {
    let reader = open_input(args.input.as_deref())?;
    if args.threaded {
        pipeline.run_threaded(reader, writer, args.queue)
    } else {
        pipeline.run(reader, writer)
    }
}

fn run(args: &Arguments) -> csv_width::Result<Report> {
    let pipeline = Pipeline::new(args.options());

    let Some(target) = args.output.as_deref() else {
        return normalize(&pipeline, args, io::stdout().lock());
    };

    let temp = temp_path(target);
    let result = File::create(&temp)
        .map_err(csv_width::Error::from)
        .and_then(|file| normalize(&pipeline, args, file));
    match result {
        Ok(report) => {
            fs::rename(&temp, target)?;
            Ok(report)
        }
        Err(e) => {
            discard_temp(&temp);
            Err(e)
        }
    }
}

fn main() {
    let args = Arguments::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(report) => {
            tracing::info!(
                rows = report.rows_written,
                padded = report.padded,
                truncated = report.truncated,
                "done"
            );
        }
        Err(e) => {
            eprintln!("ERROR: {e}");
            process::exit(1);
        }
    }
}
