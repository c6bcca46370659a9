mod logging;

use clap::{Parser, Subcommand};
use esnpad::kernel::services::adapters::{ensure_settings_file, load_settings, LocalFileProvider};
use esnpad::kernel::services::ports::{FileProvider, Settings};
use esnpad::kernel::{
    detect, Document, DocumentError, EncodingTag, MatchResult, SearchCursor, SearchDirection,
    SearchQuery,
};
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser)]
#[command(author, version, about = "Plain text encoding and find tool", long_about = None)]
struct Cli {
    /// Log debug events
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the encoding a file is detected as
    Detect {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Save a file again in another encoding
    Convert {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// utf8, utf8-bom or utf16le (default from settings)
        #[arg(short, long, value_name = "ENCODING")]
        to: Option<EncodingTag>,

        /// Write here instead of overwriting FILE
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Find text in a file
    Find {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        #[arg(value_name = "PATTERN")]
        pattern: String,

        #[arg(long)]
        match_case: bool,

        /// Search towards the beginning of the file
        #[arg(long)]
        backward: bool,

        /// Selection start in code units
        #[arg(long)]
        start: Option<usize>,

        /// Selection end in code units
        #[arg(long)]
        end: Option<usize>,

        /// Keep finding until the end (or beginning) of the file
        #[arg(long)]
        all: bool,
    },
    /// Print the settings file path, writing defaults if it is missing
    Settings,
}

/// Result of a command that ran to completion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Success,
    /// Nothing to report (no match, undecodable input); exit 1.
    Failure,
}

impl From<Status> for ExitCode {
    fn from(status: Status) -> Self {
        match status {
            Status::Success => ExitCode::SUCCESS,
            Status::Failure => ExitCode::FAILURE,
        }
    }
}

#[derive(Debug)]
enum CliError {
    Document(DocumentError),
    Io(io::Error),
    /// `encode` would write UTF-8 under this label.
    Unsaveable(EncodingTag),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Document(e) => write!(f, "{}", e),
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Unsaveable(tag) => write!(
                f,
                "Cannot save as {}, choose utf8, utf8-bom or utf16le",
                tag
            ),
        }
    }
}

impl std::error::Error for CliError {}

impl From<DocumentError> for CliError {
    fn from(e: DocumentError) -> Self {
        CliError::Document(e)
    }
}

impl From<esnpad::kernel::services::ports::FileError> for CliError {
    fn from(e: esnpad::kernel::services::ports::FileError) -> Self {
        CliError::Document(DocumentError::File(e))
    }
}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        CliError::Io(e)
    }
}

type CliResult = Result<Status, CliError>;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = load_settings().unwrap_or_default();

    let filter = if cli.verbose {
        "esnpad=debug"
    } else {
        settings.log_filter.as_str()
    };
    let _logging = logging::init(filter);

    let provider = LocalFileProvider::new();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    let result = match cli.command {
        Command::Detect { file } => run_detect(&provider, &file, &mut out),
        Command::Convert { file, to, output } => run_convert(
            &provider,
            &settings,
            &file,
            to,
            output.as_deref(),
            &mut out,
        ),
        Command::Find {
            file,
            pattern,
            match_case,
            backward,
            start,
            end,
            all,
        } => {
            let direction = if backward {
                SearchDirection::Backward
            } else {
                SearchDirection::Forward
            };
            let query = SearchQuery::new(&pattern, match_case, direction)
                .with_case_fold(settings.case_fold);
            run_find(&provider, &file, &query, (start, end), all, &mut out)
        }
        Command::Settings => run_settings(&mut out),
    };

    match result {
        Ok(status) => status.into(),
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run_detect(provider: &dyn FileProvider, file: &Path, out: &mut dyn Write) -> CliResult {
    let mut doc = Document::new();
    match doc.open(provider, file) {
        Ok(()) => {
            writeln!(out, "{}\t{}", doc.encoding(), doc.text().len())?;
            Ok(Status::Success)
        }
        Err(DocumentError::Decode(e)) => {
            let bytes = provider.read_file_bytes(file)?;
            writeln!(out, "{}\t-", detect(&bytes))?;
            eprintln!("error: {e}");
            Ok(Status::Failure)
        }
        Err(e) => Err(e.into()),
    }
}

fn run_convert(
    provider: &dyn FileProvider,
    settings: &Settings,
    file: &Path,
    to: Option<EncodingTag>,
    output: Option<&Path>,
    out: &mut dyn Write,
) -> CliResult {
    let to = match to {
        Some(tag) if !tag.is_saveable() => return Err(CliError::Unsaveable(tag)),
        Some(tag) => tag,
        None => settings.save_encoding(),
    };

    let mut doc = Document::new();
    // never overwrite a file that did not decode
    doc.open(provider, file)?;

    if to != EncodingTag::Utf16Le && doc.text().has_unpaired_surrogates() {
        tracing::warn!(path = %file.display(), "unpaired surrogates written as U+FFFD");
        eprintln!("warning: unpaired surrogates are written as U+FFFD in {to}");
    }

    let from = doc.encoding();
    let target = output.unwrap_or(file);
    doc.save_as(provider, target, to)?;

    writeln!(out, "{}: {} -> {}", target.display(), from, to)?;
    Ok(Status::Success)
}

/// `selection` is the `--start`/`--end` pair; a missing start is the end of
/// the text when searching backward, else 0.
fn run_find(
    provider: &dyn FileProvider,
    file: &Path,
    query: &SearchQuery,
    selection: (Option<usize>, Option<usize>),
    all: bool,
    out: &mut dyn Write,
) -> CliResult {
    let mut doc = Document::new();
    doc.open(provider, file)?;

    let default = match query.direction {
        SearchDirection::Forward => 0,
        SearchDirection::Backward => doc.text().len(),
    };
    let start = selection.0.unwrap_or(default);
    doc.set_selection(SearchCursor::new(start, selection.1.unwrap_or(start)));

    let mut found = 0usize;
    while let MatchResult::Found { start, length } = doc.find_next(query) {
        let matched = String::from_utf16_lossy(doc.text().slice(start, length));
        tracing::debug!(start, length, %matched, "match");
        writeln!(out, "{start} {length}")?;
        found += 1;
        if !all {
            break;
        }
    }

    if found == 0 {
        writeln!(out, "not found")?;
        return Ok(Status::Failure);
    }
    Ok(Status::Success)
}

fn run_settings(out: &mut dyn Write) -> CliResult {
    let path = ensure_settings_file()?;
    writeln!(out, "{}", path.display())?;
    Ok(Status::Success)
}

#[cfg(test)]
#[path = "../tests/unit/cli.rs"]
mod tests;
