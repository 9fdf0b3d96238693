use anyhow::{bail, Context as _, Result};
use clap::{Parser, Subcommand};
use csvscrub::config::{self, Paths};
use csvscrub::engine::encoding::{resolve_encoding, PREVIEW_SAMPLE_BYTES};
use csvscrub::engine::preview::preview_first_rows;
use csvscrub::engine::{Engine, ExpectedColumnsPolicy, OutputSinks, RunObserver, RunOptions};
use std::fs::File;
use std::io::{BufWriter, Read as _};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "csvscrub", about = "CSV structure inference and repair tool")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Split a delimited file into clean and bad outputs
    Process {
        /// Input file. Defaults to the first file in the data directory.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Clean output file. Defaults to a timestamped file in the export directory.
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bad output file. Defaults to a timestamped file in the bad directory.
        #[arg(short, long)]
        bad: Option<PathBuf>,

        /// Verbatim bad-lines file. Defaults to a companion of the bad file.
        #[arg(long)]
        bad_raw: Option<PathBuf>,

        /// Input encoding label (e.g. windows-1251). Detected when omitted.
        #[arg(long)]
        encoding: Option<String>,

        /// Input delimiter. Inferred statistically when omitted.
        #[arg(short, long)]
        delimiter: Option<char>,

        /// Output delimiter for the clean and bad files
        #[arg(long)]
        export_delimiter: Option<char>,

        /// Number of lines sampled for column statistics
        #[arg(long)]
        sample_lines: Option<usize>,

        /// Number of bytes sampled for encoding detection
        #[arg(long)]
        sample_bytes: Option<usize>,

        /// Progress log cadence in classified rows (0 disables)
        #[arg(long)]
        progress_every: Option<u64>,

        /// Fail the run when the header disagrees with the modal column count
        #[arg(long)]
        strict: bool,
    },
    /// Show the detected structure and leading rows of a file
    Preview {
        /// Input file. Defaults to the first file in the data directory.
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Number of data rows to show
        #[arg(long, default_value_t = 20)]
        rows: usize,

        /// Input encoding label. Detected when omitted.
        #[arg(long)]
        encoding: Option<String>,

        /// Input delimiter. Sniffed when omitted.
        #[arg(short, long)]
        delimiter: Option<char>,
    },
}

pub fn run_command(command: Commands) -> Result<()> {
    match command {
        Commands::Process {
            input,
            output,
            bad,
            bad_raw,
            encoding,
            delimiter,
            export_delimiter,
            sample_lines,
            sample_bytes,
            progress_every,
            strict,
        } => handle_process(ProcessArgs {
            input,
            output,
            bad,
            bad_raw,
            encoding,
            delimiter,
            export_delimiter,
            sample_lines,
            sample_bytes,
            progress_every,
            strict,
        }),
        Commands::Preview {
            input,
            rows,
            encoding,
            delimiter,
        } => handle_preview(input, rows, encoding, delimiter),
    }
}

struct ProcessArgs {
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    bad: Option<PathBuf>,
    bad_raw: Option<PathBuf>,
    encoding: Option<String>,
    delimiter: Option<char>,
    export_delimiter: Option<char>,
    sample_lines: Option<usize>,
    sample_bytes: Option<usize>,
    progress_every: Option<u64>,
    strict: bool,
}

/// Forwards engine events to `tracing`.
struct LogObserver;

impl RunObserver for LogObserver {
    fn on_progress(&mut self, valid: u64, bad: u64, total: u64) {
        tracing::info!(valid, bad, total, "processed {total} lines");
    }

    fn on_warning(&mut self, message: &str) {
        tracing::warn!("{message}");
    }
}

fn handle_process(args: ProcessArgs) -> Result<()> {
    let paths = Paths::from_env();
    paths.ensure_dirs()?;
    let settings = config::load_settings();

    let input = match args.input {
        Some(p) => p,
        None => config::default_input_file(&paths.data_dir)?,
    };
    let timestamp = config::run_timestamp();
    let clean_path = args
        .output
        .unwrap_or_else(|| config::clean_output_path(&paths.export_dir, &input, &timestamp));
    let bad_path = args
        .bad
        .unwrap_or_else(|| config::bad_output_path(&paths.bad_dir, &input, &timestamp));
    let bad_raw_path = args
        .bad_raw
        .unwrap_or_else(|| config::derive_bad_raw_path(&bad_path));

    let policy = if args.strict || settings.strict_structure_check {
        ExpectedColumnsPolicy::StrictEquality
    } else {
        ExpectedColumnsPolicy::NinetyPercentTolerance
    };
    let options = RunOptions {
        encoding: args.encoding.as_deref().map(resolve_encoding).transpose()?,
        delimiter: args.delimiter.map(delimiter_byte).transpose()?,
        policy,
        analysis_lines: args.sample_lines.unwrap_or(settings.analysis_sample_lines),
        encoding_sample_bytes: args.sample_bytes.unwrap_or(settings.encoding_sample_bytes),
        progress_every: args.progress_every.unwrap_or(settings.progress_every),
    };
    let export_delimiter =
        delimiter_byte(args.export_delimiter.unwrap_or(settings.export_delimiter))?;

    tracing::info!("processing {}", input.display());
    let file =
        File::open(&input).with_context(|| format!("failed to open {}", input.display()))?;
    let mut observer = LogObserver;
    let engine = Engine::prepare(file, options, &mut observer)?;
    tracing::info!(
        encoding = engine.encoding().name(),
        delimiter = %char::from(engine.stats().delimiter),
        expected_columns = engine.expected_columns(),
        modal_share = engine.stats().modal_share,
        "inference complete"
    );

    // Output files are created only after inference, so a failed prepare
    // leaves no partial outputs behind.
    let mut sinks = OutputSinks::new(
        BufWriter::new(File::create(&clean_path).with_context(|| {
            format!("failed to create clean output {}", clean_path.display())
        })?),
        BufWriter::new(File::create(&bad_path).with_context(|| {
            format!("failed to create bad output {}", bad_path.display())
        })?),
        BufWriter::new(File::create(&bad_raw_path).with_context(|| {
            format!("failed to create bad-raw output {}", bad_raw_path.display())
        })?),
        export_delimiter,
    );
    let summary = engine.process(&mut sinks, &mut observer)?;

    tracing::info!(
        valid = summary.counters.valid,
        bad = summary.counters.bad,
        total = summary.counters.total,
        clean = %clean_path.display(),
        bad_file = %bad_path.display(),
        "run complete"
    );
    println!("{}", summary.summary_line());
    Ok(())
}

fn handle_preview(
    input: Option<PathBuf>,
    rows: usize,
    encoding: Option<String>,
    delimiter: Option<char>,
) -> Result<()> {
    let paths = Paths::from_env();
    let input = match input {
        Some(p) => p,
        None => config::default_input_file(&paths.data_dir)?,
    };

    let mut sample = Vec::with_capacity(PREVIEW_SAMPLE_BYTES);
    File::open(&input)
        .with_context(|| format!("failed to open {}", input.display()))?
        .take(PREVIEW_SAMPLE_BYTES as u64)
        .read_to_end(&mut sample)?;

    let enc = encoding.as_deref().map(resolve_encoding).transpose()?;
    let delim = delimiter.map(delimiter_byte).transpose()?;
    let preview = preview_first_rows(&sample, enc, delim, rows)?;

    if preview.header.is_empty() {
        println!("{}: no rows to preview", input.display());
        return Ok(());
    }
    println!(
        "{} (encoding {}, delimiter {:?})",
        input.display(),
        preview.encoding,
        char::from(preview.delimiter)
    );
    println!("{}", preview.header.join(" | "));
    for row in &preview.rows {
        println!("{}", row.join(" | "));
    }
    Ok(())
}

fn delimiter_byte(c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        bail!("delimiter must be a single ASCII character, got {c:?}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory as _;

    #[test]
    fn verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn delimiter_must_be_ascii() {
        assert_eq!(delimiter_byte(';').unwrap(), b';');
        assert_eq!(delimiter_byte('\t').unwrap(), b'\t');
        assert!(delimiter_byte('€').is_err());
    }
}
