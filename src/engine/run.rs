//! Engine orchestration: one run per file, in two phases.
//!
//! [`Engine::prepare`] performs all inference (encoding, delimiter
//! statistics, expected-columns resolution); every fatal error happens
//! here, before any sink exists. [`Engine::process`] then rewinds the
//! stream once and classifies every line into the caller's sinks.
//!
//! The engine owns its input stream and sinks exclusively for the
//! duration of one run; run independent instances for concurrent files.

use crate::engine::encoding::{self, BATCH_SAMPLE_BYTES};
use crate::engine::observer::RunObserver;
use crate::engine::resolve::{self, ExpectedColumnsPolicy};
use crate::engine::sinks::OutputSinks;
use crate::engine::source::TextSource;
use crate::engine::stats::{self, DelimiterStats, ANALYSIS_LINES};
use crate::engine::validate::{parse_line, StreamingValidator};
use crate::error::{Result, ScrubError};
use encoding_rs::Encoding;
use std::io::{Read, Seek, SeekFrom, Write};

use super::validate::RunCounters;

/// Caller-tunable knobs for one run.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Encoding override; detected from a byte sample when `None`.
    pub encoding: Option<&'static Encoding>,
    /// Delimiter override; becomes the first statistics candidate.
    pub delimiter: Option<u8>,
    pub policy: ExpectedColumnsPolicy,
    /// Line budget for the column statistics sample.
    pub analysis_lines: usize,
    /// Byte sample size for encoding detection.
    pub encoding_sample_bytes: usize,
    /// Progress cadence in classified rows; 0 disables progress events.
    pub progress_every: u64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            encoding: None,
            delimiter: None,
            policy: ExpectedColumnsPolicy::default(),
            analysis_lines: ANALYSIS_LINES,
            encoding_sample_bytes: BATCH_SAMPLE_BYTES,
            progress_every: 5_000,
        }
    }
}

/// Final accounting of a completed run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub counters: RunCounters,
    pub delimiter: u8,
    pub encoding: String,
    pub expected_columns: usize,
    pub stats: DelimiterStats,
}

impl RunSummary {
    /// Stable machine-parseable line for a calling process.
    pub fn summary_line(&self) -> String {
        format!(
            "__SUMMARY__ VALID={} BAD={}",
            self.counters.valid, self.counters.bad
        )
    }
}

pub struct Engine<R: Read + Seek> {
    source: TextSource<R>,
    options: RunOptions,
    stats: DelimiterStats,
    expected_columns: usize,
}

impl<R: Read + Seek> Engine<R> {
    /// Phase one: inference. Detects the encoding from a byte sample,
    /// gathers column statistics over the line budget and resolves the
    /// expected column count under the configured policy. The input is
    /// left positioned at the start.
    pub fn prepare(
        mut input: R,
        options: RunOptions,
        observer: &mut dyn RunObserver,
    ) -> Result<Self> {
        let enc = match options.encoding {
            Some(e) => e,
            None => {
                let mut sample = Vec::with_capacity(options.encoding_sample_bytes);
                input
                    .by_ref()
                    .take(options.encoding_sample_bytes as u64)
                    .read_to_end(&mut sample)?;
                input.seek(SeekFrom::Start(0))?;
                encoding::detect_encoding(&sample)
            }
        };

        let mut source = TextSource::new(input, enc);
        let stats = stats::analyze_columns(&mut source, options.analysis_lines, options.delimiter)?;
        let expected_columns = resolve::resolve_expected_columns(options.policy, &stats, observer)?;

        Ok(Self {
            source,
            options,
            stats,
            expected_columns,
        })
    }

    pub fn stats(&self) -> &DelimiterStats {
        &self.stats
    }

    pub fn expected_columns(&self) -> usize {
        self.expected_columns
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.source.encoding()
    }

    /// Phase two: classification. Performs the single rewind between the
    /// statistics pass and the classification pass, writes the header to
    /// the clean sink and streams every data line through the validator.
    pub fn process<C, B, W>(
        mut self,
        sinks: &mut OutputSinks<C, B, W>,
        observer: &mut dyn RunObserver,
    ) -> Result<RunSummary>
    where
        C: Write,
        B: Write,
        W: Write,
    {
        self.source.rewind()?;

        let mut validator = StreamingValidator::new(
            self.stats.delimiter,
            self.expected_columns,
            self.options.progress_every,
        );

        // Header: physical line 1, written verbatim to the clean sink.
        let header_line = self.source.read_line()?.ok_or(ScrubError::EmptyInput)?;
        validator.count_header();
        let header = match parse_line(&header_line, self.stats.delimiter) {
            Ok(Some(fields)) if !fields.is_empty() => fields,
            _ => return Err(ScrubError::Other("failed to parse header row".to_owned())),
        };
        sinks.write_clean_header(&header)?;
        sinks.write_bad_header()?;

        validator.run(&mut self.source, sinks, observer)?;
        sinks.flush()?;

        Ok(RunSummary {
            counters: validator.counters(),
            delimiter: self.stats.delimiter,
            encoding: self.source.encoding().name().to_owned(),
            expected_columns: self.expected_columns,
            stats: self.stats,
        })
    }
}

/// Convenience for the common case: prepare and process in one call with
/// a single set of in-memory or file sinks.
pub fn run_to_sinks<R, C, B, W>(
    input: R,
    options: RunOptions,
    sinks: &mut OutputSinks<C, B, W>,
    observer: &mut dyn RunObserver,
) -> Result<RunSummary>
where
    R: Read + Seek,
    C: Write,
    B: Write,
    W: Write,
{
    let engine = Engine::prepare(input, options, observer)?;
    engine.process(sinks, observer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::observer::NullObserver;
    use crate::engine::sinks::DEFAULT_EXPORT_DELIMITER;
    use std::io::Cursor;

    fn run(data: &[u8], options: RunOptions) -> (RunSummary, String, String, String) {
        let mut clean = Vec::new();
        let mut bad = Vec::new();
        let mut raw = Vec::new();
        let summary = {
            let mut sinks = OutputSinks::new(&mut clean, &mut bad, &mut raw, DEFAULT_EXPORT_DELIMITER);
            run_to_sinks(
                Cursor::new(data.to_vec()),
                options,
                &mut sinks,
                &mut NullObserver,
            )
            .unwrap()
        };
        (
            summary,
            String::from_utf8(clean).unwrap(),
            String::from_utf8(bad).unwrap(),
            String::from_utf8(raw).unwrap(),
        )
    }

    #[test]
    fn end_to_end_clean_file() {
        let (summary, clean, bad, raw) =
            run(b"id,name\n1,alice\n2,bob\n", RunOptions::default());
        assert_eq!(summary.counters.valid, 2);
        assert_eq!(summary.counters.bad, 0);
        assert_eq!(summary.counters.total, 3);
        assert_eq!(summary.delimiter, b',');
        assert_eq!(summary.expected_columns, 2);
        assert_eq!(summary.encoding, "UTF-8");
        assert_eq!(
            clean,
            "\"id\"~\"name\"\n\"1\"~\"alice\"\n\"2\"~\"bob\"\n"
        );
        assert_eq!(bad.lines().count(), 1); // header only
        assert!(raw.is_empty());
    }

    #[test]
    fn empty_input_produces_no_output_at_all() {
        let mut clean = Vec::new();
        let mut bad = Vec::new();
        let mut raw = Vec::new();
        let mut sinks =
            OutputSinks::new(&mut clean, &mut bad, &mut raw, DEFAULT_EXPORT_DELIMITER);
        let err = run_to_sinks(
            Cursor::new(Vec::new()),
            RunOptions::default(),
            &mut sinks,
            &mut NullObserver,
        )
        .unwrap_err();
        assert!(matches!(err, ScrubError::EmptyInput));
        drop(sinks);
        assert!(clean.is_empty());
        assert!(bad.is_empty());
        assert!(raw.is_empty());
    }

    #[test]
    fn summary_line_format() {
        let (summary, _, _, _) = run(b"a,b\n1,2\nbroken\n", RunOptions::default());
        assert_eq!(summary.summary_line(), "__SUMMARY__ VALID=1 BAD=1");
    }

    #[test]
    fn identical_inputs_give_identical_outputs() {
        let data = b"a;b;c\n1;2;3\nragged;row\n4;5;6\n";
        let opts = RunOptions {
            delimiter: Some(b';'),
            ..RunOptions::default()
        };
        let first = run(data, opts.clone());
        let second = run(data, opts);
        assert_eq!(first.1, second.1);
        assert_eq!(first.2, second.2);
        assert_eq!(first.3, second.3);
    }

    #[test]
    fn strict_policy_aborts_before_processing() {
        // Header has 2 columns, data rows consistently 3.
        let data = b"a;b\n1;2;3\n4;5;6\n7;8;9\n1;2;3\n4;5;6\n7;8;9\n1;2;3\n4;5;6\n7;8;9\n9;9;9\n";
        let mut clean = Vec::new();
        let mut bad = Vec::new();
        let mut raw = Vec::new();
        let mut sinks =
            OutputSinks::new(&mut clean, &mut bad, &mut raw, DEFAULT_EXPORT_DELIMITER);
        let err = run_to_sinks(
            Cursor::new(data.to_vec()),
            RunOptions {
                policy: ExpectedColumnsPolicy::StrictEquality,
                delimiter: Some(b';'),
                ..RunOptions::default()
            },
            &mut sinks,
            &mut NullObserver,
        )
        .unwrap_err();
        assert!(matches!(err, ScrubError::StructureMismatch { .. }));
        drop(sinks);
        assert!(clean.is_empty());
    }

    #[test]
    fn tolerant_policy_enforces_modal_count_on_the_same_file() {
        let data = b"a;b\n1;2;3\n4;5;6\n7;8;9\n1;2;3\n4;5;6\n7;8;9\n1;2;3\n4;5;6\n7;8;9\n9;9;9\n";
        let (summary, _, bad, _) = run(
            data,
            RunOptions {
                delimiter: Some(b';'),
                ..RunOptions::default()
            },
        );
        // modal share 1.0 >= 0.9, so expected_columns = 3 and every data
        // row is valid despite the 2-column header.
        assert_eq!(summary.expected_columns, 3);
        assert_eq!(summary.counters.valid, 10);
        assert_eq!(bad.lines().count(), 1);
    }

    #[test]
    fn windows_1251_input_decodes_into_utf8_outputs() {
        let (bytes, _, _) =
            encoding_rs::WINDOWS_1251.encode("имя,город\nанна,москва\nборис,казань\n");
        let (summary, clean, _, _) = run(
            &bytes,
            RunOptions {
                encoding: Some(encoding_rs::WINDOWS_1251),
                ..RunOptions::default()
            },
        );
        assert_eq!(summary.counters.valid, 2);
        assert_eq!(summary.encoding, "windows-1251");
        assert!(clean.contains("москва"));
    }

    #[test]
    fn non_ascii_input_is_not_treated_as_ascii() {
        let (bytes, _, _) = encoding_rs::WINDOWS_1251.encode("имя,город\nанна,москва\n");
        let mut observer = NullObserver;
        let engine =
            Engine::prepare(Cursor::new(bytes.into_owned()), RunOptions::default(), &mut observer)
                .unwrap();
        assert_ne!(engine.encoding(), encoding_rs::UTF_8);
    }
}
