//! The per-line state machine that classifies every physical line.
//!
//! After the statistics passes have fixed the delimiter and expected
//! column count, the validator consumes the decoded stream exactly once.
//! Each physical data line is accounted for in exactly one of: standalone
//! valid, first half of a splice, second half of a splice, standalone
//! invalid. No line is classified twice; none is silently dropped.
//!
//! The splice repair is deliberately bounded: a line that fails alone is
//! concatenated with exactly the one line that follows it. When that also
//! fails, the current line goes to the bad sinks and the follower is
//! re-buffered to be evaluated from scratch on the next iteration; it is
//! never assumed to belong to whatever line comes after it.

use crate::engine::observer::RunObserver;
use crate::engine::sinks::{OutputSinks, RowErrorKind};
use crate::engine::source::TextSource;
use crate::error::Result;
use std::io::{Read, Seek, Write};

/// Monotonically non-decreasing run totals, mutated only by the validator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunCounters {
    pub valid: u64,
    pub bad: u64,
    /// Physical lines actually read from the stream, header included.
    pub total: u64,
}

/// Classification of one physical line (or of a two-line splice).
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Valid(Vec<String>),
    /// Two physical lines recombined into one structurally valid row.
    SplicedValid(Vec<String>),
    Invalid {
        line_no: u64,
        kind: RowErrorKind,
        reason: String,
        /// Verbatim line text, original terminator included.
        raw: String,
    },
}

/// Parses one line (or a two-line concatenation) alone with the fixed
/// delimiter. `Ok(None)` means the text could not be parsed as a row at
/// all; blank input parses to an empty row.
pub(crate) fn parse_line(
    text: &str,
    delimiter: u8,
) -> std::result::Result<Option<Vec<String>>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    match reader.records().next() {
        None => Ok(Some(Vec::new())),
        Some(Ok(record)) => Ok(Some(record.iter().map(str::to_owned).collect())),
        Some(Err(e)) => match e.kind() {
            // An I/O failure mid-record is an unexpected per-row error;
            // anything else just means the row does not parse.
            csv::ErrorKind::Io(_) => Err(e),
            _ => Ok(None),
        },
    }
}

pub struct StreamingValidator {
    delimiter: u8,
    expected_columns: usize,
    progress_every: u64,
    /// At most one unclassified physical line carried across iterations.
    lookahead: Option<String>,
    /// Physical line number of the line about to be classified; the
    /// header is line 1, so data starts at 2.
    line_no: u64,
    counters: RunCounters,
}

impl StreamingValidator {
    pub fn new(delimiter: u8, expected_columns: usize, progress_every: u64) -> Self {
        Self {
            delimiter,
            expected_columns,
            progress_every,
            lookahead: None,
            line_no: 2,
            counters: RunCounters::default(),
        }
    }

    pub fn counters(&self) -> RunCounters {
        self.counters
    }

    /// Records the header line (physical line 1) in the totals.
    pub(crate) fn count_header(&mut self) {
        self.counters.total += 1;
    }

    /// Consumes the stream from just past the header, writing every
    /// outcome to the sinks. Terminates at EOF with an empty lookahead.
    pub fn run<R, C, B, W>(
        &mut self,
        source: &mut TextSource<R>,
        sinks: &mut OutputSinks<C, B, W>,
        observer: &mut dyn RunObserver,
    ) -> Result<()>
    where
        R: Read + Seek,
        C: Write,
        B: Write,
        W: Write,
    {
        loop {
            let current = match self.lookahead.take() {
                // Already counted when first read from the stream.
                Some(line) => line,
                None => match source.read_line()? {
                    Some(line) => {
                        self.counters.total += 1;
                        line
                    }
                    None => break,
                },
            };

            match self.classify(&current, source)? {
                Outcome::Valid(row) | Outcome::SplicedValid(row) => {
                    sinks.write_clean_row(&row)?;
                    self.counters.valid += 1;
                }
                Outcome::Invalid {
                    line_no,
                    kind,
                    reason,
                    raw,
                } => {
                    let content = raw.trim_end_matches(['\r', '\n']);
                    sinks.write_bad(line_no, kind, &reason, content, &raw)?;
                    self.counters.bad += 1;
                }
            }

            if self.progress_every > 0
                && (self.counters.valid + self.counters.bad) % self.progress_every == 0
            {
                observer.on_progress(self.counters.valid, self.counters.bad, self.counters.total);
            }
        }
        Ok(())
    }

    /// Classifies one physical line, reading at most one further line for
    /// the bounded splice repair.
    pub(crate) fn classify<R: Read + Seek>(
        &mut self,
        current: &str,
        source: &mut TextSource<R>,
    ) -> Result<Outcome> {
        let parsed = parse_line(current, self.delimiter);
        if let Ok(Some(row)) = &parsed {
            if row.len() == self.expected_columns {
                self.line_no += 1;
                return Ok(Outcome::Valid(row.clone()));
            }
        }

        match source.read_line()? {
            Some(next_line) => {
                self.counters.total += 1;
                let combined = format!(
                    "{}{}",
                    current.trim_end_matches(['\r', '\n']),
                    next_line.trim_start_matches(['\r', '\n']),
                );
                if let Ok(Some(row)) = parse_line(&combined, self.delimiter) {
                    if row.len() == self.expected_columns {
                        // Both physical lines consumed by the splice.
                        self.line_no += 2;
                        return Ok(Outcome::SplicedValid(row));
                    }
                }
                // Failed splice: only the current line is classified; the
                // further line goes back into the lookahead buffer.
                let outcome = self.invalid_outcome(current, &parsed);
                self.lookahead = Some(next_line);
                self.line_no += 1;
                Ok(outcome)
            }
            None => {
                let outcome = self.invalid_outcome(current, &parsed);
                self.line_no += 1;
                Ok(outcome)
            }
        }
    }

    /// Reason selection for an invalid line; the first matching rule wins.
    fn invalid_outcome(
        &self,
        raw: &str,
        parsed: &std::result::Result<Option<Vec<String>>, csv::Error>,
    ) -> Outcome {
        let content = raw.trim_end_matches(['\r', '\n']);
        let expected = self.expected_columns;
        let (kind, reason) = if content.trim().is_empty() {
            (RowErrorKind::Structure, "empty line".to_owned())
        } else {
            match parsed {
                Err(e) => (RowErrorKind::Processing, format!("processing error: {e}")),
                Ok(None) => (
                    RowErrorKind::Structure,
                    format!("unparsable row, expected {expected} columns"),
                ),
                Ok(Some(row)) => (
                    RowErrorKind::Structure,
                    format!("wrong column count: {} instead of {expected}", row.len()),
                ),
            }
        };
        Outcome::Invalid {
            line_no: self.line_no,
            kind,
            reason,
            raw: raw.to_owned(),
        }
    }
}
