//! The three append-only output destinations.
//!
//! Clean and Bad are CSV writers with a configurable output delimiter and
//! unconditional quoting; BadRaw receives the verbatim original text of
//! every invalid line, terminator included. The three never overlap: a
//! physical line contributes to exactly one of them.

use crate::error::Result;
use csv::{QuoteStyle, WriterBuilder};
use std::io::Write;

/// Default output delimiter for the clean and bad files.
pub const DEFAULT_EXPORT_DELIMITER: u8 = b'~';

/// Fixed header of the bad file.
pub const BAD_HEADER: [&str; 4] = [
    "line_number",
    "error_kind",
    "description",
    "original_content",
];

/// Classification of an invalid row for the bad-file schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowErrorKind {
    /// Empty line, unparsable line, or wrong field count.
    Structure,
    /// Unexpected error scoped to one line.
    Processing,
}

impl RowErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Structure => "StructureError",
            Self::Processing => "ProcessingError",
        }
    }
}

pub struct OutputSinks<C: Write, B: Write, W: Write> {
    clean: csv::Writer<C>,
    bad: csv::Writer<B>,
    bad_raw: W,
}

impl<C: Write, B: Write, W: Write> OutputSinks<C, B, W> {
    /// Wraps three writers. Nothing is written until the engine starts
    /// emitting rows, so a run that fails during inference leaves all
    /// three destinations empty.
    pub fn new(clean: C, bad: B, bad_raw: W, export_delimiter: u8) -> Self {
        let clean = WriterBuilder::new()
            .delimiter(export_delimiter)
            .quote_style(QuoteStyle::Always)
            .flexible(true)
            .from_writer(clean);
        let bad = WriterBuilder::new()
            .delimiter(export_delimiter)
            .quote_style(QuoteStyle::Always)
            .from_writer(bad);
        Self {
            clean,
            bad,
            bad_raw,
        }
    }

    /// Header row of the input, written verbatim to the clean file.
    pub fn write_clean_header(&mut self, fields: &[String]) -> Result<()> {
        self.clean.write_record(fields)?;
        Ok(())
    }

    pub fn write_bad_header(&mut self) -> Result<()> {
        self.bad.write_record(BAD_HEADER)?;
        Ok(())
    }

    pub fn write_clean_row(&mut self, fields: &[String]) -> Result<()> {
        self.clean.write_record(fields)?;
        Ok(())
    }

    /// One structured diagnostic record plus the verbatim offending line.
    pub fn write_bad(
        &mut self,
        line_no: u64,
        kind: RowErrorKind,
        description: &str,
        content: &str,
        raw_line: &str,
    ) -> Result<()> {
        self.bad.write_record([
            line_no.to_string().as_str(),
            kind.as_str(),
            description,
            content,
        ])?;
        self.bad_raw.write_all(raw_line.as_bytes())?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.clean.flush()?;
        self.bad.flush()?;
        self.bad_raw.flush()?;
        Ok(())
    }
}

#[cfg(test)]
impl OutputSinks<Vec<u8>, Vec<u8>, Vec<u8>> {
    /// Flushes and returns the three buffers as UTF-8 strings.
    pub(crate) fn into_strings(mut self) -> (String, String, String) {
        self.flush().unwrap();
        (
            String::from_utf8(self.clean.into_inner().unwrap()).unwrap(),
            String::from_utf8(self.bad.into_inner().unwrap()).unwrap(),
            String::from_utf8(self.bad_raw).unwrap(),
        )
    }
}
