//! First-rows preview for an interactive front end.
//!
//! Works on an in-memory byte sample rather than the whole file, so a
//! dashboard can show the detected encoding, delimiter and leading rows
//! without paying for a full pass.

use crate::engine::encoding::{self, PREVIEW_SAMPLE_BYTES};
use crate::engine::sniff::{self, SNIFF_LINES};
use crate::engine::source::TextSource;
use crate::error::Result;
use encoding_rs::Encoding;
use std::io::Cursor;

/// Default number of data rows shown by a preview.
pub const PREVIEW_ROWS: usize = 200;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preview {
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
    pub encoding: String,
    pub delimiter: u8,
}

/// Builds a preview from a byte sample taken at the start of a file. A
/// sample without a header yields an empty preview rather than an error;
/// that case is presentation-side.
pub fn preview_first_rows(
    sample: &[u8],
    encoding_override: Option<&'static Encoding>,
    delimiter_override: Option<u8>,
    limit: usize,
) -> Result<Preview> {
    let head = &sample[..sample.len().min(PREVIEW_SAMPLE_BYTES)];
    let enc = encoding_override.unwrap_or_else(|| encoding::detect_encoding(head));

    let mut source = TextSource::new(Cursor::new(sample.to_vec()), enc);
    let delimiter = match delimiter_override {
        Some(d) => d,
        None => sniff::sniff_delimiter(&mut source, SNIFF_LINES)?,
    };

    // Decode the whole sample, then parse quote-aware so that records
    // spanning physical lines stay intact in the preview.
    let mut text = String::new();
    while let Some(line) = source.read_line()? {
        text.push_str(&line);
    }

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = match records.next() {
        Some(Ok(record)) => record.iter().map(str::to_owned).collect(),
        _ => Vec::new(),
    };

    let mut rows = Vec::new();
    if !header.is_empty() {
        for record in records.take(limit) {
            match record {
                Ok(r) => rows.push(r.iter().map(str::to_owned).collect()),
                Err(_) => break,
            }
        }
    }

    Ok(Preview {
        header,
        rows,
        encoding: enc.name().to_owned(),
        delimiter,
    })
}
