//! Cheap single-pass delimiter sniffing.
//!
//! Used only by the interactive preview path; the repair run relies on the
//! full column statistics in [`crate::engine::stats`] instead.

use crate::engine::source::TextSource;
use crate::error::Result;
use qsv_sniffer::{SampleSize, Sniffer};
use std::io::{Cursor, Read, Seek};

/// Candidate delimiters tried by the frequency fallback, in order.
pub const BASE_CANDIDATES: [u8; 4] = [b',', b';', b'\t', b'|'];

/// Default line sample for the sniff.
pub const SNIFF_LINES: usize = 30;

/// Guesses the delimiter from a small line sample taken at the current
/// stream position; the position is restored before returning.
///
/// Tries a structural dialect sniff first, then falls back to picking the
/// base candidate with the highest total occurrence count.
pub fn sniff_delimiter<R: Read + Seek>(
    source: &mut TextSource<R>,
    max_lines: usize,
) -> Result<u8> {
    let pos = source.stream_position()?;
    let mut lines = Vec::new();
    for _ in 0..max_lines {
        match source.read_line()? {
            Some(line) => lines.push(line),
            None => break,
        }
    }
    source.seek(pos)?;

    let sample = lines.concat();
    if let Some(delimiter) = sniff_sample(&sample) {
        return Ok(delimiter);
    }
    Ok(best_by_frequency(&lines).unwrap_or(b','))
}

/// Structural dialect sniff of an in-memory sample.
pub(crate) fn sniff_sample(sample: &str) -> Option<u8> {
    if sample.is_empty() {
        return None;
    }
    let mut sniffer = Sniffer::new();
    sniffer
        .sample_size(SampleSize::All)
        .sniff_reader(Cursor::new(sample.as_bytes()))
        .ok()
        .map(|metadata| metadata.dialect.delimiter)
}

pub(crate) fn count_occurrences(line: &str, delimiter: u8) -> usize {
    line.bytes().filter(|&b| b == delimiter).count()
}

/// Base candidate with the highest total occurrence count across the
/// sample; earlier candidates win ties.
pub(crate) fn best_by_frequency(lines: &[String]) -> Option<u8> {
    if lines.is_empty() {
        return None;
    }
    let mut best = None;
    let mut best_count = 0usize;
    for candidate in BASE_CANDIDATES {
        let count: usize = lines
            .iter()
            .map(|line| count_occurrences(line, candidate))
            .sum();
        if best.is_none() || count > best_count {
            best = Some(candidate);
            best_count = count;
        }
    }
    best
}
