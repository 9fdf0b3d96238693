//! Column statistics: the statistical core of delimiter inference.
//!
//! Evaluates multiple candidate delimiters against a line sample, scores
//! each by how consistently it splits rows into a dominant column count
//! and picks the best. The "obvious" delimiter is not trusted: a comma
//! that appears inside free-text fields more often than the true
//! structural delimiter must lose, which is what the two-stage
//! score-then-frequency-fallback is for.

use crate::engine::sniff::{self, BASE_CANDIDATES};
use crate::engine::source::TextSource;
use crate::error::{Result, ScrubError};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::io::{Read, Seek};

/// Default line budget for the statistics sample.
pub const ANALYSIS_LINES: usize = 10_000;

/// Result of the analysis: the chosen delimiter and the column-count
/// statistics observed under it.
#[derive(Debug, Clone, PartialEq)]
pub struct DelimiterStats {
    pub delimiter: u8,
    /// Field count of the first (header) row.
    pub header_cols: usize,
    /// Most frequent field count among the sampled data rows.
    pub modal_cols: usize,
    /// Rows in the sample, header included.
    pub total_rows: usize,
    /// Fraction of data rows matching `modal_cols`; 1.0 with no data rows.
    pub modal_share: f64,
}

struct Candidate {
    stats: DelimiterStats,
    modal_count: usize,
    score: f64,
}

/// Analyzes up to `max_lines` lines from the current stream position and
/// picks the best delimiter. Non-destructive probe: the stream position is
/// restored before returning.
pub fn analyze_columns<R: Read + Seek>(
    source: &mut TextSource<R>,
    max_lines: usize,
    provided: Option<u8>,
) -> Result<DelimiterStats> {
    let pos = source.stream_position()?;
    let mut lines = Vec::new();
    for _ in 0..max_lines {
        match source.read_line()? {
            Some(line) => lines.push(line),
            None => break,
        }
    }
    source.seek(pos)?;

    if lines.is_empty() {
        return Err(ScrubError::EmptyInput);
    }
    let sample = lines.concat();

    // Ordered, de-duplicated candidate list: caller-provided, then the
    // structural sniff, then the base set.
    let mut candidates: Vec<u8> = Vec::new();
    if let Some(d) = provided {
        candidates.push(d);
    }
    if let Some(d) = sniff::sniff_sample(&sample) {
        if !candidates.contains(&d) {
            candidates.push(d);
        }
    }
    for d in BASE_CANDIDATES {
        if !candidates.contains(&d) {
            candidates.push(d);
        }
    }

    // Raw character frequency per candidate, independent of parse success.
    let mean_freq: Vec<(u8, f64)> = candidates
        .iter()
        .map(|&d| {
            let total: usize = lines.iter().map(|l| sniff::count_occurrences(l, d)).sum();
            (d, total as f64 / lines.len().max(1) as f64)
        })
        .collect();

    let mut scored: Vec<Candidate> = candidates
        .iter()
        .filter_map(|&d| measure(&sample, d))
        .collect();

    if scored.is_empty() {
        // No candidate parsed; recompute for the caller's delimiter (or
        // comma) without ranking. Only a sample with no rows at all is an
        // empty-input failure.
        let d = provided.unwrap_or(b',');
        return measure(&sample, d)
            .map(|c| c.stats)
            .ok_or(ScrubError::EmptyInput);
    }

    scored.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then(b.modal_count.cmp(&a.modal_count))
            .then(b.stats.modal_cols.cmp(&a.stats.modal_cols))
    });
    let best = scored.swap_remove(0);

    // Degenerate winner: a delimiter whose modal count is 1 never actually
    // splits anything, so parse quality is meaningless. Fall back to raw
    // frequency and recompute for that delimiter alone.
    if best.stats.modal_cols == 1 {
        let mut freq_best: Option<(u8, f64)> = None;
        for &(d, f) in &mean_freq {
            match freq_best {
                Some((_, best_f)) if f <= best_f => {}
                _ => freq_best = Some((d, f)),
            }
        }
        if let Some((d, _)) = freq_best {
            if let Some(candidate) = measure(&sample, d) {
                return Ok(candidate.stats);
            }
        }
    }

    Ok(best.stats)
}

/// Quote-aware parse of the whole sample under one candidate delimiter.
/// Returns `None` when the sample does not parse into any rows.
fn measure(sample: &str, delimiter: u8) -> Option<Candidate> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(sample.as_bytes());

    let mut lengths = Vec::new();
    for record in reader.records() {
        match record {
            Ok(r) => lengths.push(r.len()),
            Err(_) => return None,
        }
    }
    let (&header_cols, data) = lengths.split_first()?;

    let (modal_cols, modal_count, modal_share) = if data.is_empty() {
        (header_cols, 0, 1.0)
    } else {
        let mut counts: HashMap<usize, usize> = HashMap::new();
        for &n in data {
            *counts.entry(n).or_insert(0) += 1;
        }
        // Ties broken toward the larger column count.
        let (&cols, &count) = counts
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then(a.0.cmp(b.0)))?;
        (cols, count, count as f64 / data.len().max(1) as f64)
    };

    Some(Candidate {
        stats: DelimiterStats {
            delimiter,
            header_cols,
            modal_cols,
            total_rows: lengths.len(),
            modal_share,
        },
        modal_count,
        score: modal_share,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::UTF_8;
    use std::fmt::Write as _;
    use std::io::Cursor;

    fn source_from(text: &str) -> TextSource<Cursor<Vec<u8>>> {
        TextSource::new(Cursor::new(text.as_bytes().to_vec()), UTF_8)
    }

    fn analyze(text: &str, provided: Option<u8>) -> DelimiterStats {
        analyze_columns(&mut source_from(text), ANALYSIS_LINES, provided).unwrap()
    }

    #[test]
    fn empty_sample_is_an_error() {
        let err = analyze_columns(&mut source_from(""), ANALYSIS_LINES, None).unwrap_err();
        assert!(matches!(err, ScrubError::EmptyInput));
    }

    #[test]
    fn clean_comma_file() {
        let stats = analyze("a,b,c\n1,2,3\n4,5,6\n", None);
        assert_eq!(stats.delimiter, b',');
        assert_eq!(stats.header_cols, 3);
        assert_eq!(stats.modal_cols, 3);
        assert_eq!(stats.total_rows, 3);
        assert!((stats.modal_share - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn prefers_consistent_splitter_over_noisy_comma() {
        // 95% of rows split into 5 fields under ';' while commas inside
        // the free-text field split rows inconsistently.
        let mut text = String::from("h1;h2;h3;h4;h5\n");
        for i in 0..20 {
            if i == 7 {
                text.push_str("a;b;c;d\n"); // the one ragged row
            } else if i % 5 < 3 {
                writeln!(text, "a;b;c;d;note, with comma").unwrap();
            } else {
                writeln!(text, "a;b;c;d;plain note").unwrap();
            }
        }
        let stats = analyze(&text, None);
        assert_eq!(stats.delimiter, b';');
        assert_eq!(stats.modal_cols, 5);
        assert!((stats.modal_share - 0.95).abs() < 1e-9);
    }

    #[test]
    fn degenerate_single_column_winner_falls_back_to_frequency() {
        // '|' is the true delimiter but 40% of its rows are ragged, so its
        // score (0.6) loses to candidates that never split anything and
        // thus score a meaningless 1.0 with modal_cols == 1. The frequency
        // fallback must rescue '|'.
        let mut text = String::from("h1|h2|h3\n");
        for i in 0..10 {
            if i < 6 {
                text.push_str("x|y|z\n");
            } else {
                text.push_str("x|y\n");
            }
        }
        let stats = analyze(&text, None);
        assert_eq!(stats.delimiter, b'|');
        assert_eq!(stats.modal_cols, 3);
        assert!((stats.modal_share - 0.6).abs() < 1e-9);
    }

    #[test]
    fn modal_ties_break_toward_larger_column_count() {
        // One 3-field row and one 2-field row under '|': modal is 3.
        let stats = analyze("a|b|c\n1|2|3\n4|5\n", Some(b'|'));
        assert_eq!(stats.modal_cols, 3);
        assert_eq!(stats.total_rows, 3);
    }

    #[test]
    fn caller_delimiter_is_tried_first() {
        let stats = analyze("a~b~c\n1~2~3\n4~5~6\n", Some(b'~'));
        assert_eq!(stats.delimiter, b'~');
        assert_eq!(stats.modal_cols, 3);
    }

    #[test]
    fn header_only_sample_scores_one() {
        let stats = analyze("a,b,c\n", None);
        assert_eq!(stats.header_cols, 3);
        assert_eq!(stats.modal_cols, 3);
        assert_eq!(stats.total_rows, 1);
        assert!((stats.modal_share - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn probe_restores_stream_position() {
        let mut src = source_from("a,b\n1,2\n3,4\n");
        analyze_columns(&mut src, ANALYSIS_LINES, None).unwrap();
        assert_eq!(src.read_line().unwrap().unwrap(), "a,b\n");
    }

    #[test]
    fn quoted_delimiters_do_not_split_fields() {
        let stats = analyze("a,b\n\"x,y\",2\n\"p,q\",4\n", None);
        assert_eq!(stats.delimiter, b',');
        assert_eq!(stats.modal_cols, 2);
    }
}
