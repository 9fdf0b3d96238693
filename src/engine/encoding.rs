//! Byte-encoding detection.
//!
//! The statistical guess itself is delegated to `chardetng`; this module
//! only adds the sample-size configuration for the two call sites and the
//! ASCII upgrade rule.

use crate::error::{Result, ScrubError};
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};

/// Byte sample size used by the interactive preview path.
pub const PREVIEW_SAMPLE_BYTES: usize = 100_000;

/// Byte sample size used by the batch path.
pub const BATCH_SAMPLE_BYTES: usize = 10_000;

/// Guesses the encoding of a byte sample taken from the start of a file.
///
/// An ASCII-only sample is upgraded to UTF-8: it does not prove the rest
/// of the file is ASCII. This function never fails; degenerate input
/// yields UTF-8.
pub fn detect_encoding(sample: &[u8]) -> &'static Encoding {
    if sample.is_empty() || sample.is_ascii() {
        return UTF_8;
    }

    let mut detector = EncodingDetector::new();
    detector.feed(sample, true);
    detector.guess(None, true)
}

/// Resolves a caller-provided encoding label (e.g. `"windows-1251"`).
pub fn resolve_encoding(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ScrubError::Config(format!("unknown encoding label: {label}")))
}
