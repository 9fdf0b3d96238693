//! Turning column statistics into the single expected column count.
//!
//! Two policies exist because the two front ends genuinely disagree: the
//! batch path tolerates a header that disagrees with the statistics as
//! long as the modal share is high enough, while the interactive preview
//! path refuses to process such a file at all. They are deliberately kept
//! as separate, selectable policies rather than silently unified.

use crate::engine::observer::RunObserver;
use crate::engine::stats::DelimiterStats;
use crate::error::{Result, ScrubError};

/// Modal share above which the modal column count overrides the header.
pub const MODAL_SHARE_TOLERANCE: f64 = 0.9;

/// How to decide the expected column count for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpectedColumnsPolicy {
    /// Fail the whole run when the header column count disagrees with the
    /// modal column count, regardless of modal share.
    StrictEquality,
    /// 90% rule: trust the modal count when at least 90% of sampled data
    /// rows agree with it; otherwise fall back to the header count and
    /// warn.
    #[default]
    NinetyPercentTolerance,
}

/// Resolves the expected column count. Fixed for the remainder of a run
/// once resolved; never recomputed mid-stream.
pub fn resolve_expected_columns(
    policy: ExpectedColumnsPolicy,
    stats: &DelimiterStats,
    observer: &mut dyn RunObserver,
) -> Result<usize> {
    match policy {
        ExpectedColumnsPolicy::StrictEquality => {
            if stats.header_cols != stats.modal_cols {
                return Err(ScrubError::StructureMismatch {
                    header_cols: stats.header_cols,
                    modal_cols: stats.modal_cols,
                    sampled_rows: stats.total_rows,
                });
            }
            Ok(stats.header_cols)
        }
        ExpectedColumnsPolicy::NinetyPercentTolerance => {
            if stats.modal_share >= MODAL_SHARE_TOLERANCE {
                Ok(stats.modal_cols)
            } else {
                if stats.header_cols != stats.modal_cols {
                    observer.on_warning(&format!(
                        "header has {} columns but the modal count is {} (share {:.1}%); \
                         continuing with expected_columns={}",
                        stats.header_cols,
                        stats.modal_cols,
                        stats.modal_share * 100.0,
                        stats.header_cols,
                    ));
                }
                Ok(stats.header_cols)
            }
        }
    }
}
