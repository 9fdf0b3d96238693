//! Centralized error handling for csvscrub.
//!
//! Only four kinds of failure abort a run: an empty input (nothing to
//! analyze), a strict-policy structure mismatch, an I/O failure on a
//! required file, and a configuration error. Everything row-scoped is
//! recovered into the bad sink by the validator and never surfaces here.
//!
//! The `From` impls let `?` convert underlying errors automatically:
//!
//! ```no_run
//! use csvscrub::error::Result;
//! use std::fs;
//!
//! fn read_header(path: &str) -> Result<String> {
//!     // std::io::Error converts via the From impl
//!     let content = fs::read_to_string(path)?;
//!     Ok(content)
//! }
//! ```
//!
//! The `ResultExt` trait adds `.context()` to any result for attaching a
//! human-readable prefix to the underlying error.

use std::fmt;

/// Main error type for csvscrub operations.
#[derive(Debug)]
pub enum ScrubError {
    /// I/O errors on the input stream or output sinks
    Io(std::io::Error),

    /// No lines available to analyze, or no header line
    EmptyInput,

    /// Strict policy: header column count disagrees with the modal count
    StructureMismatch {
        header_cols: usize,
        modal_cols: usize,
        sampled_rows: usize,
    },

    /// Configuration errors (unknown encoding label, bad paths, etc.)
    Config(String),

    /// Generic error with context
    Other(String),
}

impl fmt::Display for ScrubError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::EmptyInput => write!(f, "empty input: no lines available to analyze"),
            Self::StructureMismatch {
                header_cols,
                modal_cols,
                sampled_rows,
            } => write!(
                f,
                "structure mismatch: header has {header_cols} columns but {modal_cols} \
                 were determined statistically over the first {sampled_rows} rows"
            ),
            Self::Config(msg) => write!(f, "configuration error: {msg}"),
            Self::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for ScrubError {}

impl From<std::io::Error> for ScrubError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for ScrubError {
    fn from(err: csv::Error) -> Self {
        // Writer-side csv errors are I/O failures on a sink; parse-side
        // errors are handled row-locally and never reach this conversion.
        match err.into_kind() {
            csv::ErrorKind::Io(e) => Self::Io(e),
            other => Self::Other(format!("CSV error: {other:?}")),
        }
    }
}

impl From<serde_json::Error> for ScrubError {
    fn from(err: serde_json::Error) -> Self {
        Self::Config(format!("JSON error: {err}"))
    }
}

/// Result type alias for csvscrub operations.
pub type Result<T> = std::result::Result<T, ScrubError>;

/// Extension trait to add context to results.
pub trait ResultExt<T> {
    /// Add context to an error.
    fn context(self, msg: impl Into<String>) -> Result<T>;

    /// Add context using a closure (lazy evaluation).
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: Into<ScrubError>,
{
    fn context(self, msg: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let err: ScrubError = e.into();
            ScrubError::Other(format!("{}: {}", msg.into(), err))
        })
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| {
            let err: ScrubError = e.into();
            ScrubError::Other(format!("{}: {}", f(), err))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ScrubError::StructureMismatch {
            header_cols: 5,
            modal_cols: 7,
            sampled_rows: 100,
        };
        let msg = err.to_string();
        assert!(msg.contains("header has 5 columns"));
        assert!(msg.contains('7'));
    }

    #[test]
    fn test_empty_input_display() {
        assert_eq!(
            ScrubError::EmptyInput.to_string(),
            "empty input: no lines available to analyze"
        );
    }

    #[test]
    fn test_result_context() {
        let result: std::result::Result<(), std::io::Error> = Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "file.txt",
        ));

        let result: Result<()> = result.context("Failed to read input");
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read input")
        );
    }
}
