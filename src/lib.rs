//! # csvscrub - CSV Structure Inference and Repair
//!
//! csvscrub takes a delimiter-separated file of unknown provenance and
//! splits it into a clean file and a bad file. It infers the character
//! encoding and the delimiter from samples of the raw input, determines
//! the expected column count statistically, and then classifies every
//! physical line exactly once, repairing rows that were broken across two
//! lines by a stray line break.
//!
//! ## Quick Start
//!
//! ```no_run
//! use csvscrub::engine::{run_to_sinks, NullObserver, OutputSinks, RunOptions};
//! use csvscrub::engine::sinks::DEFAULT_EXPORT_DELIMITER;
//! use std::fs::File;
//! use std::io::BufWriter;
//!
//! # fn example() -> csvscrub::error::Result<()> {
//! let input = File::open("data/customers.csv")?;
//! let mut sinks = OutputSinks::new(
//!     BufWriter::new(File::create("export/customers_clean.csv")?),
//!     BufWriter::new(File::create("bad/customers_bad.csv")?),
//!     BufWriter::new(File::create("bad/customers_bad_raw.txt")?),
//!     DEFAULT_EXPORT_DELIMITER,
//! );
//! let summary = run_to_sinks(
//!     input,
//!     RunOptions::default(),
//!     &mut sinks,
//!     &mut NullObserver,
//! )?;
//! println!("{}", summary.summary_line());
//! # Ok(())
//! # }
//! ```
//!
//! ## Core Modules
//!
//! - [`engine`]: the inference-and-repair pipeline
//!   - [`engine::stats`]: per-delimiter column statistics
//!   - [`engine::validate`]: the streaming single-lookahead validator
//! - [`config`]: directory layout and persisted settings
//! - [`error`]: error types and handling utilities
//! - [`logging`]: tracing setup with rotating log files
//!
//! ## Guarantees
//!
//! Every physical data line of the input lands in exactly one output:
//! the clean file, or the bad file (with its verbatim text in the bad-raw
//! companion). The header line goes to the clean file. Identical inputs
//! with identical options produce byte-identical outputs.

#![warn(clippy::all, rust_2018_idioms)]

pub mod config;
pub mod engine;
pub mod error;
pub mod logging;

pub use engine::run::run_to_sinks;
