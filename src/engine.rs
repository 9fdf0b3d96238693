//! The inference-and-repair engine.
//!
//! This is the algorithmic core of csvscrub: encoding and delimiter
//! detection, modal-column-count statistics, and the single-lookahead
//! splice validator that classifies every physical line of the input
//! exactly once.
//!
//! Data flow through the engine:
//!
//! ```text
//! raw bytes ─> encoding detection ─> decoded text source
//!                  │
//!                  ├─> delimiter sniff (preview only)
//!                  └─> column statistics ─> expected-columns policy
//!                                               │
//!              decoded text source (rewound) ───┘
//!                  │
//!                  └─> streaming validator ─> clean / bad / bad-raw sinks
//! ```
//!
//! One engine instance owns its input and sinks for exactly one file; run
//! independent instances for independent files.

pub mod encoding;
pub mod observer;
pub mod preview;
pub mod resolve;
pub mod run;
pub mod sinks;
pub mod sniff;
pub mod source;
pub mod stats;
pub mod validate;

pub use observer::{NullObserver, RunObserver};
pub use resolve::ExpectedColumnsPolicy;
pub use run::{run_to_sinks, Engine, RunOptions, RunSummary};
pub use sinks::OutputSinks;
pub use stats::DelimiterStats;
pub use validate::RunCounters;
