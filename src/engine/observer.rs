//! Injected observer for run events.
//!
//! The engine has no global logger: progress ticks and warnings are pushed
//! through a caller-supplied observer, so a batch front end can forward
//! them to `tracing` while tests capture them in memory.

/// Receives purely observational events during a run. No method has any
/// effect on classification.
pub trait RunObserver {
    /// Progress tick, fired each time `(valid + bad)` crosses the
    /// configured cadence.
    fn on_progress(&mut self, _valid: u64, _bad: u64, _total: u64) {}

    /// A non-fatal condition worth surfacing (e.g. the 90%-rule falling
    /// back to the header column count).
    fn on_warning(&mut self, _message: &str) {}
}

/// Observer that discards every event.
pub struct NullObserver;

impl RunObserver for NullObserver {}

#[cfg(test)]
pub(crate) struct RecordingObserver {
    pub progress: Vec<(u64, u64, u64)>,
    pub warnings: Vec<String>,
}

#[cfg(test)]
impl RecordingObserver {
    pub(crate) fn new() -> Self {
        Self {
            progress: Vec::new(),
            warnings: Vec::new(),
        }
    }
}

#[cfg(test)]
impl RunObserver for RecordingObserver {
    fn on_progress(&mut self, valid: u64, bad: u64, total: u64) {
        self.progress.push((valid, bad, total));
    }

    fn on_warning(&mut self, message: &str) {
        self.warnings.push(message.to_owned());
    }
}
