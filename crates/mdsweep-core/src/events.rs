//! Event stream contract between the reconciler and presentation layers.
//!
//! The reconciler emits an ordered trace of events through an `EventSink`
//! instead of writing to any shared output. A completed run always ends with
//! `Summary`; the caller owns rendering (CLI, GUI, test collector).

use std::time::Duration;

/// Severity for `CleanEvent::Log`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Outcome of one attempted file relocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    /// Moved into the backup directory.
    Moved,
    /// Source vanished between enumeration and move; informational, not an error.
    AlreadyGone,
    /// Move failed (permission, disk, ...); the batch continues.
    Failed(String),
}

/// One record in the reconciler's trace.
#[derive(Debug, Clone, PartialEq)]
pub enum CleanEvent {
    /// Coarse progress for progress bars: percent in 0..=100 plus a stage label.
    Progress { percent: u8, stage: String },
    /// Human-readable diagnostic line.
    Log { level: LogLevel, message: String },
    /// Per-file outcome for one cleanup candidate.
    File { name: String, outcome: FileOutcome },
    /// Final record of a completed run.
    Summary {
        moved: u64,
        unused: u64,
        elapsed: Duration,
    },
}

/// Receiver for the reconciler's event trace.
pub trait EventSink {
    fn emit(&mut self, event: CleanEvent);
}

/// Closures are sinks; the common case for CLI rendering.
impl<F: FnMut(CleanEvent)> EventSink for F {
    fn emit(&mut self, event: CleanEvent) {
        self(event)
    }
}

/// Collecting sink, used by tests and callers that want the full trace.
#[derive(Debug, Default)]
pub struct Trace(pub Vec<CleanEvent>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[CleanEvent] {
        &self.0
    }

    pub fn into_events(self) -> Vec<CleanEvent> {
        self.0
    }
}

impl EventSink for Trace {
    fn emit(&mut self, event: CleanEvent) {
        self.0.push(event)
    }
}
