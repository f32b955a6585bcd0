//! Acquisition pipeline
//!
//! The acquisition loop owns one [`DataSource`](crate::source::DataSource),
//! turns what it yields into records, and publishes them to the
//! [`LatestValueCache`] and, when enabled, a [`LogSink`](crate::datalog::LogSink).
//! A consumer on another thread only ever touches the cache.
//!
//! Lifecycle: `Idle -> Running -> Stopping -> Stopped`. `Stopped` is terminal.

mod cache;
mod error;
mod pipeline;
mod worker;

pub use cache::LatestValueCache;
pub use error::{AcquisitionError, PipelineError};
pub use pipeline::{start, PipelineHandle};
pub use worker::AcquisitionLoop;

use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

use crate::protocol::RejectionReason;

/// Cooperative stop request shared with the acquisition loop
///
/// Setting it more than once is harmless. The loop checks it before every
/// read, so it stops within one read timeout.
#[derive(Debug, Clone, Default)]
pub struct StopSignal(Arc<AtomicBool>);

impl StopSignal {
    /// Fresh signal, not yet stopped
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop
    pub fn stop(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Whether a stop was requested
    pub fn is_stopped(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Acquisition loop lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum LoopState {
    /// Created, not yet running
    Idle = 0,
    /// Reading from the source
    Running = 1,
    /// Releasing the source and sink
    Stopping = 2,
    /// Finished; resources released
    Stopped = 3,
}

impl LoopState {
    fn from_u8(v: u8) -> Self {
        match v {
            0 => LoopState::Idle,
            1 => LoopState::Running,
            2 => LoopState::Stopping,
            _ => LoopState::Stopped,
        }
    }
}

/// Shared view of a loop's [`LoopState`]
#[derive(Debug, Clone)]
pub struct StateCell(Arc<AtomicU8>);

impl StateCell {
    fn new() -> Self {
        Self(Arc::new(AtomicU8::new(LoopState::Idle as u8)))
    }

    fn set(&self, state: LoopState) {
        self.0.store(state as u8, Ordering::SeqCst);
    }

    /// Current state
    pub fn get(&self) -> LoopState {
        LoopState::from_u8(self.0.load(Ordering::SeqCst))
    }
}

/// Why a loop stopped without an error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StopCause {
    /// The stop signal was set
    Requested,
    /// The source reached end of stream
    SourceClosed,
}

/// Counters of one acquisition run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AcquisitionStats {
    /// Records published to the cache
    pub accepted: u64,
    /// Lines rejected for their field count
    pub wrong_field_count: u64,
    /// Lines rejected for a non-integer field
    pub non_integer_field: u64,
    /// Empty lines skipped without a warning
    pub blank_lines: u64,
    /// Reads that timed out without a complete unit
    pub timeouts: u64,
    /// Reads that brought bytes but no complete line
    pub partial_reads: u64,
    /// Records appended to the log sink
    pub logged: u64,
}

impl AcquisitionStats {
    /// Total rejected lines
    pub fn rejected(&self) -> u64 {
        self.wrong_field_count + self.non_integer_field
    }
}

/// Live counters, updated by the loop and readable from any thread
#[derive(Debug, Default)]
struct Counters {
    accepted: AtomicU64,
    wrong_field_count: AtomicU64,
    non_integer_field: AtomicU64,
    blank_lines: AtomicU64,
    timeouts: AtomicU64,
    partial_reads: AtomicU64,
    logged: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn reject(&self, reason: &RejectionReason) {
        match reason {
            RejectionReason::WrongFieldCount { .. } => Self::bump(&self.wrong_field_count),
            RejectionReason::NonIntegerField { .. } => Self::bump(&self.non_integer_field),
        }
    }

    fn snapshot(&self) -> AcquisitionStats {
        AcquisitionStats {
            accepted: self.accepted.load(Ordering::Relaxed),
            wrong_field_count: self.wrong_field_count.load(Ordering::Relaxed),
            non_integer_field: self.non_integer_field.load(Ordering::Relaxed),
            blank_lines: self.blank_lines.load(Ordering::Relaxed),
            timeouts: self.timeouts.load(Ordering::Relaxed),
            partial_reads: self.partial_reads.load(Ordering::Relaxed),
            logged: self.logged.load(Ordering::Relaxed),
        }
    }
}

/// Outcome of a run that ended without error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AcquisitionReport {
    /// Why the loop stopped
    pub cause: StopCause,
    /// Counters at the moment the loop stopped
    pub stats: AcquisitionStats,
}
