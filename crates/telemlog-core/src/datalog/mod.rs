//! Data Logging
//!
//! Append-only sinks for accepted records. The acquisition loop stamps each
//! record with the wall-clock time of the append and hands it to a
//! [`LogSink`]; the sink is finished exactly once when the loop exits.

mod format;
mod recorder;

pub use format::{default_log_path, format_timestamp, CsvLogSink, TIMESTAMP_COLUMN};
pub use recorder::MemoryLogSink;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io;

use crate::record::Record;

/// A single log entry: append time plus the record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock time at which the record was appended
    pub timestamp: DateTime<Utc>,
    /// Logged record
    pub record: Record,
}

impl LogEntry {
    /// Create a new log entry
    pub fn new(timestamp: DateTime<Utc>, record: Record) -> Self {
        Self { timestamp, record }
    }
}

/// Durable, append-only destination for records
pub trait LogSink: Send {
    /// Append one record
    fn append(&mut self, timestamp: DateTime<Utc>, record: &Record) -> io::Result<()>;

    /// Flush and close. Later calls are no-ops.
    fn finish(&mut self) -> io::Result<()>;
}

impl<S: LogSink + ?Sized> LogSink for Box<S> {
    fn append(&mut self, timestamp: DateTime<Utc>, record: &Record) -> io::Result<()> {
        (**self).append(timestamp, record)
    }

    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}
