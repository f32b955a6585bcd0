//! In-memory recorder
//!
//! A [`LogSink`] that keeps entries in memory. Clones share the same
//! buffer, so a caller can keep one handle while the acquisition loop owns
//! the other.

use chrono::{DateTime, Utc};
use std::collections::VecDeque;
use std::io;
use std::sync::{Arc, Mutex, MutexGuard};

use super::{LogEntry, LogSink};
use crate::record::Record;

/// Maximum entries to keep in memory
const MAX_BUFFER_SIZE: usize = 100_000;

#[derive(Debug, Default)]
struct Inner {
    entries: VecDeque<LogEntry>,
    finished: bool,
}

/// Shared in-memory [`LogSink`]
#[derive(Debug, Clone, Default)]
pub struct MemoryLogSink {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryLogSink {
    /// Create an empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // Entries stay consistent even if a holder panicked mid-append
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Get the number of recorded entries
    pub fn entry_count(&self) -> usize {
        self.lock().entries.len()
    }

    /// Copy of all entries in append order
    pub fn entries(&self) -> Vec<LogEntry> {
        self.lock().entries.iter().cloned().collect()
    }

    /// Whether the sink was finished
    pub fn is_finished(&self) -> bool {
        self.lock().finished
    }
}

impl LogSink for MemoryLogSink {
    fn append(&mut self, timestamp: DateTime<Utc>, record: &Record) -> io::Result<()> {
        let mut inner = self.lock();
        if inner.finished {
            return Err(io::Error::new(io::ErrorKind::Other, "log sink already finished"));
        }
        if inner.entries.len() >= MAX_BUFFER_SIZE {
            inner.entries.pop_front();
        }
        inner.entries.push_back(LogEntry::new(timestamp, *record));
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        self.lock().finished = true;
        Ok(())
    }
}
