//! Acquisition loop
//!
//! Drives one source until a stop request, end of stream, or a fatal error.
//! Malformed lines and read timeouts are handled here and never surface to
//! the caller; transport and sink failures end the run.

use chrono::Utc;
use std::sync::Arc;

use super::{
    AcquisitionError, AcquisitionReport, Counters, LatestValueCache, LoopState, StateCell,
    StopCause, StopSignal,
};
use crate::datalog::LogSink;
use crate::protocol::{is_blank, parse_line};
use crate::record::Record;
use crate::source::{DataSource, SourceError, SourceEvent};

/// Single-use acquisition loop
///
/// [`AcquisitionLoop::run`] consumes the loop, so a stopped loop can never be
/// restarted. Source and sink are released on every exit path.
pub struct AcquisitionLoop {
    source: Box<dyn DataSource>,
    sink: Option<Box<dyn LogSink>>,
    cache: LatestValueCache,
    stop: StopSignal,
    state: StateCell,
    counters: Arc<Counters>,
}

impl AcquisitionLoop {
    /// Create an idle loop around `source`
    pub fn new<S: DataSource + 'static>(source: S) -> Self {
        Self {
            source: Box::new(source),
            sink: None,
            cache: LatestValueCache::new(),
            stop: StopSignal::new(),
            state: StateCell::new(),
            counters: Arc::new(Counters::default()),
        }
    }

    /// Log every accepted record to `sink`
    pub fn with_sink<L: LogSink + 'static>(mut self, sink: L) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Publish into an existing cache instead of a fresh one
    pub fn with_cache(mut self, cache: LatestValueCache) -> Self {
        self.cache = cache;
        self
    }

    /// Observe an existing stop signal
    pub fn with_stop_signal(mut self, stop: StopSignal) -> Self {
        self.stop = stop;
        self
    }

    /// Cache this loop publishes to
    pub fn cache(&self) -> LatestValueCache {
        self.cache.clone()
    }

    /// Signal that stops this loop
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Shared view of the lifecycle state
    pub fn state(&self) -> StateCell {
        self.state.clone()
    }

    pub(super) fn stats_source(&self) -> Arc<Counters> {
        self.counters.clone()
    }

    /// Run to completion on the current thread
    pub fn run(mut self) -> Result<AcquisitionReport, AcquisitionError> {
        self.state.set(LoopState::Running);
        tracing::info!("Acquisition started from {}", self.source.describe());

        let outcome = self.drive();

        self.state.set(LoopState::Stopping);
        self.source.close();
        let finished = match self.sink.as_mut() {
            Some(sink) => sink.finish(),
            None => Ok(()),
        };
        let stats = self.counters.snapshot();
        self.state.set(LoopState::Stopped);

        tracing::info!(
            "Acquisition stopped: {} accepted, {} rejected, {} logged",
            stats.accepted,
            stats.rejected(),
            stats.logged
        );

        match (outcome, finished) {
            (Ok(cause), Ok(())) => Ok(AcquisitionReport { cause, stats }),
            (Ok(_), Err(e)) => {
                tracing::error!("Failed to close log sink: {e}");
                Err(AcquisitionError::LogSink(e))
            }
            (Err(e), finished) => {
                if let Err(close_err) = finished {
                    tracing::error!("Failed to close log sink: {close_err}");
                }
                Err(e)
            }
        }
    }

    fn drive(&mut self) -> Result<StopCause, AcquisitionError> {
        loop {
            if self.stop.is_stopped() {
                return Ok(StopCause::Requested);
            }

            match self.source.next_event() {
                Ok(SourceEvent::Record(record)) => self.accept(record)?,
                Ok(SourceEvent::Line(line)) => {
                    if is_blank(&line) {
                        Counters::bump(&self.counters.blank_lines);
                        continue;
                    }
                    match parse_line(&line) {
                        Ok(record) => self.accept(record)?,
                        Err(reason) => {
                            self.counters.reject(&reason);
                            tracing::warn!(
                                "Skipping line ({reason}): {}",
                                String::from_utf8_lossy(&line).trim_end()
                            );
                        }
                    }
                }
                Err(SourceError::Timeout) => {
                    Counters::bump(&self.counters.timeouts);
                    tracing::trace!("Read timed out");
                }
                Err(SourceError::Incomplete) => {
                    Counters::bump(&self.counters.partial_reads);
                }
                Err(SourceError::Closed) => {
                    tracing::info!("Source {} closed", self.source.describe());
                    return Ok(StopCause::SourceClosed);
                }
                Err(SourceError::TransportFailure(e)) => {
                    tracing::error!("Transport failure on {}: {e}", self.source.describe());
                    return Err(AcquisitionError::TransportFailure(e));
                }
            }
        }
    }

    fn accept(&mut self, record: Record) -> Result<(), AcquisitionError> {
        self.cache.put(record);
        Counters::bump(&self.counters.accepted);

        if let Some(sink) = self.sink.as_mut() {
            // Stamped at append time, not at read time
            sink.append(Utc::now(), &record).map_err(|e| {
                tracing::error!("Failed to append to log sink: {e}");
                AcquisitionError::LogSink(e)
            })?;
            Counters::bump(&self.counters.logged);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datalog::MemoryLogSink;
    use crate::source::SyntheticSource;
    use std::io;

    /// Yields a fixed list of events, then reports closed
    struct ListSource {
        events: std::vec::IntoIter<Result<SourceEvent, SourceError>>,
        closes: usize,
    }

    impl ListSource {
        fn new(events: Vec<Result<SourceEvent, SourceError>>) -> Self {
            Self {
                events: events.into_iter(),
                closes: 0,
            }
        }
    }

    impl DataSource for ListSource {
        fn next_event(&mut self) -> Result<SourceEvent, SourceError> {
            self.events.next().unwrap_or(Err(SourceError::Closed))
        }

        fn close(&mut self) {
            self.closes += 1;
        }

        fn is_closed(&self) -> bool {
            self.closes > 0
        }

        fn describe(&self) -> String {
            "list".to_string()
        }
    }

    fn line(text: &str) -> Result<SourceEvent, SourceError> {
        Ok(SourceEvent::Line(text.as_bytes().to_vec()))
    }

    #[test]
    fn test_lines_are_parsed_and_published() {
        let source = ListSource::new(vec![
            line("1;800;0;1;50;70;350;340;20;200;3000;1000;100;95;13800;5020;0\n"),
            Err(SourceError::Timeout),
            Err(SourceError::Incomplete),
            line("garbage\n"),
            line("\r\n"),
            line("2;850;1;1;55;70;360;350;20;205;3050;1010;101;96;13790;5015;0\n"),
        ]);
        let acq = AcquisitionLoop::new(source);
        let cache = acq.cache();
        let state = acq.state();

        let report = acq.run().unwrap();
        assert_eq!(report.cause, StopCause::SourceClosed);
        assert_eq!(report.stats.accepted, 2);
        assert_eq!(report.stats.wrong_field_count, 1);
        assert_eq!(report.stats.blank_lines, 1);
        assert_eq!(report.stats.timeouts, 1);
        assert_eq!(report.stats.partial_reads, 1);
        assert_eq!(cache.get().map(|r| r.log_index), Some(2));
        assert_eq!(state.get(), LoopState::Stopped);
    }

    #[test]
    fn test_records_bypass_parser() {
        let mut sim = SyntheticSource::default().unpaced();
        let events = (0..3).map(|_| Ok(SourceEvent::Record(sim.next_record()))).collect();
        let recorder = MemoryLogSink::new();
        let acq = AcquisitionLoop::new(ListSource::new(events)).with_sink(recorder.clone());
        let cache = acq.cache();

        let report = acq.run().unwrap();
        assert_eq!(report.stats.accepted, 3);
        assert_eq!(report.stats.logged, 3);
        assert_eq!(cache.get().map(|r| r.log_index), Some(3));
        assert_eq!(recorder.entry_count(), 3);
        assert!(recorder.is_finished());
    }

    #[test]
    fn test_transport_failure_ends_run_and_finishes_sink() {
        let source = ListSource::new(vec![
            line("1;800;0;1;50;70;350;340;20;200;3000;1000;100;95;13800;5020;0\n"),
            Err(SourceError::TransportFailure(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "unplugged",
            ))),
            line("2;850;1;1;55;70;360;350;20;205;3050;1010;101;96;13790;5015;0\n"),
        ]);
        let recorder = MemoryLogSink::new();
        let acq = AcquisitionLoop::new(source).with_sink(recorder.clone());
        let cache = acq.cache();
        let state = acq.state();

        let err = acq.run().unwrap_err();
        assert!(matches!(err, AcquisitionError::TransportFailure(_)));
        assert_eq!(state.get(), LoopState::Stopped);
        assert_eq!(cache.get().map(|r| r.log_index), Some(1));
        assert_eq!(recorder.entry_count(), 1);
        assert!(recorder.is_finished());
    }

    #[test]
    fn test_stop_before_run_reads_nothing() {
        let acq = AcquisitionLoop::new(SyntheticSource::default().unpaced());
        let cache = acq.cache();
        acq.stop_signal().stop();

        let report = acq.run().unwrap();
        assert_eq!(report.cause, StopCause::Requested);
        assert_eq!(report.stats.accepted, 0);
        assert_eq!(cache.get(), None);
    }

    #[test]
    fn test_sink_failure_is_fatal() {
        let recorder = MemoryLogSink::new();
        let mut closed = recorder.clone();
        closed.finish().unwrap();

        let acq = AcquisitionLoop::new(SyntheticSource::default().unpaced()).with_sink(recorder);
        let cache = acq.cache();
        let err = acq.run().unwrap_err();
        assert!(matches!(err, AcquisitionError::LogSink(_)));
        // The record reached the cache before the append failed
        assert_eq!(cache.get().map(|r| r.log_index), Some(1));
    }
}
