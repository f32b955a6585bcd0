//! Pipeline startup and handle
//!
//! [`start`] opens the configured source and log sink, then runs the
//! acquisition loop on its own thread. Open failures are returned before any
//! thread exists, with everything opened so far already released.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;

use super::{
    AcquisitionError, AcquisitionLoop, AcquisitionReport, AcquisitionStats, Counters,
    LatestValueCache, LoopState, PipelineError, StateCell, StopSignal,
};
use crate::config::{AcquisitionConfig, SourceMode};
use crate::datalog::CsvLogSink;
use crate::record::Record;
use crate::source::{DataSource, HardwareSource, SyntheticSource};

type LoopResult = Result<AcquisitionReport, AcquisitionError>;

/// Open the configured source and sink and start acquiring
pub fn start(config: &AcquisitionConfig) -> Result<PipelineHandle, PipelineError> {
    config.validate()?;

    let source: Box<dyn DataSource> = match config.mode {
        SourceMode::Hardware => Box::new(HardwareSource::open(
            config.port.as_deref(),
            config.baud_rate,
            config.read_timeout(),
        )?),
        SourceMode::Synthetic => {
            tracing::info!("Generating synthetic telemetry");
            Box::new(SyntheticSource::new(
                config.synthetic_interval(),
                config.synthetic_seed,
            ))
        }
    };

    let log_path = config.resolved_log_path();
    let mut acquisition = AcquisitionLoop::new(source);
    match &log_path {
        // On failure the loop is dropped here, closing the source
        Some(path) => {
            let sink = CsvLogSink::create(path).map_err(PipelineError::LogSink)?;
            acquisition = acquisition.with_sink(sink);
        }
        None => tracing::info!("CSV logging disabled"),
    }

    PipelineHandle::spawn(acquisition, log_path)
}

/// Running pipeline
///
/// Dropping the handle stops the loop and waits for it to release its
/// resources.
pub struct PipelineHandle {
    cache: LatestValueCache,
    stop: StopSignal,
    state: StateCell,
    counters: Arc<Counters>,
    log_path: Option<PathBuf>,
    thread: Option<JoinHandle<LoopResult>>,
}

impl PipelineHandle {
    /// Run `acquisition` on a dedicated thread
    pub fn spawn(acquisition: AcquisitionLoop, log_path: Option<PathBuf>) -> Result<Self, PipelineError> {
        let cache = acquisition.cache();
        let stop = acquisition.stop_signal();
        let state = acquisition.state();
        let counters = acquisition.stats_source();

        let thread = std::thread::Builder::new()
            .name("acquisition".to_string())
            .spawn(move || acquisition.run())
            .map_err(PipelineError::Spawn)?;

        Ok(Self {
            cache,
            stop,
            state,
            counters,
            log_path,
            thread: Some(thread),
        })
    }

    /// Cache the loop publishes to
    pub fn cache(&self) -> &LatestValueCache {
        &self.cache
    }

    /// Newest record, if any arrived yet
    pub fn latest(&self) -> Option<Record> {
        self.cache.get()
    }

    /// Signal that stops the loop; may be shared with signal handlers
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Ask the loop to stop. Returns immediately.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Current lifecycle state
    pub fn state(&self) -> LoopState {
        self.state.get()
    }

    /// Live counters
    pub fn stats(&self) -> AcquisitionStats {
        self.counters.snapshot()
    }

    /// CSV file being written, if logging is enabled
    pub fn log_path(&self) -> Option<&Path> {
        self.log_path.as_deref()
    }

    /// Whether the loop thread has exited (stop, end of stream or failure)
    pub fn is_finished(&self) -> bool {
        self.thread.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the loop to exit without requesting a stop
    pub fn join(mut self) -> LoopResult {
        self.join_thread()
    }

    /// Request a stop and wait for the loop to release its resources
    pub fn stop_and_join(self) -> LoopResult {
        self.stop();
        self.join()
    }

    fn join_thread(&mut self) -> LoopResult {
        let Some(thread) = self.thread.take() else {
            return Err(AcquisitionError::ThreadPanicked("already joined".to_string()));
        };
        thread.join().unwrap_or_else(|panic| {
            let msg = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            Err(AcquisitionError::ThreadPanicked(msg))
        })
    }
}

impl Drop for PipelineHandle {
    fn drop(&mut self) {
        if self.thread.is_some() {
            self.stop.stop();
            if let Err(e) = self.join_thread() {
                tracing::error!("Acquisition ended with error: {e}");
            }
        }
    }
}
