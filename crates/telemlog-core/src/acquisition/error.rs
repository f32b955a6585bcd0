//! Acquisition errors

use std::io;
use thiserror::Error;

use crate::config::ConfigError;
use crate::protocol::OpenError;

/// Failures that end a running acquisition loop
///
/// Resources are already released when one of these is returned.
#[derive(Error, Debug)]
pub enum AcquisitionError {
    /// The link failed while reading
    #[error("Transport failure: {0}")]
    TransportFailure(#[source] io::Error),

    /// The log sink could not append or flush
    #[error("Log sink error: {0}")]
    LogSink(#[source] io::Error),

    /// The loop thread panicked, or was already joined
    #[error("Acquisition thread panicked: {0}")]
    ThreadPanicked(String),
}

/// Failures that keep a pipeline from starting
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration rejected by validation
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The hardware link could not be opened
    #[error(transparent)]
    Open(#[from] OpenError),

    /// The CSV log file could not be created
    #[error("Failed to create log file: {0}")]
    LogSink(#[source] io::Error),

    /// The OS refused to start the loop thread
    #[error("Failed to spawn acquisition thread: {0}")]
    Spawn(#[source] io::Error),
}
