//! Data sources
//!
//! Where raw telemetry comes from: a hardware link delivering wire lines, or
//! a synthetic generator delivering ready-built records. The acquisition loop
//! only sees the [`DataSource`] trait and never branches on the variant.

mod hardware;
mod synthetic;

pub use hardware::HardwareSource;
pub use synthetic::SyntheticSource;

use std::io;
use thiserror::Error;

use crate::record::Record;

/// One unit of data produced by a source
#[derive(Debug, Clone, PartialEq)]
pub enum SourceEvent {
    /// Raw wire line, terminator included, still to be parsed
    Line(Vec<u8>),
    /// Record built directly by the source
    Record(Record),
}

/// Errors reported by a source read
#[derive(Error, Debug)]
pub enum SourceError {
    /// No complete unit arrived within the read timeout; retry
    #[error("Read timed out")]
    Timeout,

    /// Bytes arrived but no complete unit yet; retry
    #[error("Incomplete line")]
    Incomplete,

    /// The source was closed or reached end of stream
    #[error("Source closed")]
    Closed,

    /// The link failed at the platform level
    #[error("Transport failure: {0}")]
    TransportFailure(#[from] io::Error),
}

/// Capability shared by every source variant
pub trait DataSource: Send {
    /// Block for at most one read timeout and return the next unit
    fn next_event(&mut self) -> Result<SourceEvent, SourceError>;

    /// Release the underlying resource. Calling it again is a no-op.
    fn close(&mut self);

    /// Whether [`DataSource::close`] already ran
    fn is_closed(&self) -> bool;

    /// Short description for log output
    fn describe(&self) -> String;
}

impl<S: DataSource + ?Sized> DataSource for Box<S> {
    fn next_event(&mut self) -> Result<SourceEvent, SourceError> {
        (**self).next_event()
    }

    fn close(&mut self) {
        (**self).close()
    }

    fn is_closed(&self) -> bool {
        (**self).is_closed()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
