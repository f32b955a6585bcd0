//! # Telemlog Core Library
//!
//! Acquisition and buffering core for the telemlog engine telemetry logger.

#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

//!
//! This library provides:
//! - Framing and validation of the logger's semicolon-separated wire lines
//! - Hardware (serial) and synthetic data sources behind one trait
//! - An acquisition loop publishing to a latest-wins cache
//! - CSV logging of every accepted record
//! - Fixed-capacity per-channel history for plotting
//! - Fault word decoding
//!
//! ## Example
//!
//! ```rust,ignore
//! use telemlog_core::prelude::*;
//!
//! let config = AcquisitionConfig { mode: SourceMode::Synthetic, ..Default::default() };
//! let pipeline = acquisition::start(&config)?;
//!
//! let mut history = History::new(config.history_capacity);
//! if let Some(record) = pipeline.latest() {
//!     history.ingest(&record);
//! }
//!
//! let report = pipeline.stop_and_join()?;
//! println!("accepted {}", report.stats.accepted);
//! ```

pub mod acquisition;
pub mod config;
pub mod datalog;
pub mod faults;
pub mod history;
pub mod protocol;
pub mod record;
pub mod source;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::acquisition::{
        self, AcquisitionError, AcquisitionLoop, AcquisitionReport, AcquisitionStats,
        LatestValueCache, LoopState, PipelineError, PipelineHandle, StopCause, StopSignal,
    };
    pub use crate::config::{AcquisitionConfig, SourceMode};
    pub use crate::datalog::{CsvLogSink, LogEntry, LogSink, MemoryLogSink};
    pub use crate::faults::FaultTable;
    pub use crate::history::{History, RingBuffer};
    pub use crate::protocol::{parse_line, OpenError, RejectionReason};
    pub use crate::record::{Channel, Record, SCHEMA_LEN};
    pub use crate::source::{DataSource, HardwareSource, SourceError, SourceEvent, SyntheticSource};
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
