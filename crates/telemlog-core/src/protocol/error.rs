//! Protocol errors

use thiserror::Error;

/// Why a wire line was not turned into a record
///
/// Rejections are never fatal: the acquisition loop logs them and keeps reading.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    /// The line does not hold exactly one value per channel
    #[error("wrong field count: expected {expected}, got {actual}")]
    WrongFieldCount {
        /// Channels in the schema
        expected: usize,
        /// Non-empty tokens found
        actual: usize,
    },

    /// A token does not parse as an integer
    #[error("field {index} is not an integer: '{token}'")]
    NonIntegerField {
        /// Zero-based position of the token
        index: usize,
        /// The offending token
        token: String,
    },
}

/// Errors that prevent a hardware link from being opened
#[derive(Error, Debug)]
pub enum OpenError {
    /// No port given and none detected
    #[error("No serial ports found; specify a port explicitly")]
    NoPortsFound,

    /// No port given and more than one detected
    #[error("Multiple serial ports found ({}); specify a port explicitly", candidates.join(", "))]
    AmbiguousPorts {
        /// Detected port names
        candidates: Vec<String>,
    },

    /// The port exists but could not be opened
    #[error("Failed to open serial port {port}: {reason}")]
    PortOpen {
        /// Port name
        port: String,
        /// Error reported by the OS
        reason: String,
    },
}
