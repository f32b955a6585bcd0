//! Wire protocol
//!
//! Framing and validation of the semicolon-separated text lines emitted by
//! the logger hardware, plus serial port discovery and access.

mod error;
mod frame;
pub mod serial;
pub mod stream;

pub use error::{OpenError, RejectionReason};
pub(crate) use frame::is_blank;
pub use frame::{parse_line, split_fields};
pub use serial::{list_ports, open_port, resolve_port, PortInfo};
pub use stream::{LineChannel, SerialChannel};

/// Default baud rate of the logger link
pub const DEFAULT_BAUD_RATE: u32 = 115200;

/// Default bounded read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 1000;

/// Longest line accepted before the buffered bytes are discarded
pub const MAX_LINE_LEN: usize = 4096;
