//! Byte streams lines are read from

use serialport::SerialPort;
use std::io::{self, Read};
use std::time::Duration;

/// Byte stream a hardware source reads lines from
///
/// Reads must honour the configured timeout and report it as
/// `io::ErrorKind::TimedOut` (or `WouldBlock`) rather than blocking forever.
pub trait LineChannel: Read + Send {
    /// Set timeout for read operations
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()>;

    /// Human readable name of the underlying link
    fn describe(&self) -> String;
}

/// Serial port wrapper implementing LineChannel
pub struct SerialChannel {
    port: Box<dyn SerialPort>,
}

impl SerialChannel {
    /// Wrap an opened port
    pub fn new(port: Box<dyn SerialPort>) -> Self {
        Self { port }
    }
}

impl Read for SerialChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.port.read(buf)
    }
}

impl LineChannel for SerialChannel {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.port
            .set_timeout(timeout)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))
    }

    fn describe(&self) -> String {
        format!(
            "{} @ {} baud",
            self.port.name().unwrap_or_else(|| "<unnamed>".to_string()),
            self.port.baud_rate().unwrap_or_default()
        )
    }
}
