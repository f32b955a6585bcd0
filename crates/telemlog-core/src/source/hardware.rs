//! Hardware source
//!
//! Reads LF-terminated lines from a byte link (normally a serial port).
//! Bytes that arrive before a timeout are kept and completed by later reads,
//! so a line split across reads is never lost or reported as malformed.

use std::io::{self, Read};
use std::time::Duration;

use super::{DataSource, SourceError, SourceEvent};
use crate::protocol::{list_ports, open_port, resolve_port, LineChannel, OpenError, SerialChannel, MAX_LINE_LEN};

const READ_CHUNK: usize = 1024;

/// Line reader over a [`LineChannel`]
pub struct HardwareSource<C: LineChannel = SerialChannel> {
    channel: Option<C>,
    name: String,
    pending: Vec<u8>,
    chunk: Box<[u8]>,
}

impl HardwareSource<SerialChannel> {
    /// Open a serial port
    ///
    /// Without an explicit `port`, the only available port is used; zero or
    /// several candidates fail with [`OpenError`].
    pub fn open(port: Option<&str>, baud_rate: u32, timeout: Duration) -> Result<Self, OpenError> {
        let candidates = if port.is_none() { list_ports() } else { Vec::new() };
        let name = resolve_port(port, &candidates)?;
        let serial = open_port(&name, baud_rate, timeout)?;
        tracing::info!("Reading from {} @ {} baud", name, baud_rate);
        Ok(Self::from_channel(SerialChannel::new(serial)))
    }
}

impl<C: LineChannel> HardwareSource<C> {
    /// Wrap an already opened channel
    pub fn from_channel(channel: C) -> Self {
        let name = channel.describe();
        Self {
            channel: Some(channel),
            name,
            pending: Vec::with_capacity(READ_CHUNK),
            chunk: vec![0u8; READ_CHUNK].into_boxed_slice(),
        }
    }

    /// Change the bounded timeout applied to each read
    pub fn set_read_timeout(&mut self, timeout: Duration) -> Result<(), SourceError> {
        let channel = self.channel.as_mut().ok_or(SourceError::Closed)?;
        channel.set_timeout(timeout)?;
        Ok(())
    }

    /// Next complete line, terminator included
    ///
    /// Performs at most one read. When the read brings bytes but no line
    /// terminator, returns [`SourceError::Incomplete`] and keeps the bytes for
    /// the next call, so a link that never sends a newline still hands
    /// control back once per read.
    pub fn next_line(&mut self) -> Result<Vec<u8>, SourceError> {
        if let Some(line) = self.take_line() {
            return Ok(line);
        }
        let channel = self.channel.as_mut().ok_or(SourceError::Closed)?;

        match channel.read(&mut self.chunk) {
            Ok(0) => {
                // End of stream: hand out what is left, then report closed
                if self.pending.is_empty() {
                    return Err(SourceError::Closed);
                }
                Ok(std::mem::take(&mut self.pending))
            }
            Ok(n) => {
                self.pending.extend_from_slice(&self.chunk[..n]);
                if let Some(line) = self.take_line() {
                    return Ok(line);
                }
                if self.pending.len() > MAX_LINE_LEN {
                    tracing::warn!(
                        "Discarding {} buffered bytes without a line terminator",
                        self.pending.len()
                    );
                    self.pending.clear();
                }
                Err(SourceError::Incomplete)
            }
            Err(e)
                if matches!(
                    e.kind(),
                    io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted
                ) =>
            {
                Err(SourceError::Timeout)
            }
            Err(e) => Err(SourceError::TransportFailure(e)),
        }
    }

    fn take_line(&mut self) -> Option<Vec<u8>> {
        let pos = self.pending.iter().position(|&b| b == b'\n')?;
        Some(self.pending.drain(..=pos).collect())
    }
}

impl<C: LineChannel> DataSource for HardwareSource<C> {
    fn next_event(&mut self) -> Result<SourceEvent, SourceError> {
        self.next_line().map(SourceEvent::Line)
    }

    fn close(&mut self) {
        if self.channel.take().is_some() {
            self.pending.clear();
            tracing::info!("Closed {}", self.name);
        }
    }

    fn is_closed(&self) -> bool {
        self.channel.is_none()
    }

    fn describe(&self) -> String {
        self.name.clone()
    }
}

impl<C: LineChannel> Drop for HardwareSource<C> {
    fn drop(&mut self) {
        self.close();
    }
}
