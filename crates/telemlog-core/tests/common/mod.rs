//! Shared test helpers

#![allow(dead_code)]

use std::collections::VecDeque;
use std::io::{self, Read};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use telemlog_core::protocol::LineChannel;
use tracing_subscriber::EnvFilter;

/// In-memory link: hands out scripted chunks, then behaves like an idle
/// serial port that times out after `timeout`
pub struct FakeChannel {
    chunks: VecDeque<Vec<u8>>,
    timeout: Duration,
    fail_after_script: bool,
    drops: Arc<AtomicUsize>,
}

impl FakeChannel {
    pub fn new(chunks: Vec<&[u8]>, timeout: Duration) -> Self {
        Self {
            chunks: chunks.into_iter().map(<[u8]>::to_vec).collect(),
            timeout,
            fail_after_script: false,
            drops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Report a transport error once the script is exhausted
    pub fn failing(mut self) -> Self {
        self.fail_after_script = true;
        self
    }

    /// Counter incremented when the channel is released
    pub fn drop_counter(&self) -> Arc<AtomicUsize> {
        self.drops.clone()
    }
}

impl Read for FakeChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self.chunks.pop_front() {
            Some(chunk) => {
                let n = chunk.len().min(buf.len());
                buf[..n].copy_from_slice(&chunk[..n]);
                if n < chunk.len() {
                    self.chunks.push_front(chunk[n..].to_vec());
                }
                Ok(n)
            }
            None if self.fail_after_script => {
                Err(io::Error::new(io::ErrorKind::BrokenPipe, "device unplugged"))
            }
            None => {
                std::thread::sleep(self.timeout);
                Err(io::Error::new(io::ErrorKind::TimedOut, "read timed out"))
            }
        }
    }
}

impl LineChannel for FakeChannel {
    fn set_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        self.timeout = timeout;
        Ok(())
    }

    fn describe(&self) -> String {
        "fake link".to_string()
    }
}

impl Drop for FakeChannel {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Link that never goes idle: hands out `chunk` every `pause`, forever
pub struct StreamingChannel {
    chunk: Vec<u8>,
    pause: Duration,
    drops: Arc<AtomicUsize>,
}

impl StreamingChannel {
    pub fn new(chunk: &[u8], pause: Duration) -> Self {
        Self {
            chunk: chunk.to_vec(),
            pause,
            drops: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Counter incremented when the channel is released
    pub fn drop_counter(&self) -> Arc<AtomicUsize> {
        self.drops.clone()
    }
}

impl Read for StreamingChannel {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        std::thread::sleep(self.pause);
        let n = self.chunk.len().min(buf.len());
        buf[..n].copy_from_slice(&self.chunk[..n]);
        Ok(n)
    }
}

impl LineChannel for StreamingChannel {
    fn set_timeout(&mut self, _timeout: Duration) -> io::Result<()> {
        Ok(())
    }

    fn describe(&self) -> String {
        "streaming link".to_string()
    }
}

impl Drop for StreamingChannel {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

/// Route `tracing` output through the test harness; `RUST_LOG` selects the level
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Number of times a counter from [`FakeChannel::drop_counter`] fired
pub fn released(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

/// Poll `cond` every few milliseconds until it holds or `limit` elapses
pub fn wait_for(limit: Duration, mut cond: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + limit;
    while std::time::Instant::now() < deadline {
        if cond() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(2));
    }
    cond()
}
