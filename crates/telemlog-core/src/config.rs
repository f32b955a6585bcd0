//! Acquisition configuration
//!
//! Everything the pipeline needs to start, loadable from a JSON file. Every
//! field has a default, so a file only lists what it changes.

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::datalog::default_log_path;
use crate::history::DEFAULT_HISTORY_CAPACITY;
use crate::protocol::{DEFAULT_BAUD_RATE, DEFAULT_READ_TIMEOUT_MS};

/// Prefix of generated log file names
pub const LOG_FILE_PREFIX: &str = "telemlog";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Where records come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Serial link to the logger
    #[default]
    Hardware,
    /// Built-in generator, no hardware needed
    Synthetic,
}

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    /// Source variant
    pub mode: SourceMode,
    /// Serial port; auto-selected when exactly one exists
    pub port: Option<String>,
    /// Baud rate
    pub baud_rate: u32,
    /// Bounded timeout of each read (ms); also bounds shutdown latency
    pub read_timeout_ms: u64,
    /// Spacing of synthetic records (ms)
    pub synthetic_interval_ms: u64,
    /// Seed of the synthetic sensor noise
    pub synthetic_seed: u64,
    /// Points kept per channel for plotting
    pub history_capacity: usize,
    /// Write accepted records to a CSV log
    pub logging_enabled: bool,
    /// Explicit log file; generated under `log_dir` when absent
    pub log_path: Option<PathBuf>,
    /// Directory for generated log files
    pub log_dir: PathBuf,
    /// Consumer refresh interval (ms)
    pub consumer_tick_ms: u64,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            mode: SourceMode::Hardware,
            port: None,
            baud_rate: DEFAULT_BAUD_RATE,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            synthetic_interval_ms: 50,
            synthetic_seed: 0,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            logging_enabled: true,
            log_path: None,
            log_dir: PathBuf::from("logs"),
            consumer_tick_ms: 100,
        }
    }
}

impl AcquisitionConfig {
    /// Load from a JSON file and validate
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Parse from JSON text and validate
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baud_rate == 0 {
            return Err(ConfigError::Invalid("baud_rate must be positive".into()));
        }
        if self.read_timeout_ms == 0 {
            return Err(ConfigError::Invalid("read_timeout_ms must be positive".into()));
        }
        if self.history_capacity == 0 {
            return Err(ConfigError::Invalid("history_capacity must be positive".into()));
        }
        if self.consumer_tick_ms == 0 {
            return Err(ConfigError::Invalid("consumer_tick_ms must be positive".into()));
        }
        if self.mode == SourceMode::Synthetic && self.synthetic_interval_ms > self.read_timeout_ms {
            return Err(ConfigError::Invalid(format!(
                "synthetic_interval_ms ({}) must not exceed read_timeout_ms ({})",
                self.synthetic_interval_ms, self.read_timeout_ms
            )));
        }
        Ok(())
    }

    /// Bounded timeout applied to each hardware read
    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    /// Pause between synthetic records
    pub fn synthetic_interval(&self) -> Duration {
        Duration::from_millis(self.synthetic_interval_ms)
    }

    /// Consumer refresh period
    pub fn consumer_tick(&self) -> Duration {
        Duration::from_millis(self.consumer_tick_ms)
    }

    /// Log file to create, or `None` when logging is disabled
    pub fn resolved_log_path(&self) -> Option<PathBuf> {
        if !self.logging_enabled {
            return None;
        }
        Some(
            self.log_path
                .clone()
                .unwrap_or_else(|| default_log_path(&self.log_dir, LOG_FILE_PREFIX, Local::now())),
        )
    }
}
