//! Telemlog CLI - read engine telemetry over serial, log it to CSV and
//! report the live state.

mod status;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use telemlog_core::prelude::*;
use telemlog_core::protocol::list_ports;
use tracing_subscriber::EnvFilter;

/// Log a status line every this many consumer ticks
const STATUS_EVERY_TICKS: u64 = 10;

#[derive(Parser, Debug)]
#[command(name = "telemlog")]
#[command(about = "Read engine telemetry over serial and log it")]
#[command(version)]
struct Cli {
    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Serial port (e.g. /dev/ttyUSB0 or COM3). Auto-selected when only one port exists
    #[arg(long)]
    port: Option<String>,

    /// Baud rate
    #[arg(long)]
    baud: Option<u32>,

    /// Output CSV path (default: ./logs/telemlog_YYYYmmdd_HHMMSS.csv)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Points kept per channel in the live history
    #[arg(long)]
    max_points: Option<usize>,

    /// Run without hardware using synthetic data
    #[arg(long)]
    demo: bool,

    /// Disable CSV logging
    #[arg(long)]
    no_log: bool,

    /// Consumer refresh interval in milliseconds
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Print detected serial ports and exit
    #[arg(long)]
    list_ports: bool,

    /// Debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn build_config(&self) -> Result<AcquisitionConfig> {
        let mut config = match &self.config {
            Some(path) => AcquisitionConfig::from_file(path)
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => AcquisitionConfig::default(),
        };

        if self.demo {
            config.mode = SourceMode::Synthetic;
        }
        if let Some(port) = &self.port {
            config.port = Some(port.clone());
        }
        if let Some(baud) = self.baud {
            config.baud_rate = baud;
        }
        if let Some(csv) = &self.csv {
            config.log_path = Some(csv.clone());
        }
        if let Some(points) = self.max_points {
            config.history_capacity = points;
        }
        if self.no_log {
            config.logging_enabled = false;
        }
        if let Some(tick) = self.tick_ms {
            config.consumer_tick_ms = tick;
        }

        config.validate()?;
        Ok(config)
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.list_ports {
        let ports = list_ports();
        if ports.is_empty() {
            println!("No serial ports found");
        }
        for port in ports {
            println!("{port}");
        }
        return Ok(());
    }

    let config = cli.build_config()?;
    let pipeline = acquisition::start(&config).context("Failed to start acquisition")?;
    let stop = pipeline.stop_signal();

    {
        let stop = stop.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupted, stopping");
                stop.stop();
            }
        });
    }
    tracing::info!("Press Ctrl+C to stop.");

    let faults = FaultTable::default();
    let mut history = History::new(config.history_capacity);
    let mut ticker = tokio::time::interval(config.consumer_tick());
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    let mut ticks: u64 = 0;

    while !stop.is_stopped() && !pipeline.is_finished() {
        ticker.tick().await;
        ticks += 1;

        let Some(record) = pipeline.latest() else {
            continue;
        };
        let fresh = history.ingest(&record);

        if fresh && ticks % STATUS_EVERY_TICKS == 0 {
            tracing::info!("{}", status::status_line(&record, &faults));
            if let Some((lo, hi)) = status::series_range(&history.series(Channel::EngineRpm)) {
                tracing::debug!(
                    "rpm range {}..{} over {} points, {} rejected lines",
                    lo,
                    hi,
                    history.len(),
                    pipeline.stats().rejected()
                );
            }
        }
    }

    let log_path = pipeline.log_path().map(|p| p.to_path_buf());
    let outcome = tokio::task::spawn_blocking(move || pipeline.stop_and_join())
        .await
        .context("Acquisition join task failed")?;

    match outcome {
        Ok(report) => {
            tracing::info!(
                "Stopped ({:?}): {} records, {} rejected, {} logged",
                report.cause,
                report.stats.accepted,
                report.stats.rejected(),
                report.stats.logged
            );
            if let Some(path) = log_path {
                tracing::info!("Log written to {}", path.display());
            }
            Ok(())
        }
        Err(e) => Err(e).context("Acquisition failed"),
    }
}
