//! CSV log file
//!
//! One header row (`timestamp_iso` followed by the schema column names),
//! then one row per record with an ISO-8601 UTC timestamp in milliseconds.

use chrono::{DateTime, Local, SecondsFormat, Utc};
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use super::LogSink;
use crate::record::{Channel, Record};

/// Name of the timestamp column
pub const TIMESTAMP_COLUMN: &str = "timestamp_iso";

/// Render a timestamp as `2024-05-01T12:30:45.123+00:00`
pub fn format_timestamp(timestamp: DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, false)
}

/// `dir/<prefix>_YYYYmmdd_HHMMSS.csv` for the given local time
pub fn default_log_path(dir: &Path, prefix: &str, now: DateTime<Local>) -> PathBuf {
    dir.join(format!("{}_{}.csv", prefix, now.format("%Y%m%d_%H%M%S")))
}

/// CSV-backed [`LogSink`]
pub struct CsvLogSink {
    path: PathBuf,
    writer: Option<BufWriter<File>>,
    rows: u64,
}

impl CsvLogSink {
    /// Create the file (and missing parent directories) and write the header
    pub fn create<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let mut writer = BufWriter::new(File::create(&path)?);
        write!(writer, "{}", TIMESTAMP_COLUMN)?;
        for channel in Channel::ALL {
            write!(writer, ",{}", channel.name())?;
        }
        writeln!(writer)?;

        tracing::info!("Logging to {}", path.display());
        Ok(Self {
            path,
            writer: Some(writer),
            rows: 0,
        })
    }

    /// Path of the log file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far
    pub fn rows(&self) -> u64 {
        self.rows
    }
}

impl LogSink for CsvLogSink {
    fn append(&mut self, timestamp: DateTime<Utc>, record: &Record) -> io::Result<()> {
        let writer = self
            .writer
            .as_mut()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "log sink already finished"))?;

        write!(writer, "{}", format_timestamp(timestamp))?;
        for value in record.values() {
            write!(writer, ",{}", value)?;
        }
        writeln!(writer)?;
        self.rows += 1;
        Ok(())
    }

    fn finish(&mut self) -> io::Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
            writer.get_ref().sync_all()?;
            tracing::info!("Closed {} after {} rows", self.path.display(), self.rows);
        }
        Ok(())
    }
}

impl Drop for CsvLogSink {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            tracing::error!("Failed to close {}: {e}", self.path.display());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    #[test]
    fn test_timestamp_format() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 12, 30, 45).unwrap()
            + chrono::Duration::milliseconds(123);
        assert_eq!(format_timestamp(ts), "2024-05-01T12:30:45.123+00:00");
    }

    #[test]
    fn test_default_log_path() {
        let now = Local.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let path = default_log_path(Path::new("logs"), "telemlog", now);
        assert_eq!(path, Path::new("logs").join("telemlog_20240102_030405.csv"));
    }

    #[test]
    fn test_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("run.csv");
        let mut sink = CsvLogSink::create(&path).unwrap();

        let ts = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let record = Record::from_values([1, 800, 0, 1, 50, 70, 350, 340, 20, 200, 3000, 1000, 100, 95, 13800, 5020, 0]);
        sink.append(ts, &record).unwrap();
        sink.finish().unwrap();
        sink.finish().unwrap();
        assert_eq!(sink.rows(), 1);

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "timestamp_iso,log_index,engine_rpm,vehicle_speed,gear,torque,oil_coolant_temperature,\
             EGT_bank1,EGT_bank2,intake_air_temperature,oil_press,fuel_press,MAP_value,\
             exhaust_press_bank1,exhaust_press_bank2,U12V,U5V,faultword1"
        );
        assert_eq!(
            lines[1],
            "2024-05-01T00:00:00.000+00:00,1,800,0,1,50,70,350,340,20,200,3000,1000,100,95,13800,5020,0"
        );
        assert_eq!(lines.len(), 2);
    }

    #[test]
    fn test_append_after_finish_fails() {
        let dir = TempDir::new().unwrap();
        let mut sink = CsvLogSink::create(dir.path().join("run.csv")).unwrap();
        sink.finish().unwrap();
        assert!(sink.append(Utc::now(), &Record::default()).is_err());
    }
}
