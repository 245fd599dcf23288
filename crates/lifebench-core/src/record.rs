//! Per-run records and the CSV result log.

use crate::error::{Result, SweepError};
use crate::grid::GridPoint;
use crate::timing::Timing;
use serde::Serialize;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CSV_HEADER: [&str; 8] = [
    "px",
    "py",
    "nx",
    "ny",
    "minutes",
    "seconds",
    "millis",
    "total_millis",
];

/// Timestamp format used in result file names.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";

pub fn timestamp_now() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

pub fn results_file_name(timestamp: &str) -> String {
    format!("results{timestamp}.csv")
}

/// One successful run.
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub point: GridPoint,
    /// Zero-based trial index within the grid point.
    pub trial: u32,
    pub timing: Timing,
    /// Measured by the harness, not the child.
    pub wall: Duration,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    px: u32,
    py: u32,
    nx: u32,
    ny: u32,
    minutes: &'a str,
    seconds: &'a str,
    millis: &'a str,
    total_millis: u64,
}

impl<'a> From<&'a RunRecord> for CsvRow<'a> {
    fn from(r: &'a RunRecord) -> Self {
        Self {
            px: r.point.px,
            py: r.point.py,
            nx: r.point.nx,
            ny: r.point.ny,
            minutes: &r.timing.minutes,
            seconds: &r.timing.seconds,
            millis: &r.timing.millis,
            total_millis: r.timing.total_millis(),
        }
    }
}

/// Append-only CSV log. Every row is flushed as soon as it is written, so a
/// sweep that dies midway leaves all completed rows on disk.
pub struct ResultLog {
    path: PathBuf,
    writer: csv::Writer<File>,
    rows: usize,
}

impl ResultLog {
    /// Creates `dir` if needed and opens `dir/results<timestamp>.csv` with its header.
    pub fn create(dir: &Path, timestamp: &str) -> Result<Self> {
        std::fs::create_dir_all(dir).map_err(|source| SweepError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = dir.join(results_file_name(timestamp));
        let file = File::create(&path).map_err(|source| SweepError::Io {
            path: path.clone(),
            source,
        })?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record(CSV_HEADER)?;
        writer.flush().map_err(|source| SweepError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(path = %path.display(), "result log created");
        Ok(Self {
            path,
            writer,
            rows: 0,
        })
    }

    pub fn append(&mut self, record: &RunRecord) -> Result<()> {
        self.writer.serialize(CsvRow::from(record))?;
        self.writer.flush().map_err(|source| SweepError::Io {
            path: self.path.clone(),
            source,
        })?;
        self.rows += 1;
        Ok(())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Data rows written so far (header excluded).
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> Result<PathBuf> {
        self.writer.flush().map_err(|source| SweepError::Io {
            path: self.path.clone(),
            source,
        })?;
        tracing::debug!(path = %self.path.display(), rows = self.rows, "result log closed");
        Ok(self.path)
    }
}
