//! Replay report sink
//!
//! Append-only CSV file with one row per executed test case. The header row
//! is written once, when the file is created.

use crate::error::{Error, Result};
use crate::types::{Locator, ReportRow};
use chrono::{NaiveDate, NaiveTime};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

/// Column headers of the report file
pub const REPORT_HEADERS: [&str; 5] = ["Date", "Time", "Element XPath", "Action", "Status"];

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M:%S";

/// Handle to one site's report file
#[derive(Debug, Clone)]
pub struct ReportSink {
    path: PathBuf,
    lock: Arc<Mutex<()>>,
}

impl ReportSink {
    /// Sink writing to `path` with its own lock
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_lock(path, Arc::new(Mutex::new(())))
    }

    pub(crate) fn with_lock(path: impl Into<PathBuf>, lock: Arc<Mutex<()>>) -> Self {
        Self {
            path: path.into(),
            lock,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `rows`, creating the file with headers if it does not exist
    pub async fn append(&self, rows: &[ReportRow]) -> Result<()> {
        let _guard = self.lock.lock().await;

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let needs_header = match fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => true,
            Err(e) => return Err(e.into()),
        };

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(Vec::new());
        if needs_header {
            writer.write_record(REPORT_HEADERS)?;
        }
        for row in rows {
            writer.write_record(to_record(row))?;
        }
        let bytes = writer.into_inner().map_err(|e| e.into_error())?;

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(&bytes).await?;
        file.flush().await?;

        debug!("Appended {} row(s) to {}", rows.len(), self.path.display());
        Ok(())
    }

    /// Read every row back; a missing file reads as empty
    pub async fn read_all(&self) -> Result<Vec<ReportRow>> {
        let _guard = self.lock.lock().await;

        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(bytes.as_slice());

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            rows.push(from_record(&record).map_err(|reason| Error::CorruptReport {
                path: self.path.display().to_string(),
                reason,
            })?);
        }
        Ok(rows)
    }
}

fn to_record(row: &ReportRow) -> [String; 5] {
    [
        row.date.format(DATE_FORMAT).to_string(),
        row.time.format(TIME_FORMAT).to_string(),
        row.locator_or_na().to_string(),
        row.action.to_string(),
        row.status.to_string(),
    ]
}

fn from_record(record: &csv::StringRecord) -> std::result::Result<ReportRow, String> {
    let field = |i: usize| record.get(i).ok_or_else(|| format!("missing column {}", i + 1));

    let date = NaiveDate::parse_from_str(field(0)?, DATE_FORMAT).map_err(|e| e.to_string())?;
    let time = NaiveTime::parse_from_str(field(1)?, TIME_FORMAT).map_err(|e| e.to_string())?;
    let locator = match field(2)? {
        "N/A" => None,
        path => Some(Locator::new(path)),
    };

    Ok(ReportRow {
        date,
        time,
        locator,
        action: field(3)?.parse()?,
        status: field(4)?.parse()?,
        detail: None,
    })
}
