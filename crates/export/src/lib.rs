//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use iris_store::MissionRecord;
use iris_trajectory::TrajectoryPoint;
use serde_json::to_writer_pretty;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("unsupported export format for '{0}' (use .csv or .json)")]
    UnsupportedFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    /// One row per trajectory point, header = point field names.
    Csv,
    /// The full mission record, pretty printed.
    Json,
}

impl ExportFormat {
    /// Pick a format from the file extension. `-` (stdout) exports JSON.
    pub fn from_path(path: &Path) -> Result<Self, ExportError> {
        if path == Path::new("-") {
            return Ok(Self::Json);
        }
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("json") => Ok(Self::Json),
            _ => Err(ExportError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub fn write_trajectory_csv<W: Write>(
    writer: W,
    points: &[TrajectoryPoint],
) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    for point in points {
        csv.serialize(point)?;
    }
    csv.flush()?;
    Ok(())
}

pub fn write_record_json<W: Write>(mut writer: W, record: &MissionRecord) -> Result<(), ExportError> {
    to_writer_pretty(&mut writer, record)?;
    writeln!(writer)?;
    writer.flush()?;
    Ok(())
}

/// Export `record` to `path` in the format implied by the path.
pub fn export_record(path: &Path, record: &MissionRecord) -> Result<ExportFormat, ExportError> {
    let format = ExportFormat::from_path(path)?;
    let writer = writer_for_path(path)?;
    match format {
        ExportFormat::Csv => write_trajectory_csv(writer, &record.trajectory)?,
        ExportFormat::Json => write_record_json(writer, record)?,
    }
    Ok(format)
}
