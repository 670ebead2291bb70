//! Row flattening and the CSV output sink

use std::borrow::Cow;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::client::models::Finding;
use crate::error::{ExportError, Result};

/// Fixed column order of the export artifact
pub const CSV_HEADER: [&str; 7] = [
    "Region",
    "FindingId",
    "Title",
    "Description",
    "Severity",
    "CreatedAt",
    "UpdatedAt",
];

/// Render a severity with exactly one fractional digit.
///
/// Uses Rust's `{:.1}` formatting, which rounds half to even.
pub fn format_severity(severity: f64) -> String {
    format!("{severity:.1}")
}

/// One denormalized output row: a resolved finding plus the region it was
/// discovered under. Timestamps pass through verbatim.
#[derive(Debug, Clone, PartialEq)]
pub struct ExportRow {
    pub region: String,
    pub finding_id: String,
    pub title: String,
    pub description: String,
    pub severity: String,
    pub created_at: String,
    pub updated_at: String,
}

impl ExportRow {
    /// Flatten a finding into a row.
    ///
    /// Every required field must be present; a missing one fails the record
    /// (and with it the export) rather than producing a partial row.
    pub fn from_finding(region: &str, finding: Finding) -> std::result::Result<Self, ExportError> {
        let id = finding
            .id
            .clone()
            .ok_or_else(|| finding.missing("id"))?;
        let title = finding
            .title
            .clone()
            .ok_or_else(|| finding.missing("title"))?;
        let description = finding
            .description
            .clone()
            .ok_or_else(|| finding.missing("description"))?;
        let severity = finding.severity.ok_or_else(|| finding.missing("severity"))?;
        let created_at = finding
            .created_at
            .clone()
            .ok_or_else(|| finding.missing("createdAt"))?;
        let updated_at = finding
            .updated_at
            .clone()
            .ok_or_else(|| finding.missing("updatedAt"))?;

        Ok(Self {
            region: region.to_string(),
            finding_id: id,
            title,
            description,
            severity: format_severity(severity),
            created_at,
            updated_at,
        })
    }

    fn fields(&self) -> [&str; 7] {
        [
            &self.region,
            &self.finding_id,
            &self.title,
            &self.description,
            &self.severity,
            &self.created_at,
            &self.updated_at,
        ]
    }
}

/// Destination for export rows.
///
/// Owned exclusively by the aggregator; rows arrive in discovery order.
pub trait RowSink: Send {
    /// Write the fixed header. Called once, before any row.
    fn write_header(&mut self) -> Result<()>;

    /// Append one row.
    fn append(&mut self, row: &ExportRow) -> Result<()>;

    /// Flush buffered rows to the destination.
    fn flush(&mut self) -> Result<()>;

    /// Identifier of the artifact, e.g. its file name.
    fn name(&self) -> String;
}

/// Artifact path for an export started at `now`.
///
/// The timestamp keeps concurrent exports from colliding.
pub fn timestamped_path(dir: &Path, now: DateTime<Local>) -> PathBuf {
    dir.join(format!("findings_{}.csv", now.format("%Y%m%d_%H%M%S")))
}

/// CSV file sink with RFC 4180 quoting
pub struct CsvSink {
    writer: BufWriter<File>,
    path: PathBuf,
}

impl CsvSink {
    /// Create the artifact file, truncating any previous one at the path.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let file = File::create(&path).map_err(|source| ExportError::SinkWrite {
            path: path.display().to_string(),
            source,
        })?;

        Ok(Self {
            writer: BufWriter::new(file),
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write_record(&mut self, fields: &[&str]) -> Result<()> {
        let line = fields
            .iter()
            .map(|f| csv_escape(f))
            .collect::<Vec<_>>()
            .join(",");

        writeln!(self.writer, "{line}").map_err(|source| {
            ExportError::SinkWrite {
                path: self.path.display().to_string(),
                source,
            }
            .into()
        })
    }
}

impl RowSink for CsvSink {
    fn write_header(&mut self) -> Result<()> {
        self.write_record(&CSV_HEADER)
    }

    fn append(&mut self, row: &ExportRow) -> Result<()> {
        self.write_record(&row.fields())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().map_err(|source| {
            ExportError::SinkWrite {
                path: self.path.display().to_string(),
                source,
            }
            .into()
        })
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}

/// Quote a field per RFC 4180 when it contains a delimiter, quote, or
/// line break; otherwise pass it through unchanged.
fn csv_escape(field: &str) -> Cow<'_, str> {
    if field.contains([',', '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", field.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(field)
    }
}

/// In-memory sink for tests: records rows and can fail on demand.
#[cfg(test)]
pub struct MemorySink {
    pub rows: Vec<ExportRow>,
    pub header_written: bool,
    /// Fail the append that would write row number N (1-based).
    pub fail_on_row: Option<usize>,
}

#[cfg(test)]
impl MemorySink {
    pub fn new() -> Self {
        Self {
            rows: Vec::new(),
            header_written: false,
            fail_on_row: None,
        }
    }
}

#[cfg(test)]
impl RowSink for MemorySink {
    fn write_header(&mut self) -> Result<()> {
        self.header_written = true;
        Ok(())
    }

    fn append(&mut self, row: &ExportRow) -> Result<()> {
        if let Some(n) = self.fail_on_row {
            if self.rows.len() + 1 >= n {
                return Err(ExportError::SinkWrite {
                    path: "<memory>".to_string(),
                    source: std::io::Error::other("sink full"),
                }
                .into());
            }
        }
        self.rows.push(row.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> String {
        "<memory>".to_string()
    }
}
