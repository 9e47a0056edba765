//! Output entries and the sinks that receive them.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::models::Record;

/// What the index should do with an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Index,
    Delete,
}

/// Where an entry came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub source: String,
    pub run_id: String,
    pub run_date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub run_type: Option<String>,
    /// 0-based position of the raw record in the input.
    pub run_record_offset: usize,
}

/// One line of output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutputEntry {
    pub action: Action,
    pub timdex_record_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<Box<Record>>,
    #[serde(flatten)]
    pub provenance: Provenance,
}

impl OutputEntry {
    /// An entry that indexes a record.
    #[must_use]
    pub fn index(record: Box<Record>, provenance: Provenance) -> Self {
        Self {
            action: Action::Index,
            timdex_record_id: record.timdex_record_id.clone(),
            record: Some(record),
            provenance,
        }
    }

    /// An entry that removes a record from the index.
    #[must_use]
    pub fn delete(timdex_record_id: String, provenance: Provenance) -> Self {
        Self {
            action: Action::Delete,
            timdex_record_id,
            record: None,
            provenance,
        }
    }
}

/// Receives output entries in input order.
pub trait RecordSink {
    /// Write one entry.
    ///
    /// # Errors
    /// Returns an error if the entry cannot be serialized or written.
    fn write_entry(&mut self, entry: &OutputEntry) -> Result<()>;

    /// Flush buffered entries.
    ///
    /// # Errors
    /// Returns `TransformError::Io` if the underlying writer fails.
    fn flush(&mut self) -> Result<()>;
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W: Write> {
    writer: W,
}

impl JsonLinesSink<BufWriter<File>> {
    /// Create (or truncate) an output file.
    ///
    /// # Errors
    /// Returns `TransformError::Io` if the file cannot be created.
    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Give back the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for JsonLinesSink<W> {
    fn write_entry(&mut self, entry: &OutputEntry) -> Result<()> {
        serde_json::to_writer(&mut self.writer, entry)?;
        self.writer.write_all(b"\n")?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Keeps entries in memory.
impl RecordSink for Vec<OutputEntry> {
    fn write_entry(&mut self, entry: &OutputEntry) -> Result<()> {
        self.push(entry.clone());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}
