use std::fmt;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::config::OutputMode;
use crate::error::{Error, Result};
use crate::timecode::format_timestamp;

/// One logged key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    pub timestamp: Option<String>,
    pub seconds: Option<u64>,
}

impl LogRecord {
    /// Build the row for `elapsed_secs` with the fields `mode` asks for.
    pub fn new(elapsed_secs: u64, mode: OutputMode) -> Self {
        Self {
            timestamp: mode
                .includes_mmss()
                .then(|| format_timestamp(elapsed_secs)),
            seconds: mode.includes_seconds().then_some(elapsed_secs),
        }
    }

    /// Fields in output order: `MM:SS` first, then seconds.
    pub fn fields(&self) -> Vec<String> {
        self.timestamp
            .iter()
            .cloned()
            .chain(self.seconds.map(|s| s.to_string()))
            .collect()
    }
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let timestamp = self.timestamp.iter().map(|t| format!("'{t}'"));
        let seconds = self.seconds.iter().map(u64::to_string);
        let fields: Vec<String> = timestamp.chain(seconds).collect();
        write!(f, "[{}]", fields.join(", "))
    }
}

/// Headerless CSV sink, one row per record.
pub struct RecordWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl RecordWriter<File> {
    /// Create or truncate the file at `path`.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::from_writer(file))
    }
}

impl<W: Write> RecordWriter<W> {
    pub fn from_writer(inner: W) -> Self {
        let writer = csv::WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(inner);
        Self { writer }
    }

    /// Append one row and flush it so the file is current after every press.
    pub fn append(&mut self, record: &LogRecord) -> Result<()> {
        self.writer.write_record(record.fields())?;
        self.writer.flush()?;
        Ok(())
    }

    /// Flush and hand back the underlying writer.
    pub fn close(self) -> Result<W> {
        self.writer
            .into_inner()
            .map_err(|e| Error::Io(e.into_error()))
    }
}
