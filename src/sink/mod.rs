//! Metric sinks
//!
//! Provides the [`MetricSink`] capability trait the tracker writes through,
//! plus bundled implementations: an in-memory recorder, an append-only JSONL
//! file sink, and a discarding null sink. Persistence is entirely the sink's
//! concern; the tracker never flushes, closes, or reinitializes one.


use std::fs;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Errors from sink write operations
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for sink operations
pub type Result<T> = std::result::Result<T, SinkError>;

/// A logged metric value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricValue {
    Scalar(f64),
    Text(String),
}

/// A single metric write: name, value, and the global step it landed on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    pub name: String,
    pub value: MetricValue,
    pub step: u64,
}

/// Capability for recording named metric values at integer steps
///
/// Any metrics backend able to store a (name, value, step) tuple can be
/// plugged into the tracker through this trait.
pub trait MetricSink {
    /// Record a scalar value at the given step
    fn write_scalar(&mut self, name: &str, value: f64, step: u64) -> Result<()>;

    /// Record a text value at the given step
    fn write_text(&mut self, name: &str, value: &str, step: u64) -> Result<()>;
}

/// Sink that discards every write
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl MetricSink for NullSink {
    fn write_scalar(&mut self, _name: &str, _value: f64, _step: u64) -> Result<()> {
        Ok(())
    }

    fn write_text(&mut self, _name: &str, _value: &str, _step: u64) -> Result<()> {
        Ok(())
    }
}

/// In-memory sink for testing and inspection
///
/// Keeps every write in insertion order. No persistence.
#[derive(Debug, Default)]
pub struct InMemorySink {
    records: Vec<MetricRecord>,
}

impl InMemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// All records written so far, in write order
    #[must_use]
    pub fn records(&self) -> &[MetricRecord] {
        &self.records
    }
}

impl MetricSink for InMemorySink {
    fn write_scalar(&mut self, name: &str, value: f64, step: u64) -> Result<()> {
        self.records.push(MetricRecord {
            name: name.to_string(),
            value: MetricValue::Scalar(value),
            step,
        });
        Ok(())
    }

    fn write_text(&mut self, name: &str, value: &str, step: u64) -> Result<()> {
        self.records.push(MetricRecord {
            name: name.to_string(),
            value: MetricValue::Text(value.to_string()),
            step,
        });
        Ok(())
    }
}

/// JSON-lines file sink
///
/// Appends one JSON object per write to a single file, creating parent
/// directories on the first write. Lines follow the [`MetricRecord`] schema.
///
/// # Example
///
/// ```no_run
/// use milpasos::JsonlFileSink;
///
/// let sink = JsonlFileSink::new("/tmp/runs/run-20260806.jsonl");
/// ```
#[derive(Debug)]
pub struct JsonlFileSink {
    path: PathBuf,
}

impl JsonlFileSink {
    /// Create a sink appending to the given file path
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Path the sink appends to
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read back all records appended so far
    ///
    /// A file that does not exist yet reads as empty.
    pub fn load(&self) -> Result<Vec<MetricRecord>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut records = Vec::new();
        for line in fs::read_to_string(&self.path)?.lines() {
            records.push(serde_json::from_str(line)?);
        }
        Ok(records)
    }

    fn append(&self, record: &MetricRecord) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                fs::create_dir_all(dir)?;
            }
        }
        let json = serde_json::to_string(record)?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{json}")?;
        Ok(())
    }
}

impl MetricSink for JsonlFileSink {
    fn write_scalar(&mut self, name: &str, value: f64, step: u64) -> Result<()> {
        self.append(&MetricRecord {
            name: name.to_string(),
            value: MetricValue::Scalar(value),
            step,
        })
    }

    fn write_text(&mut self, name: &str, value: &str, step: u64) -> Result<()> {
        self.append(&MetricRecord {
            name: name.to_string(),
            value: MetricValue::Text(value.to_string()),
            step,
        })
    }
}
