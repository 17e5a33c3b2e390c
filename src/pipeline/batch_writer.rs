use crate::error::{Result, ScraperError};
use metrics::counter;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Append `buffer` to the CSV at `output`, writing the header only when the
/// file is new or empty. The buffer is cleared once the rows are on disk.
pub fn flush<T: Serialize>(buffer: &mut Vec<T>, output: &Path) -> Result<usize> {
    if buffer.is_empty() {
        return Ok(0);
    }
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let write_header = fs::metadata(output).map(|m| m.len() == 0).unwrap_or(true);
    let file = OpenOptions::new().create(true).append(true).open(output)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(write_header)
        .from_writer(file);
    for record in buffer.iter() {
        writer.serialize(record)?;
    }
    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| ScraperError::Io(io::Error::new(e.error().kind(), e.error().to_string())))?;
    file.sync_all()?;

    let written = buffer.len();
    buffer.clear();
    debug!("Appended {} rows to {}", written, output.display());
    Ok(written)
}

/// Owned, bounded record buffer in front of one stage's output file
pub struct BatchWriter<T> {
    output: PathBuf,
    buffer: Vec<T>,
    capacity: usize,
    stage: &'static str,
    total_written: usize,
}

impl<T: Serialize> BatchWriter<T> {
    pub fn new(output: impl Into<PathBuf>, capacity: usize, stage: &'static str) -> Self {
        let capacity = capacity.max(1);
        Self {
            output: output.into(),
            buffer: Vec::with_capacity(capacity),
            capacity,
            stage,
            total_written: 0,
        }
    }

    /// Buffer a record; returns true once the flush threshold is reached.
    pub fn push(&mut self, record: T) -> bool {
        self.buffer.push(record);
        self.buffer.len() >= self.capacity
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn total_written(&self) -> usize {
        self.total_written
    }

    pub fn output(&self) -> &Path {
        &self.output
    }

    pub fn flush(&mut self) -> Result<usize> {
        let written = flush(&mut self.buffer, &self.output)?;
        if written > 0 {
            info!("Flushed {} records to {}", written, self.output.display());
            counter!("scrape_records_flushed_total", "stage" => self.stage).increment(written as u64);
            self.total_written += written;
        }
        Ok(written)
    }
}
