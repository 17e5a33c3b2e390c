//! Stage drivers. Each stage walks its units in order, flushes records before
//! advancing its checkpoint, and writes `COMPLETED` when nothing is left.

pub mod collections;
pub mod details;
pub mod items;

use crate::constants::{STAGE_COLLECTIONS, STAGE_DETAILS, STAGE_ITEMS};
use crate::error::Result;
use crate::pipeline::batch_writer::BatchWriter;
use crate::pipeline::checkpoint;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Stage {
    Collections,
    Items,
    Details,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Collections, Stage::Items, Stage::Details];

    pub fn name(self) -> &'static str {
        match self {
            Stage::Collections => STAGE_COLLECTIONS,
            Stage::Items => STAGE_ITEMS,
            Stage::Details => STAGE_DETAILS,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of one stage invocation
#[derive(Debug, Clone, Serialize)]
pub struct StageReport {
    pub stage: String,
    pub units_processed: usize,
    pub units_skipped: usize,
    pub units_failed: usize,
    pub records_written: usize,
    pub completed: bool,
    pub error: Option<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl StageReport {
    pub fn start(stage: Stage) -> Self {
        Self {
            stage: stage.name().to_string(),
            units_processed: 0,
            units_skipped: 0,
            units_failed: 0,
            records_written: 0,
            completed: false,
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Report for a stage whose checkpoint was already terminal.
    pub fn already_done(stage: Stage) -> Self {
        let mut report = Self::start(stage);
        report.finish(true);
        report
    }

    pub fn failed(stage: Stage, error: &dyn std::error::Error) -> Self {
        let mut report = Self::start(stage);
        report.error = Some(error.to_string());
        report.finish(false);
        report
    }

    pub fn finish(&mut self, completed: bool) {
        self.completed = completed;
        self.finished_at = Some(Utc::now());
    }
}

/// Flush buffered records, then advance the checkpoint to `unit`.
pub(crate) fn commit<T: Serialize>(
    writer: &mut BatchWriter<T>,
    checkpoint_path: &Path,
    unit: Option<&str>,
) -> Result<()> {
    writer.flush()?;
    if let Some(unit) = unit {
        checkpoint::mark_completed(checkpoint_path, unit)?;
    }
    Ok(())
}

/// Drain the buffer and write the terminal sentinel.
pub(crate) fn complete<T: Serialize>(
    writer: &mut BatchWriter<T>,
    checkpoint_path: &Path,
    report: &mut StageReport,
) -> Result<()> {
    writer.flush()?;
    checkpoint::mark_terminal(checkpoint_path)?;
    report.records_written = writer.total_written();
    report.finish(true);
    Ok(())
}
