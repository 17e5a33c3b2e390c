use crate::app::ports::PageFetcher;
use crate::config::Config;
use crate::error::Result;
use crate::pipeline::checkpoint;
use crate::pipeline::crawl::CrawlSession;
use crate::pipeline::merge::{self, MergeReport};
use crate::pipeline::stages::{collections, details, items, Stage, StageReport};
use crate::pipeline::table;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub stages: Vec<StageReport>,
    pub merge: Option<MergeReport>,
    /// First stage that did not reach `COMPLETED`, if any
    pub halted_at: Option<String>,
}

/// Persisted progress of one stage
#[derive(Debug, Clone, Serialize)]
pub struct StageStatus {
    pub stage: String,
    pub checkpoint: Option<String>,
    pub completed: bool,
    pub output: PathBuf,
    pub output_rows: usize,
}

/// Run a single stage with its own session. A terminal checkpoint skips the
/// stage without touching the network.
pub async fn run_stage<F: PageFetcher>(stage: Stage, fetcher: F, config: &Config) -> (F, Result<StageReport>) {
    let paths = match config.paths.stage(stage.name()) {
        Ok(paths) => paths,
        Err(e) => return (fetcher, Err(e)),
    };
    if checkpoint::is_done(&paths.checkpoint) {
        info!("Stage {} already completed, skipping", stage);
        return (fetcher, Ok(StageReport::already_done(stage)));
    }

    info!("🚀 Starting stage {}", stage);
    let mut session = CrawlSession::new(fetcher, &config.crawl, stage.name());
    let result = match stage {
        Stage::Collections => collections::run(&mut session, config, &paths).await,
        Stage::Items => items::run(&mut session, config, &paths).await,
        Stage::Details => details::run(&mut session, config, &paths).await,
    };
    info!("Stage {} fetched {} pages", stage, session.pages_fetched());
    (session.into_fetcher(), result)
}

/// Run every stage in order, stopping at the first one that does not finish,
/// then merge once all three are complete.
pub async fn run_pipeline<F: PageFetcher>(config: &Config, fetcher: F) -> Result<PipelineReport> {
    let mut report = PipelineReport {
        stages: Vec::new(),
        merge: None,
        halted_at: None,
    };
    let mut fetcher = fetcher;

    for stage in Stage::ALL {
        let (returned, result) = run_stage(stage, fetcher, config).await;
        fetcher = returned;
        let stage_report = match result {
            Ok(stage_report) => stage_report,
            Err(e) => {
                error!("❌ Stage {} failed: {}", stage, e);
                StageReport::failed(stage, &e)
            }
        };
        let completed = stage_report.completed;
        report.stages.push(stage_report);
        if !completed {
            warn!("Stage {} did not complete; later stages wait for the next run", stage);
            report.halted_at = Some(stage.name().to_string());
            return Ok(report);
        }
        if let Err(e) = fetcher.rotate() {
            warn!("Could not start a fresh session after {}: {}", stage, e);
        }
    }

    let merged = merge::run(&config.paths)?;
    info!("✅ Pipeline finished: {} merged rows", merged.rows);
    report.merge = Some(merged);
    Ok(report)
}

pub fn status(config: &Config) -> Result<Vec<StageStatus>> {
    let mut statuses = Vec::new();
    for stage in Stage::ALL {
        let paths = config.paths.stage(stage.name())?;
        let checkpoint = checkpoint::load(&paths.checkpoint)?;
        statuses.push(StageStatus {
            stage: stage.name().to_string(),
            completed: checkpoint::is_done(&paths.checkpoint),
            checkpoint,
            output_rows: table::count_rows(&paths.output)?,
            output: paths.output,
        });
    }
    Ok(statuses)
}

/// Forget a stage's progress so the next run starts it over. Output rows are kept.
pub fn reset(config: &Config, stage: Stage) -> Result<()> {
    let path = config.paths.checkpoint_for(stage.name());
    checkpoint::clear(&path)?;
    info!("Checkpoint for {} cleared", stage);
    Ok(())
}
