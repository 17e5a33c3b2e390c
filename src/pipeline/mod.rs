// Resumable crawl pipeline: stage drivers, durable progress and the final merge

pub mod batch_writer;
pub mod checkpoint;
pub mod crawl;
pub mod merge;
pub mod orchestrator;
pub mod stages;
pub mod table;

pub use orchestrator::{run_pipeline, run_stage, PipelineReport, StageStatus};
pub use stages::{Stage, StageReport};
