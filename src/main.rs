use anyhow::Context;
use clap::{Parser, Subcommand};
use list_scraper::config::Config;
use list_scraper::infra::http_client::ReqwestFetcher;
use list_scraper::logging;
use list_scraper::pipeline::merge::{self, MergeReport};
use list_scraper::pipeline::{orchestrator, PipelineReport, Stage, StageReport, StageStatus};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "list_scraper")]
#[command(about = "Resumable collection, item and detail scraper with CSV output")]
#[command(version = "0.1.0")]
struct Cli {
    /// Path to the TOML config (defaults to $LIST_SCRAPER_CONFIG, then config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print reports as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stage 1: discover collections from the listing pages
    Collections,
    /// Stage 2: expand collections into item references
    Items,
    /// Stage 3: extract details for every referenced item
    Details,
    /// Join the three stage outputs into one table
    Merge,
    /// Run all pending stages, then merge when they are all complete
    Run,
    /// Show checkpoint and output state for every stage
    Status,
    /// Clear a stage's checkpoint so it starts over on the next run
    Reset {
        #[arg(value_enum)]
        stage: Stage,
    },
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(&path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load().context("loading config")?,
    };
    Ok(config)
}

fn emit<T: Serialize + ?Sized>(json: bool, value: &T, text: impl FnOnce(&T)) -> anyhow::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        text(value);
    }
    Ok(())
}

fn print_stage(report: &StageReport) {
    let icon = if report.completed { "✅" } else { "⚠️ " };
    println!("\n{} Stage {}:", icon, report.stage);
    println!("   Processed: {}", report.units_processed);
    println!("   Skipped: {}", report.units_skipped);
    println!("   Failed: {}", report.units_failed);
    println!("   Records written: {}", report.records_written);
    if let Some(err) = &report.error {
        println!("   Error: {}", err);
    }
}

fn print_merge(report: &MergeReport) {
    println!("\n📊 Merged {} rows x {} columns", report.rows, report.columns);
    println!("   Output file: {}", report.output.display());
}

fn print_pipeline(report: &PipelineReport) {
    for stage in &report.stages {
        print_stage(stage);
    }
    match (&report.merge, &report.halted_at) {
        (Some(merge), _) => print_merge(merge),
        (None, Some(stage)) => println!("\n⏸️  Halted at stage {}; run again to resume", stage),
        (None, None) => {}
    }
}

fn print_status(statuses: &[StageStatus]) {
    for status in statuses {
        let state = if status.completed {
            "completed".to_string()
        } else {
            match &status.checkpoint {
                Some(last) => format!("in progress (last: {})", last),
                None => "not started".to_string(),
            }
        };
        println!(
            "{:<12} {:<48} {} rows in {}",
            status.stage,
            state,
            status.output_rows,
            status.output.display()
        );
    }
}

async fn run_single(stage: Stage, config: &Config, json: bool) -> anyhow::Result<()> {
    let fetcher = ReqwestFetcher::new(&config.crawl)?;
    let (_, result) = orchestrator::run_stage(stage, fetcher, config).await;
    match result {
        Ok(report) => emit(json, &report, print_stage),
        Err(e) => {
            error!("Stage {} failed: {}", stage, e);
            Err(e.into())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();
    let config = load_config(cli.config)?;

    match cli.command {
        Commands::Collections => run_single(Stage::Collections, &config, cli.json).await?,
        Commands::Items => run_single(Stage::Items, &config, cli.json).await?,
        Commands::Details => run_single(Stage::Details, &config, cli.json).await?,
        Commands::Merge => {
            info!("🔗 Merging stage outputs");
            let report = merge::run(&config.paths)?;
            emit(cli.json, &report, print_merge)?;
        }
        Commands::Run => {
            info!("🚀 Running full pipeline");
            let fetcher = ReqwestFetcher::new(&config.crawl)?;
            let report = orchestrator::run_pipeline(&config, fetcher).await?;
            emit(cli.json, &report, print_pipeline)?;
        }
        Commands::Status => {
            let statuses = orchestrator::status(&config)?;
            emit(cli.json, statuses.as_slice(), print_status)?;
        }
        Commands::Reset { stage } => {
            orchestrator::reset(&config, stage)?;
            if !cli.json {
                println!("🧹 Checkpoint for {} cleared", stage);
            }
        }
    }
    Ok(())
}
