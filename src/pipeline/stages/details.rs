use super::{commit, complete, Stage, StageReport};
use crate::app::ports::PageFetcher;
use crate::config::{Config, StagePaths};
use crate::constants::{COMPLETED, DETAIL_PAGE_MARKER, ITEM_URL_COLUMN, STAGE_DETAILS};
use crate::error::{Result, ScraperError};
use crate::parser::parse_detail_page;
use crate::pipeline::batch_writer::BatchWriter;
use crate::pipeline::crawl::CrawlSession;
use crate::pipeline::{checkpoint, table};
use crate::types::ItemDetail;
use std::collections::HashSet;
use tracing::{error, info, instrument};

/// Stage 3: fetch every distinct item page and extract its detail record.
///
/// Items already present in the output are never fetched again, so a rerun
/// after an interrupted flush does not duplicate rows.
#[instrument(skip_all, fields(stage = STAGE_DETAILS))]
pub async fn run<F: PageFetcher>(
    session: &mut CrawlSession<F>,
    config: &Config,
    paths: &StagePaths,
) -> Result<StageReport> {
    let mut report = StageReport::start(Stage::Details);
    let last = checkpoint::load(&paths.checkpoint)?;
    if last.as_deref() == Some(COMPLETED) {
        report.finish(true);
        return Ok(report);
    }

    let input = paths
        .input
        .as_deref()
        .ok_or_else(|| ScraperError::Config("details stage has no input file".to_string()))?;
    let units = table::unique_in_order(table::read_column(input, ITEM_URL_COLUMN)?);

    let mut seen: HashSet<String> = if paths.output.exists() {
        table::read_column(&paths.output, ITEM_URL_COLUMN)?
            .into_iter()
            .collect()
    } else {
        HashSet::new()
    };
    info!(
        "Found {} unique items, {} already extracted",
        units.len(),
        seen.len()
    );

    let start = checkpoint::resume_index(&units, last.as_deref());
    report.units_skipped = start;

    let mut writer: BatchWriter<ItemDetail> =
        BatchWriter::new(&paths.output, config.crawl.batch_size, STAGE_DETAILS);

    for item_url in &units[start..] {
        if seen.contains(item_url) {
            report.units_skipped += 1;
            continue;
        }

        info!("Processing {}", item_url);
        match session.fetch_page(item_url, Some(DETAIL_PAGE_MARKER)).await {
            Ok(html) => {
                let detail = parse_detail_page(&html, item_url);
                seen.insert(item_url.clone());
                report.units_processed += 1;
                if writer.push(detail) {
                    commit(&mut writer, &paths.checkpoint, Some(item_url))?;
                }
            }
            Err(e) => {
                error!("Error processing {}: {}", item_url, e);
                report.units_failed += 1;
            }
        }
    }

    complete(&mut writer, &paths.checkpoint, &mut report)?;
    info!(
        "Detail extraction completed: {} new records, {} failed",
        report.records_written, report.units_failed
    );
    Ok(report)
}
