use super::{commit, complete, Stage, StageReport};
use crate::app::ports::PageFetcher;
use crate::config::{Config, StagePaths};
use crate::constants::{COMPLETED, STAGE_COLLECTIONS};
use crate::error::Result;
use crate::parser::parse_listing_page;
use crate::pipeline::batch_writer::BatchWriter;
use crate::pipeline::crawl::CrawlSession;
use crate::pipeline::{checkpoint, table};
use crate::types::CollectionRecord;
use tracing::{error, info, instrument};

/// Stage 1: follow the listing pagination and record every collection.
///
/// Unit = one listing page. The checkpoint names the last page whose
/// collections are on disk.
#[instrument(skip_all, fields(stage = STAGE_COLLECTIONS))]
pub async fn run<F: PageFetcher>(
    session: &mut CrawlSession<F>,
    config: &Config,
    paths: &StagePaths,
) -> Result<StageReport> {
    let mut report = StageReport::start(Stage::Collections);
    let base_url = config.crawl.base_url.as_str();
    let max_collections = config.limits.max_collections;
    let mut writer: BatchWriter<CollectionRecord> =
        BatchWriter::new(&paths.output, config.crawl.batch_size, STAGE_COLLECTIONS);

    let last = checkpoint::load(&paths.checkpoint)?;
    if last.as_deref() == Some(COMPLETED) {
        report.finish(true);
        return Ok(report);
    }

    // Rows from earlier runs count toward the cap
    let mut discovered = table::count_rows(&paths.output)?;
    if discovered >= max_collections {
        info!("Already have {} collections (limit {})", discovered, max_collections);
        complete(&mut writer, &paths.checkpoint, &mut report)?;
        return Ok(report);
    }

    let mut current = match last {
        None => Some(config.crawl.start_url.clone()),
        Some(last_page) => {
            // The checkpointed page is fetched only to find where to continue
            info!("Resuming after completed page {}", last_page);
            report.units_skipped += 1;
            match session.fetch_page(&last_page, None).await {
                Ok(html) => parse_listing_page(&html, &last_page, base_url).next_page,
                Err(e) => {
                    error!("Cannot resume after {}: {}", last_page, e);
                    report.units_failed += 1;
                    report.finish(false);
                    return Ok(report);
                }
            }
        }
    };

    let mut last_completed: Option<String> = None;
    while let Some(page_url) = current.take() {
        info!("Processing page URL: {}", page_url);
        let html = match session.fetch_page(&page_url, None).await {
            Ok(html) => html,
            Err(e) => {
                error!("Error processing {}: {}", page_url, e);
                report.units_failed += 1;
                commit(&mut writer, &paths.checkpoint, last_completed.as_deref())?;
                report.records_written = writer.total_written();
                report.finish(false);
                return Ok(report);
            }
        };

        let page = parse_listing_page(&html, &page_url, base_url);
        info!("Found {} collections on the page", page.collections.len());
        for record in page.collections {
            writer.push(record);
            discovered += 1;
            if discovered >= max_collections {
                info!("Reached max_collections limit ({}). Stopping.", max_collections);
                complete(&mut writer, &paths.checkpoint, &mut report)?;
                report.units_processed += 1;
                return Ok(report);
            }
        }

        report.units_processed += 1;
        info!("Completed page URL: {}", page_url);
        last_completed = Some(page_url);
        if writer.len() >= config.crawl.batch_size {
            commit(&mut writer, &paths.checkpoint, last_completed.as_deref())?;
        }
        current = page.next_page;
    }

    complete(&mut writer, &paths.checkpoint, &mut report)?;
    info!("Collection listing completed: {} pages", report.units_processed);
    Ok(report)
}
