use super::{commit, complete, Stage, StageReport};
use crate::app::ports::PageFetcher;
use crate::config::{Config, StagePaths};
use crate::constants::{COLLECTION_PAGE_MARKER, COLLECTION_URL_COLUMN, COMPLETED, STAGE_ITEMS};
use crate::error::{Result, ScraperError};
use crate::parser::parse_collection_page;
use crate::pipeline::batch_writer::BatchWriter;
use crate::pipeline::crawl::CrawlSession;
use crate::pipeline::{checkpoint, table};
use crate::types::ItemRef;
use tracing::{error, info, instrument};

/// Stage 2: expand every collection into its item references.
///
/// Unit = one collection. A collection whose pages keep failing is logged,
/// checkpointed as processed and skipped.
#[instrument(skip_all, fields(stage = STAGE_ITEMS))]
pub async fn run<F: PageFetcher>(
    session: &mut CrawlSession<F>,
    config: &Config,
    paths: &StagePaths,
) -> Result<StageReport> {
    let mut report = StageReport::start(Stage::Items);
    let last = checkpoint::load(&paths.checkpoint)?;
    if last.as_deref() == Some(COMPLETED) {
        report.finish(true);
        return Ok(report);
    }

    let input = paths
        .input
        .as_deref()
        .ok_or_else(|| ScraperError::Config("items stage has no input file".to_string()))?;
    let units = table::unique_in_order(table::read_column(input, COLLECTION_URL_COLUMN)?);
    info!("Found {} unique collection URLs to process", units.len());

    let start = checkpoint::resume_index(&units, last.as_deref());
    if start > 0 {
        info!("Resuming from collection {} of {}", start + 1, units.len());
    }
    report.units_skipped = start;

    let mut writer: BatchWriter<ItemRef> =
        BatchWriter::new(&paths.output, config.crawl.batch_size, STAGE_ITEMS);

    for (offset, collection_url) in units[start..].iter().enumerate() {
        info!(
            "Processing collection {}/{}: {}",
            start + offset + 1,
            units.len(),
            collection_url
        );
        match crawl_collection(session, config, collection_url, &mut writer).await {
            Ok(count) => {
                info!("Collected {} items from {}", count, collection_url);
                report.units_processed += 1;
            }
            Err(e) => {
                error!("Error processing {}: {}", collection_url, e);
                report.units_failed += 1;
            }
        }
        commit(&mut writer, &paths.checkpoint, Some(collection_url))?;
    }

    complete(&mut writer, &paths.checkpoint, &mut report)?;
    info!("Item listing completed: {} records", report.records_written);
    Ok(report)
}

/// Walk one collection's pages until the last page or the per-collection cap.
async fn crawl_collection<F: PageFetcher>(
    session: &mut CrawlSession<F>,
    config: &Config,
    collection_url: &str,
    writer: &mut BatchWriter<ItemRef>,
) -> Result<usize> {
    let max_items = config.limits.max_items_per_collection;
    let mut count = 0;
    let mut current = Some(collection_url.to_string());

    while let Some(page_url) = current.take() {
        let html = session.fetch_page(&page_url, Some(COLLECTION_PAGE_MARKER)).await?;
        let page = parse_collection_page(&html, &config.crawl.base_url);

        for item_url in page.item_urls {
            let full = writer.push(ItemRef {
                collection_url: collection_url.to_string(),
                item_url,
                tags: page.tags.clone(),
            });
            if full {
                writer.flush()?;
            }
            count += 1;
            if count >= max_items {
                info!("Reached {} items for {}", max_items, collection_url);
                return Ok(count);
            }
        }
        current = page.next_page;
    }
    Ok(count)
}
