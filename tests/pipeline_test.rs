mod common;

use anyhow::Result;
use common::*;
use list_scraper::constants::{COLLECTION_URL_COLUMN, ITEM_URL_COLUMN};
use list_scraper::pipeline::table::{self, Table};
use list_scraper::pipeline::{batch_writer, checkpoint, run_pipeline, run_stage, Stage};
use list_scraper::types::ItemDetail;
use std::fs;
use tempfile::tempdir;

/// Two listing pages, three collections; `c` never answers
fn build_site() -> FakeSite {
    let site = FakeSite::new();
    site.page("/lists/", listing_page(&[("a", 3), ("b", 2)], Some("/lists/page/2/")))
        .page("/lists/page/2/", listing_page(&[("c", 1)], None))
        .page(
            &collection_path("a"),
            collection_page(&["heat", "ronin"], Some("/owner/list/a/page/2/")),
        )
        .page("/owner/list/a/page/2/", collection_page(&["thief"], None))
        .page(&collection_path("b"), collection_page(&["heat", "collateral"], None))
        .fail(&collection_path("c"))
        .page(&item_path("heat"), detail_page("Heat", 1995))
        .page(&item_path("ronin"), detail_page("Ronin", 1998))
        .page(&item_path("thief"), detail_page("Thief", 1981))
        .page(&item_path("collateral"), detail_page("Collateral", 2004));
    site
}

#[tokio::test]
async fn test_full_pipeline_run() -> Result<()> {
    let dir = tempdir()?;
    let config = test_config(dir.path());
    let site = build_site();

    let report = run_pipeline(&config, site.clone()).await?;

    assert_eq!(report.stages.len(), 3);
    assert!(report.stages.iter().all(|s| s.completed));
    assert!(report.halted_at.is_none());

    assert_eq!(table::count_rows(&config.paths.collections_csv)?, 3);
    // the failing collection is skipped without aborting the stage
    assert_eq!(report.stages[1].units_failed, 1);
    assert_eq!(site.requests_for(&collection_path("c")), 3);

    let refs = table::read_column(&config.paths.item_refs_csv, ITEM_URL_COLUMN)?;
    assert_eq!(
        refs,
        vec![
            url(&item_path("heat")),
            url(&item_path("ronin")),
            url(&item_path("thief")),
            url(&item_path("heat")),
            url(&item_path("collateral")),
        ]
    );

    // heat is referenced twice but fetched once
    assert_eq!(site.requests_for(&item_path("heat")), 1);
    assert_eq!(table::count_rows(&config.paths.item_details_csv)?, 4);

    let merge = report.merge.expect("merge should run once all stages complete");
    assert_eq!(merge.rows, 5);
    let merged = Table::load(&config.paths.merged_csv)?;
    let title = merged.column_index("title").unwrap();
    let item_count = merged.column_index("item_count").unwrap();
    let titles: Vec<&str> = merged.rows.iter().map(|r| r[title].as_str()).collect();
    assert_eq!(titles, vec!["Heat", "Ronin", "Thief", "Heat", "Collateral"]);
    assert_eq!(merged.rows[0][item_count], "3");
    assert_eq!(merged.rows[3][item_count], "2");

    for stage in Stage::ALL {
        assert!(checkpoint::is_done(&config.paths.checkpoint_for(stage.name())));
    }
    Ok(())
}

#[tokio::test]
async fn test_rerun_after_completion_fetches_nothing() -> Result<()> {
    let dir = tempdir()?;
    let config = test_config(dir.path());
    let site = build_site();

    run_pipeline(&config, site.clone()).await?;
    let requests = site.requests().len();
    let refs_before = fs::read_to_string(&config.paths.item_refs_csv)?;

    let report = run_pipeline(&config, site.clone()).await?;
    assert_eq!(site.requests().len(), requests);
    assert_eq!(fs::read_to_string(&config.paths.item_refs_csv)?, refs_before);
    assert_eq!(report.merge.map(|m| m.rows), Some(5));
    Ok(())
}

#[tokio::test]
async fn test_failed_first_stage_halts_pipeline() -> Result<()> {
    let dir = tempdir()?;
    let config = test_config(dir.path());
    let site = FakeSite::new();
    site.fail("/lists/");

    let report = run_pipeline(&config, site.clone()).await?;

    assert_eq!(report.halted_at.as_deref(), Some("collections"));
    assert_eq!(report.stages.len(), 1);
    assert!(report.merge.is_none());
    assert!(!config.paths.item_refs_csv.exists());
    assert!(!config.paths.merged_csv.exists());
    assert_eq!(site.requests_for("/lists/"), 3);
    Ok(())
}

#[tokio::test]
async fn test_collections_resume_after_checkpointed_page() -> Result<()> {
    let dir = tempdir()?;
    let config = test_config(dir.path());
    let site = build_site();

    // A previous run flushed page one and checkpointed it
    fs::create_dir_all(dir.path().join("out"))?;
    fs::write(
        &config.paths.collections_csv,
        format!(
            "page_url,collection_url,collection_title,owner_name,item_count,like_count,comment_count\n\
             {0},{1},List a,Owner,3,1200,3\n{0},{2},List b,Owner,2,1200,3\n",
            url("/lists/"),
            url(&collection_path("a")),
            url(&collection_path("b"))
        ),
    )?;
    checkpoint::mark_completed(&config.paths.checkpoint_for("collections"), &url("/lists/"))?;

    let (_, report) = run_stage(Stage::Collections, site.clone(), &config).await;
    let report = report?;

    assert!(report.completed);
    assert_eq!(report.records_written, 1);
    let collections = table::read_column(&config.paths.collections_csv, COLLECTION_URL_COLUMN)?;
    assert_eq!(
        collections,
        vec![
            url(&collection_path("a")),
            url(&collection_path("b")),
            url(&collection_path("c"))
        ]
    );
    let content = fs::read_to_string(&config.paths.collections_csv)?;
    assert_eq!(content.matches("page_url,collection_url").count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_collection_cap_stops_listing() -> Result<()> {
    let dir = tempdir()?;
    let mut config = test_config(dir.path());
    config.limits.max_collections = 2;
    let site = build_site();

    let (_, report) = run_stage(Stage::Collections, site.clone(), &config).await;

    assert!(report?.completed);
    assert_eq!(table::count_rows(&config.paths.collections_csv)?, 2);
    assert_eq!(site.requests_for("/lists/page/2/"), 0);
    Ok(())
}

#[tokio::test]
async fn test_items_cap_per_collection() -> Result<()> {
    let dir = tempdir()?;
    let mut config = test_config(dir.path());
    config.limits.max_items_per_collection = 2;
    let site = build_site();

    run_stage(Stage::Collections, site.clone(), &config).await.1?;
    let (_, report) = run_stage(Stage::Items, site.clone(), &config).await;
    assert!(report?.completed);

    let owners = table::read_column(&config.paths.item_refs_csv, COLLECTION_URL_COLUMN)?;
    let from_a = owners.iter().filter(|c| **c == url(&collection_path("a"))).count();
    assert_eq!(from_a, 2);
    // the cap is reached on page one, so page two is never requested
    assert_eq!(site.requests_for("/owner/list/a/page/2/"), 0);
    Ok(())
}

#[tokio::test]
async fn test_items_resume_skips_checkpointed_collections() -> Result<()> {
    let dir = tempdir()?;
    let config = test_config(dir.path());
    let site = build_site();

    run_stage(Stage::Collections, site.clone(), &config).await.1?;
    checkpoint::mark_completed(
        &config.paths.checkpoint_for("items"),
        &url(&collection_path("a")),
    )?;

    let (_, report) = run_stage(Stage::Items, site.clone(), &config).await;
    let report = report?;

    assert_eq!(report.units_skipped, 1);
    assert_eq!(site.requests_for(&collection_path("a")), 0);
    assert_eq!(site.requests_for(&collection_path("b")), 1);
    Ok(())
}

#[tokio::test]
async fn test_details_skip_items_already_extracted() -> Result<()> {
    let dir = tempdir()?;
    let config = test_config(dir.path());
    let site = build_site();

    fs::create_dir_all(dir.path().join("out"))?;
    fs::write(
        &config.paths.item_refs_csv,
        format!(
            "collection_url,item_url,tags\n{0},{1},\n{0},{2},\n",
            url(&collection_path("a")),
            url(&item_path("heat")),
            url(&item_path("ronin"))
        ),
    )?;
    // heat made it to disk before the checkpoint did
    let mut heat = ItemDetail::new(url(&item_path("heat")));
    heat.title = Some("Heat".to_string());
    batch_writer::flush(&mut vec![heat], &config.paths.item_details_csv)?;

    let (_, report) = run_stage(Stage::Details, site.clone(), &config).await;
    let report = report?;

    assert!(report.completed);
    assert_eq!(report.units_processed, 1);
    assert_eq!(site.requests_for(&item_path("heat")), 0);
    assert_eq!(site.requests_for(&item_path("ronin")), 1);

    let urls = table::read_column(&config.paths.item_details_csv, ITEM_URL_COLUMN)?;
    assert_eq!(urls, vec![url(&item_path("heat")), url(&item_path("ronin"))]);
    Ok(())
}
