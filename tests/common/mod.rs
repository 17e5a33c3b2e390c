#![allow(dead_code)]

use async_trait::async_trait;
use list_scraper::app::ports::PageFetcher;
use list_scraper::config::Config;
use list_scraper::error::{Result, ScraperError};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const BASE: &str = "https://lists.test";

/// In-memory site: serves registered pages, fails listed URLs, records every request
#[derive(Clone, Default)]
pub struct FakeSite {
    pages: Arc<Mutex<HashMap<String, String>>>,
    failing: Arc<Mutex<HashSet<String>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self, path: &str, html: String) -> &Self {
        self.pages.lock().unwrap().insert(url(path), html);
        self
    }

    pub fn fail(&self, path: &str) -> &Self {
        self.failing.lock().unwrap().insert(url(path));
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    pub fn requests_for(&self, path: &str) -> usize {
        let target = url(path);
        self.requests().iter().filter(|u| **u == target).count()
    }
}

#[async_trait]
impl PageFetcher for FakeSite {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.failing.lock().unwrap().contains(url) {
            return Err(ScraperError::Fetch {
                url: url.to_string(),
                message: "HTTP 503 Service Unavailable".to_string(),
            });
        }
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| ScraperError::Fetch {
                url: url.to_string(),
                message: "HTTP 404 Not Found".to_string(),
            })
    }
}

pub fn url(path: &str) -> String {
    format!("{BASE}{path}")
}

/// Config rooted in `dir` with no pauses and small batches
pub fn test_config(dir: &Path) -> Config {
    let mut config = Config::default();
    config.crawl.base_url = BASE.to_string();
    config.crawl.start_url = url("/lists/");
    config.crawl.backoff_min_ms = 0;
    config.crawl.backoff_max_ms = 0;
    config.crawl.page_delay_ms = 0;
    config.crawl.rotate_every = 0;
    config.crawl.batch_size = 2;
    config.paths.collections_csv = dir.join("out/collections.csv");
    config.paths.item_refs_csv = dir.join("out/item_refs.csv");
    config.paths.item_details_csv = dir.join("out/item_details.csv");
    config.paths.merged_csv = dir.join("out/merged.csv");
    config.paths.checkpoint_dir = dir.join("checkpoints");
    config
}

fn next_link(next: Option<&str>) -> String {
    next.map(|href| format!(r#"<a class="next" href="{href}">Older</a>"#))
        .unwrap_or_default()
}

/// Listing page with `(slug, item_count)` collections
pub fn listing_page(collections: &[(&str, u32)], next: Option<&str>) -> String {
    let entries: String = collections
        .iter()
        .map(|(slug, count)| {
            format!(
                r#"<div class="masthead">
                     <h2 class="name"><a href="/owner/list/{slug}/">List {slug}</a></h2>
                     <a class="owner" href="/owner/">Owner</a>
                     <span class="value">{count}&nbsp;films</span>
                     <span class="label">1.2K</span>
                     <span class="label">3</span>
                   </div>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="list-summary-list">{entries}</div>{}</body></html>"#,
        next_link(next)
    )
}

/// Collection page listing `/film/<slug>/` items
pub fn collection_page(items: &[&str], next: Option<&str>) -> String {
    let entries: String = items
        .iter()
        .map(|slug| {
            format!(
                r#"<li class="posteritem"><div class="react-component" data-item-link="/film/{slug}/"></div></li>"#
            )
        })
        .collect();
    format!(
        r#"<html><body><ul class="tags"><li><a>drama</a></li></ul>
           <ul class="js-list-entries">{entries}</ul>{}</body></html>"#,
        next_link(next)
    )
}

pub fn detail_page(title: &str, year: u32) -> String {
    format!(
        r#"<html><body><div id="content">
             <div class="col-17"><div class="details">
               <h1 class="headline-1">{title}</h1>
               <span class="releasedate"><a>{year}</a></span>
             </div></div>
           </div></body></html>"#
    )
}

pub fn collection_path(slug: &str) -> String {
    format!("/owner/list/{slug}/")
}

pub fn item_path(slug: &str) -> String {
    format!("/film/{slug}/")
}
