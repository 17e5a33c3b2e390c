use super::{element_text, first_text, next_page_href};
use crate::normalizer::{absolute_url, parse_count, parse_leading_count};
use crate::types::CollectionRecord;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

static SUMMARY_ENTRY: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.list-summary-list div.masthead").unwrap());
static TITLE_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("h2.name a[href]").unwrap());
static OWNER: Lazy<Selector> = Lazy::new(|| Selector::parse("a.owner").unwrap());
static ITEM_COUNT: Lazy<Selector> = Lazy::new(|| Selector::parse("span.value").unwrap());
static LABEL: Lazy<Selector> = Lazy::new(|| Selector::parse("span.label").unwrap());

/// One page of the collection listing
#[derive(Debug, Default)]
pub struct ListingPage {
    pub collections: Vec<CollectionRecord>,
    pub next_page: Option<String>,
}

pub fn parse_listing_page(html: &str, page_url: &str, base_url: &str) -> ListingPage {
    let document = Html::parse_document(html);
    let mut collections = Vec::new();

    for entry in document.select(&SUMMARY_ENTRY) {
        let Some(link) = entry.select(&TITLE_LINK).next() else {
            debug!("Skipping list summary without a title link on {}", page_url);
            continue;
        };
        let Some(href) = link.value().attr("href") else {
            continue;
        };

        // Labels hold likes, then comments when both are shown
        let labels: Vec<Option<u64>> = entry
            .select(&LABEL)
            .map(|label| element_text(label).and_then(|t| parse_count(&t)))
            .collect();
        let (like_count, comment_count) = match labels.as_slice() {
            [likes, comments] => (*likes, *comments),
            [likes] => (*likes, None),
            _ => (None, None),
        };

        collections.push(CollectionRecord {
            page_url: page_url.to_string(),
            collection_url: absolute_url(base_url, href),
            collection_title: element_text(link),
            owner_name: first_text(entry, &OWNER),
            item_count: first_text(entry, &ITEM_COUNT).and_then(|t| parse_leading_count(&t)),
            like_count,
            comment_count,
        });
    }

    ListingPage {
        collections,
        next_page: next_page_href(&document).map(|href| absolute_url(base_url, &href)),
    }
}
