//! HTML field extraction for the three page kinds the pipeline visits.
//!
//! Extractors never fail: a missing node leaves its field as `None`.

pub mod collection_page;
pub mod detail_page;
pub mod listing_page;
pub mod roles;

use crate::normalizer::clean_text;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

pub use collection_page::{parse_collection_page, CollectionPage};
pub use detail_page::parse_detail_page;
pub use listing_page::{parse_listing_page, ListingPage};

static NEXT_PAGE: Lazy<Selector> = Lazy::new(|| Selector::parse("a.next[href]").unwrap());

/// Visible text of an element with whitespace collapsed.
pub fn element_text(element: ElementRef) -> Option<String> {
    clean_text(&element.text().collect::<Vec<_>>().join(" "))
}

/// Text of the first descendant matching `selector`.
pub fn first_text(scope: ElementRef, selector: &Selector) -> Option<String> {
    scope.select(selector).next().and_then(element_text)
}

/// Texts of all descendants matching `selector`, joined by `separator`.
pub fn joined_texts(scope: ElementRef, selector: &Selector, separator: &str) -> Option<String> {
    let names: Vec<String> = scope.select(selector).filter_map(element_text).collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join(separator))
    }
}

/// First following sibling element matching `selector`.
pub fn next_sibling_matching<'a>(element: ElementRef<'a>, selector: &Selector) -> Option<ElementRef<'a>> {
    element
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|sibling| selector.matches(sibling))
}

/// The `href` of the pagination "next" link, when present.
pub fn next_page_href(document: &Html) -> Option<String> {
    document
        .select(&NEXT_PAGE)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(|href| href.trim().to_string())
        .filter(|href| !href.is_empty())
}
