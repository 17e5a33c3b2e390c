use super::{joined_texts, next_page_href};
use crate::normalizer::absolute_url;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static TAG: Lazy<Selector> = Lazy::new(|| Selector::parse("ul.tags li").unwrap());
static ENTRY: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("ul.js-list-entries li.posteritem div.react-component[data-item-link]").unwrap()
});

/// One page of a collection: its tags and the items it lists
#[derive(Debug, Default)]
pub struct CollectionPage {
    pub tags: Option<String>,
    pub item_urls: Vec<String>,
    pub next_page: Option<String>,
}

pub fn parse_collection_page(html: &str, base_url: &str) -> CollectionPage {
    let document = Html::parse_document(html);
    let root = document.root_element();

    let item_urls = document
        .select(&ENTRY)
        .filter_map(|div| div.value().attr("data-item-link"))
        .filter(|link| !link.trim().is_empty())
        .map(|link| absolute_url(base_url, link))
        .collect();

    CollectionPage {
        tags: joined_texts(root, &TAG, ","),
        item_urls,
        next_page: next_page_href(&document).map(|href| absolute_url(base_url, &href)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_collection_page() {
        let html = r#"
            <ul class="tags"><li><a>horror</a></li><li><a>a24</a></li><li> </li></ul>
            <ul class="js-list-entries">
              <li class="posteritem"><div class="react-component" data-item-link="/film/hereditary/"></div></li>
              <li class="posteritem"><div class="react-component"></div></li>
              <li class="posteritem"><div class="react-component" data-item-link="/film/midsommar/"></div></li>
            </ul>"#;
        let page = parse_collection_page(html, "https://letterboxd.com");
        assert_eq!(page.tags.as_deref(), Some("horror,a24"));
        assert_eq!(
            page.item_urls,
            vec![
                "https://letterboxd.com/film/hereditary/".to_string(),
                "https://letterboxd.com/film/midsommar/".to_string(),
            ]
        );
        assert!(page.next_page.is_none());
    }
}
