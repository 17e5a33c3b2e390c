use super::roles::{
    match_label_contains, match_label_exact, RoleTable, RELEASES_TAB, RELEASE_LABELS, ROLE_TABLES,
};
use super::{element_text, first_text, joined_texts, next_sibling_matching};
use crate::normalizer::{
    imdb_id, is_imdb_title, is_tmdb_movie, parse_count, parse_decimal, parse_duration,
    parse_rating_bucket, tmdb_id,
};
use crate::types::ItemDetail;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, warn};

static DETAILS: Lazy<Selector> = Lazy::new(|| Selector::parse("div.col-17 div.details").unwrap());
static HEADLINE: Lazy<Selector> = Lazy::new(|| Selector::parse("h1.headline-1").unwrap());
static RELEASE_YEAR: Lazy<Selector> = Lazy::new(|| Selector::parse("span.releasedate").unwrap());
static CREATORS: Lazy<Selector> = Lazy::new(|| Selector::parse("span.creatorlist").unwrap());
static FOOTER: Lazy<Selector> = Lazy::new(|| Selector::parse("p.text-link.text-footer").unwrap());
static LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());
static TABBED_CONTENT: Lazy<Selector> = Lazy::new(|| Selector::parse("div#tabbed-content").unwrap());
static CAST_SLUG: Lazy<Selector> = Lazy::new(|| Selector::parse("div#tab-cast a.text-slug").unwrap());
static H3: Lazy<Selector> = Lazy::new(|| Selector::parse("h3").unwrap());
static SLUGLIST: Lazy<Selector> = Lazy::new(|| Selector::parse("div.text-sluglist").unwrap());
static NAME_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a").unwrap());
static RELEASE_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.release-table.-bydate").unwrap());
static LIST_ITEM: Lazy<Selector> = Lazy::new(|| Selector::parse("div.listitem").unwrap());
static RELEASE_DATE: Lazy<Selector> = Lazy::new(|| Selector::parse("h5.date").unwrap());
static STATISTIC: Lazy<Selector> = Lazy::new(|| Selector::parse("div.production-statistic").unwrap());
static LABEL: Lazy<Selector> = Lazy::new(|| Selector::parse("span.label").unwrap());
static AVERAGE_RATING: Lazy<Selector> = Lazy::new(|| Selector::parse("span.average-rating").unwrap());
static FANS_LINK: Lazy<Selector> = Lazy::new(|| Selector::parse("a.all-link.more-link").unwrap());
static HISTOGRAM_BAR: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("div.rating-histogram li.rating-histogram-bar a.bar").unwrap()
});

/// Build an `ItemDetail` from a detail page; absent sections leave fields unset.
pub fn parse_detail_page(html: &str, item_url: &str) -> ItemDetail {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let mut detail = ItemDetail::new(item_url);

    extract_identity(root, &mut detail);
    extract_external_ids(root, &mut detail);

    let info = document.select(&TABBED_CONTENT).next();
    match info {
        None => warn!("No tabbed-content found for {}", item_url),
        Some(section) => {
            extract_cast(section, &mut detail);
            for table in &ROLE_TABLES {
                extract_roles(section, table, &mut detail);
            }
            if !extract_release_dates(section, &mut detail) {
                warn!("No releases tab found for {}", item_url);
            }
        }
    }

    extract_ratings(root, &mut detail);
    extract_statistics(root, &mut detail);
    detail
}

/// Title, release year and director from the page header.
pub fn extract_identity(root: ElementRef, detail: &mut ItemDetail) {
    let Some(details) = root.select(&DETAILS).next() else {
        return;
    };
    detail.title = first_text(details, &HEADLINE);
    detail.release_year = first_text(details, &RELEASE_YEAR);
    detail.director = first_text(details, &CREATORS);
}

/// Duration plus IMDB/TMDB links from the footer paragraph.
pub fn extract_external_ids(root: ElementRef, detail: &mut ItemDetail) {
    let Some(footer) = root.select(&FOOTER).next() else {
        return;
    };
    if let Some(text) = element_text(footer) {
        detail.duration = parse_duration(&text);
    }

    for link in footer.select(&LINK) {
        let Some(href) = link.value().attr("href") else {
            continue;
        };
        if is_imdb_title(href) && detail.imdb.is_none() {
            detail.imdb = Some(href.to_string());
            detail.imdb_id = imdb_id(href);
        } else if is_tmdb_movie(href) && detail.tmdb.is_none() {
            detail.tmdb = Some(href.to_string());
            detail.tmdb_id = tmdb_id(href);
        }
    }
}

pub fn extract_cast(section: ElementRef, detail: &mut ItemDetail) {
    let names: Vec<String> = section
        .select(&CAST_SLUG)
        .filter(|a| a.value().id() != Some("has-cast-overflow"))
        .filter_map(element_text)
        .filter(|name| !name.to_lowercase().starts_with("show all"))
        .collect();
    if !names.is_empty() {
        detail.actors = Some(names.join(", "));
    }
}

/// Fill the fields named by `table` from the headings of its tab.
pub fn extract_roles(section: ElementRef, table: &RoleTable, detail: &mut ItemDetail) {
    let Some(tab) = find_tab(section, table.tab_id) else {
        debug!("Tab #{} not present", table.tab_id);
        return;
    };
    let Ok(heading_selector) = Selector::parse(table.heading) else {
        return;
    };

    for h3 in tab.select(&H3) {
        let Some(heading) = h3.select(&heading_selector).next().and_then(element_text) else {
            continue;
        };
        let Some(field) = match_label_contains(&heading, table.labels) else {
            continue;
        };
        let slot = detail.text_field_mut(field);
        if slot.is_some() {
            continue;
        }
        if let Some(list) = next_sibling_matching(h3, &SLUGLIST) {
            *slot = joined_texts(list, &NAME_LINK, ", ");
        }
    }
}

/// Returns false when the releases tab is missing.
pub fn extract_release_dates(section: ElementRef, detail: &mut ItemDetail) -> bool {
    let Some(tab) = find_tab(section, RELEASES_TAB) else {
        return false;
    };

    for h3 in tab.select(&H3) {
        let Some(heading) = element_text(h3) else {
            continue;
        };
        let Some(field) = match_label_exact(&heading, RELEASE_LABELS) else {
            continue;
        };
        let slot = detail.text_field_mut(field);
        if slot.is_some() {
            continue;
        }
        *slot = next_sibling_matching(h3, &RELEASE_TABLE)
            .and_then(|table| table.select(&LIST_ITEM).next())
            .and_then(|item| first_text(item, &RELEASE_DATE));
    }
    true
}

/// Watched / listed / liked counters, selected by class suffix.
pub fn extract_statistics(root: ElementRef, detail: &mut ItemDetail) {
    for stat in root.select(&STATISTIC) {
        let value = first_text(stat, &LABEL).and_then(|t| parse_count(&t));
        let mut classes = stat.value().classes();
        let slot = match classes.find(|c| matches!(*c, "-watches" | "-lists" | "-likes")) {
            Some("-watches") => &mut detail.watched_by,
            Some("-lists") => &mut detail.listed_by,
            Some("-likes") => &mut detail.liked_by,
            _ => continue,
        };
        *slot = value;
    }
}

/// Average rating, fan count and the ten-bucket histogram.
pub fn extract_ratings(root: ElementRef, detail: &mut ItemDetail) {
    detail.rating = first_text(root, &AVERAGE_RATING).and_then(|t| parse_decimal(&t));

    detail.fans_count = root
        .select(&FANS_LINK)
        .filter_map(element_text)
        .find(|text| text.to_lowercase().contains("fan"))
        .and_then(|text| {
            let count = text.to_lowercase().replace("fans", "").replace("fan", "");
            parse_count(&count)
        });

    for bar in root.select(&HISTOGRAM_BAR) {
        let tooltip = bar
            .value()
            .attr("data-original-title")
            .or_else(|| bar.value().attr("title"));
        let Some((bucket, count)) = tooltip.and_then(parse_rating_bucket) else {
            continue;
        };
        *detail.bucket_mut(bucket) = Some(count);
    }
}

fn find_tab<'a>(section: ElementRef<'a>, tab_id: &str) -> Option<ElementRef<'a>> {
    let selector = Selector::parse(&format!("div#{tab_id}")).ok()?;
    section.select(&selector).next()
}
