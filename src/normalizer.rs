//! Text-to-value conversions for scraped fields.
//!
//! Every function here is total: unparsable input degrades to `None`.

use crate::types::RatingBucket;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

static LEADING_COUNT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d[\d,]*").unwrap());
static STAR_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[★½]+").unwrap());
static DURATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*min").unwrap());
static IMDB_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"tt\d+").unwrap());
static TMDB_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"/movie/(\d+)").unwrap());

/// Collapse whitespace and non-breaking spaces; `None` when nothing is left.
pub fn clean_text(raw: &str) -> Option<String> {
    let replaced = raw.replace("&nbsp;", " ").replace('\u{a0}', " ");
    let joined = replaced.split_whitespace().collect::<Vec<_>>().join(" ");
    if joined.is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// Parse counters such as `"1,234"`, `"12K"` or `"1.5M"`.
pub fn parse_count(text: &str) -> Option<u64> {
    let cleaned: String = text.trim().chars().filter(|c| *c != ',').collect();
    let (number, multiplier) = match cleaned.chars().last()? {
        'K' | 'k' => (&cleaned[..cleaned.len() - 1], 1_000),
        'M' | 'm' => (&cleaned[..cleaned.len() - 1], 1_000_000),
        _ => (cleaned.as_str(), 1),
    };
    scale_decimal(number.trim(), multiplier)
}

// Integer arithmetic keeps "1.2K" at exactly 1200.
fn scale_decimal(number: &str, multiplier: u64) -> Option<u64> {
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }

    let int_value: u64 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };
    let mut total = int_value.checked_mul(multiplier)?;
    if !frac_part.is_empty() {
        let scale = 10u64.checked_pow(frac_part.len() as u32)?;
        let scaled = frac_part.parse::<u64>().ok()?.checked_mul(multiplier)?;
        // round half up without letting `scaled + scale / 2` overflow
        let rounded = scaled / scale + u64::from(scaled % scale >= scale / 2);
        total = total.checked_add(rounded)?;
    }
    Some(total)
}

/// First run of digits (with thousands separators) in `text`, e.g. `"1,234 films"`.
pub fn parse_leading_count(text: &str) -> Option<u64> {
    let found = LEADING_COUNT.find(text)?;
    found.as_str().replace(',', "").parse().ok()
}

/// Histogram tooltip such as `"1,234 ★★★½ ratings (5%)"` into its bucket and count.
pub fn parse_rating_bucket(title: &str) -> Option<(RatingBucket, u64)> {
    let title = title.replace("half-★", "½");
    let count = parse_leading_count(&title)?;
    let stars = STAR_RUN.find(&title)?.as_str();
    match RatingBucket::from_symbols(stars) {
        Some(bucket) => Some((bucket, count)),
        None => {
            warn!("Unknown rating symbol run '{}' in '{}'", stars, title);
            None
        }
    }
}

/// Minutes from text like `"118 mins   More at IMDb TMDb"`.
pub fn parse_duration(text: &str) -> Option<u32> {
    DURATION.captures(text)?.get(1)?.as_str().parse().ok()
}

pub fn parse_decimal(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

pub fn is_imdb_title(href: &str) -> bool {
    href.contains("imdb.com/title/tt")
}

pub fn is_tmdb_movie(href: &str) -> bool {
    href.contains("themoviedb.org/movie/")
}

pub fn imdb_id(href: &str) -> Option<String> {
    IMDB_ID.find(href).map(|m| m.as_str().to_string())
}

pub fn tmdb_id(href: &str) -> Option<String> {
    Some(TMDB_ID.captures(href)?.get(1)?.as_str().to_string())
}

/// Resolve a site-relative href against the configured base URL.
pub fn absolute_url(base_url: &str, href: &str) -> String {
    let href = href.trim();
    if href.starts_with("http://") || href.starts_with("https://") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    } else {
        format!("{}/{}", base_url.trim_end_matches('/'), href)
    }
}
