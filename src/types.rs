use serde::{Deserialize, Serialize};

/// One discovered collection (a curated list) from the listing pages
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CollectionRecord {
    pub page_url: String,
    pub collection_url: String,
    pub collection_title: Option<String>,
    pub owner_name: Option<String>,
    pub item_count: Option<u64>,
    pub like_count: Option<u64>,
    pub comment_count: Option<u64>,
}

/// Membership edge between a collection and one of its items
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemRef {
    pub collection_url: String,
    pub item_url: String,
    pub tags: Option<String>,
}

/// Everything extracted from an item's detail page.
///
/// Field order is the CSV column order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ItemDetail {
    pub item_url: String,
    pub title: Option<String>,
    pub release_year: Option<String>,
    pub watched_by: Option<u64>,
    pub listed_by: Option<u64>,
    pub liked_by: Option<u64>,
    pub tmdb: Option<String>,
    pub imdb: Option<String>,
    pub imdb_id: Option<String>,
    pub tmdb_id: Option<String>,
    pub rating: Option<f64>,
    pub duration: Option<u32>,
    pub actors: Option<String>,
    pub director: Option<String>,
    pub writer: Option<String>,
    pub editor: Option<String>,
    pub cinematography: Option<String>,
    pub producer: Option<String>,
    pub composer: Option<String>,
    pub studio: Option<String>,
    pub country: Option<String>,
    pub primary_language: Option<String>,
    pub genres: Option<String>,
    pub themes: Option<String>,
    pub first_theatrical_release: Option<String>,
    pub ott_release: Option<String>,
    pub half_stars: Option<u64>,
    pub one_stars: Option<u64>,
    pub one_and_half_stars: Option<u64>,
    pub two_stars: Option<u64>,
    pub two_and_half_stars: Option<u64>,
    pub three_stars: Option<u64>,
    pub three_and_half_stars: Option<u64>,
    pub four_stars: Option<u64>,
    pub four_and_half_stars: Option<u64>,
    pub five_stars: Option<u64>,
    pub fans_count: Option<u64>,
}

impl ItemDetail {
    pub fn new(item_url: impl Into<String>) -> Self {
        Self {
            item_url: item_url.into(),
            ..Default::default()
        }
    }

    /// Text-valued fields addressable from the declarative role tables
    pub fn text_field_mut(&mut self, field: TextField) -> &mut Option<String> {
        match field {
            TextField::Writer => &mut self.writer,
            TextField::Editor => &mut self.editor,
            TextField::Cinematography => &mut self.cinematography,
            TextField::Producer => &mut self.producer,
            TextField::Composer => &mut self.composer,
            TextField::Studio => &mut self.studio,
            TextField::Country => &mut self.country,
            TextField::PrimaryLanguage => &mut self.primary_language,
            TextField::Genres => &mut self.genres,
            TextField::Themes => &mut self.themes,
            TextField::FirstTheatricalRelease => &mut self.first_theatrical_release,
            TextField::OttRelease => &mut self.ott_release,
        }
    }

    pub fn bucket_mut(&mut self, bucket: RatingBucket) -> &mut Option<u64> {
        match bucket {
            RatingBucket::HalfStar => &mut self.half_stars,
            RatingBucket::OneStar => &mut self.one_stars,
            RatingBucket::OneAndHalfStars => &mut self.one_and_half_stars,
            RatingBucket::TwoStars => &mut self.two_stars,
            RatingBucket::TwoAndHalfStars => &mut self.two_and_half_stars,
            RatingBucket::ThreeStars => &mut self.three_stars,
            RatingBucket::ThreeAndHalfStars => &mut self.three_and_half_stars,
            RatingBucket::FourStars => &mut self.four_stars,
            RatingBucket::FourAndHalfStars => &mut self.four_and_half_stars,
            RatingBucket::FiveStars => &mut self.five_stars,
        }
    }

    pub fn bucket(&self, bucket: RatingBucket) -> Option<u64> {
        match bucket {
            RatingBucket::HalfStar => self.half_stars,
            RatingBucket::OneStar => self.one_stars,
            RatingBucket::OneAndHalfStars => self.one_and_half_stars,
            RatingBucket::TwoStars => self.two_stars,
            RatingBucket::TwoAndHalfStars => self.two_and_half_stars,
            RatingBucket::ThreeStars => self.three_stars,
            RatingBucket::ThreeAndHalfStars => self.three_and_half_stars,
            RatingBucket::FourStars => self.four_stars,
            RatingBucket::FourAndHalfStars => self.four_and_half_stars,
            RatingBucket::FiveStars => self.five_stars,
        }
    }
}

/// Output fields filled from labelled blocks of a detail page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Writer,
    Editor,
    Cinematography,
    Producer,
    Composer,
    Studio,
    Country,
    PrimaryLanguage,
    Genres,
    Themes,
    FirstTheatricalRelease,
    OttRelease,
}

/// The ten half-star steps of a rating histogram
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RatingBucket {
    HalfStar,
    OneStar,
    OneAndHalfStars,
    TwoStars,
    TwoAndHalfStars,
    ThreeStars,
    ThreeAndHalfStars,
    FourStars,
    FourAndHalfStars,
    FiveStars,
}

impl RatingBucket {
    pub const ALL: [RatingBucket; 10] = [
        RatingBucket::HalfStar,
        RatingBucket::OneStar,
        RatingBucket::OneAndHalfStars,
        RatingBucket::TwoStars,
        RatingBucket::TwoAndHalfStars,
        RatingBucket::ThreeStars,
        RatingBucket::ThreeAndHalfStars,
        RatingBucket::FourStars,
        RatingBucket::FourAndHalfStars,
        RatingBucket::FiveStars,
    ];

    /// Star run as rendered in histogram tooltips
    pub fn symbols(self) -> &'static str {
        match self {
            RatingBucket::HalfStar => "½",
            RatingBucket::OneStar => "★",
            RatingBucket::OneAndHalfStars => "★½",
            RatingBucket::TwoStars => "★★",
            RatingBucket::TwoAndHalfStars => "★★½",
            RatingBucket::ThreeStars => "★★★",
            RatingBucket::ThreeAndHalfStars => "★★★½",
            RatingBucket::FourStars => "★★★★",
            RatingBucket::FourAndHalfStars => "★★★★½",
            RatingBucket::FiveStars => "★★★★★",
        }
    }

    pub fn from_symbols(symbols: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.symbols() == symbols)
    }
}
