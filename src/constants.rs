/// Checkpoint value meaning "this stage needs no further work"
pub const COMPLETED: &str = "COMPLETED";

/// Stage names, used for logging, metrics labels and the CLI
pub const STAGE_COLLECTIONS: &str = "collections";
pub const STAGE_ITEMS: &str = "items";
pub const STAGE_DETAILS: &str = "details";
pub const STAGE_MERGE: &str = "merge";

pub const DEFAULT_BASE_URL: &str = "https://letterboxd.com";
pub const DEFAULT_START_URL: &str = "https://letterboxd.com/lists/popular/this/week/";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Safari/537.36";
pub const DEFAULT_ACCEPT_LANGUAGE: &str = "en-US,en;q=0.9";

// Markers whose absence means the fetched page is incomplete or blocked
pub const COLLECTION_PAGE_MARKER: &str = "js-list-entries";
pub const DETAIL_PAGE_MARKER: &str = "id=\"content\"";

/// Key columns shared between stage outputs
pub const COLLECTION_URL_COLUMN: &str = "collection_url";
pub const ITEM_URL_COLUMN: &str = "item_url";

pub const CONFIG_ENV_VAR: &str = "LIST_SCRAPER_CONFIG";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";
