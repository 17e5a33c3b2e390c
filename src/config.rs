use crate::constants::{
    CONFIG_ENV_VAR, DEFAULT_ACCEPT_LANGUAGE, DEFAULT_BASE_URL, DEFAULT_CONFIG_PATH,
    DEFAULT_START_URL, DEFAULT_USER_AGENT, STAGE_COLLECTIONS, STAGE_DETAILS, STAGE_ITEMS,
};
use crate::error::{Result, ScraperError};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawl: CrawlConfig,
    pub limits: LimitsConfig,
    pub paths: PathsConfig,
}

/// Fetching, retry and pacing knobs shared by every stage
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub base_url: String,
    pub start_url: String,
    pub user_agent: String,
    pub accept_language: String,
    pub timeout_seconds: u64,
    pub max_retries: u32,
    pub backoff_min_ms: u64,
    pub backoff_max_ms: u64,
    pub page_delay_ms: u64,
    pub page_jitter_ms: u64,
    /// Rotate the HTTP session every N fetched pages; 0 disables rotation
    pub rotate_every: u64,
    pub batch_size: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            start_url: DEFAULT_START_URL.to_string(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            backoff_min_ms: 3_000,
            backoff_max_ms: 6_000,
            page_delay_ms: 1_000,
            page_jitter_ms: 0,
            rotate_every: 50,
            batch_size: 100,
        }
    }
}

impl CrawlConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    pub max_collections: usize,
    pub max_items_per_collection: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_collections: 500,
            max_items_per_collection: 1_000,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub collections_csv: PathBuf,
    pub item_refs_csv: PathBuf,
    pub item_details_csv: PathBuf,
    pub merged_csv: PathBuf,
    pub checkpoint_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            collections_csv: PathBuf::from("output/collections.csv"),
            item_refs_csv: PathBuf::from("output/item_refs.csv"),
            item_details_csv: PathBuf::from("output/item_details.csv"),
            merged_csv: PathBuf::from("output/merged.csv"),
            checkpoint_dir: PathBuf::from("checkpoints"),
        }
    }
}

/// The `(input, output, checkpoint)` triple a stage is invoked with
#[derive(Debug, Clone)]
pub struct StagePaths {
    pub input: Option<PathBuf>,
    pub output: PathBuf,
    pub checkpoint: PathBuf,
}

impl PathsConfig {
    pub fn checkpoint_for(&self, stage: &str) -> PathBuf {
        self.checkpoint_dir.join(format!("{stage}.checkpoint"))
    }

    pub fn stage(&self, stage: &str) -> Result<StagePaths> {
        let (input, output) = match stage {
            STAGE_COLLECTIONS => (None, self.collections_csv.clone()),
            STAGE_ITEMS => (Some(self.collections_csv.clone()), self.item_refs_csv.clone()),
            STAGE_DETAILS => (Some(self.item_refs_csv.clone()), self.item_details_csv.clone()),
            other => return Err(ScraperError::Config(format!("Unknown stage '{other}'"))),
        };
        Ok(StagePaths {
            input,
            output,
            checkpoint: self.checkpoint_for(stage),
        })
    }
}

impl Config {
    /// Load from `$LIST_SCRAPER_CONFIG`, else `config.toml`; a missing default file yields defaults.
    pub fn load() -> Result<Self> {
        match std::env::var(CONFIG_ENV_VAR) {
            Ok(path) if !path.trim().is_empty() => Self::load_from(path.trim()),
            _ => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load_from(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ScraperError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.crawl.max_retries == 0 {
            return Err(ScraperError::Config("crawl.max_retries must be at least 1".into()));
        }
        if self.crawl.batch_size == 0 {
            return Err(ScraperError::Config("crawl.batch_size must be at least 1".into()));
        }
        if self.crawl.backoff_min_ms > self.crawl.backoff_max_ms {
            return Err(ScraperError::Config(
                "crawl.backoff_min_ms must not exceed crawl.backoff_max_ms".into(),
            ));
        }
        Ok(())
    }
}
