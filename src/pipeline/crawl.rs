//! Fetch loop shared by all stages: retry with randomized backoff, pacing
//! between pages and periodic session rotation.

use crate::app::ports::PageFetcher;
use crate::config::CrawlConfig;
use crate::error::{Result, ScraperError};
use metrics::counter;
use rand::Rng;
use std::time::Duration;
use tracing::{error, info, warn};

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff_min: Duration,
    pub backoff_max: Duration,
    pub timeout: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            max_attempts: config.max_retries.max(1),
            backoff_min: Duration::from_millis(config.backoff_min_ms),
            backoff_max: Duration::from_millis(config.backoff_max_ms.max(config.backoff_min_ms)),
            timeout: config.timeout(),
        }
    }

    pub fn backoff(&self) -> Duration {
        jitter(self.backoff_min, self.backoff_max)
    }
}

#[derive(Debug, Clone)]
pub struct Pacing {
    pub delay: Duration,
    pub jitter: Duration,
    pub rotate_every: u64,
}

impl Pacing {
    pub fn from_config(config: &CrawlConfig) -> Self {
        Self {
            delay: Duration::from_millis(config.page_delay_ms),
            jitter: Duration::from_millis(config.page_jitter_ms),
            rotate_every: config.rotate_every,
        }
    }

    fn pause(&self) -> Duration {
        jitter(self.delay, self.delay + self.jitter)
    }
}

fn jitter(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let millis = rand::thread_rng().gen_range(min.as_millis() as u64..=max.as_millis() as u64);
    Duration::from_millis(millis)
}

/// Per-page fetch state
#[derive(Debug)]
enum FetchState {
    Fetching { attempt: u32 },
    Retry { attempt: u32, error: ScraperError },
    Success(String),
    Exhausted { attempts: u32, error: ScraperError },
}

/// One stage's persistent session
pub struct CrawlSession<F: PageFetcher> {
    fetcher: F,
    policy: RetryPolicy,
    pacing: Pacing,
    stage: &'static str,
    pages_fetched: u64,
}

impl<F: PageFetcher> CrawlSession<F> {
    pub fn new(fetcher: F, config: &CrawlConfig, stage: &'static str) -> Self {
        Self {
            fetcher,
            policy: RetryPolicy::from_config(config),
            pacing: Pacing::from_config(config),
            stage,
            pages_fetched: 0,
        }
    }

    pub fn pages_fetched(&self) -> u64 {
        self.pages_fetched
    }

    pub fn into_fetcher(self) -> F {
        self.fetcher
    }

    /// Fetch `url`, retrying transient failures; a page missing `marker` counts
    /// as a transient failure. Returns `ScraperError::Exhausted` once the attempt
    /// budget is spent.
    pub async fn fetch_page(&mut self, url: &str, marker: Option<&str>) -> Result<String> {
        if self.pages_fetched > 0 {
            let pause = self.pacing.pause();
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        let mut state = FetchState::Fetching { attempt: 1 };
        let outcome = loop {
            state = match state {
                FetchState::Fetching { attempt } => {
                    counter!("scrape_pages_requested_total", "stage" => self.stage).increment(1);
                    match self.attempt(url, marker).await {
                        Ok(html) => FetchState::Success(html),
                        Err(error) if !error.is_transient() => break Err(error),
                        Err(error) if attempt >= self.policy.max_attempts => {
                            FetchState::Exhausted { attempts: attempt, error }
                        }
                        Err(error) => FetchState::Retry { attempt, error },
                    }
                }
                FetchState::Retry { attempt, error } => {
                    warn!(
                        "Attempt {}/{} failed for {}: {}",
                        attempt, self.policy.max_attempts, url, error
                    );
                    counter!("scrape_fetch_retries_total", "stage" => self.stage).increment(1);
                    let backoff = self.policy.backoff();
                    if !backoff.is_zero() {
                        tokio::time::sleep(backoff).await;
                    }
                    FetchState::Fetching { attempt: attempt + 1 }
                }
                FetchState::Success(html) => break Ok(html),
                FetchState::Exhausted { attempts, error } => {
                    error!("Skipping page after {} failures: {}", attempts, url);
                    counter!("scrape_pages_exhausted_total", "stage" => self.stage).increment(1);
                    break Err(ScraperError::Exhausted {
                        url: url.to_string(),
                        attempts,
                        last_error: error.to_string(),
                    });
                }
            };
        };

        self.pages_fetched += 1;
        if outcome.is_ok() {
            counter!("scrape_pages_fetched_total", "stage" => self.stage).increment(1);
        }
        self.maybe_rotate();
        outcome
    }

    async fn attempt(&self, url: &str, marker: Option<&str>) -> Result<String> {
        let html = self.fetcher.fetch(url, self.policy.timeout).await?;
        match marker {
            Some(marker) if !html.contains(marker) => Err(ScraperError::IncompletePage {
                url: url.to_string(),
                marker: marker.to_string(),
            }),
            _ => Ok(html),
        }
    }

    fn maybe_rotate(&mut self) {
        let every = self.pacing.rotate_every;
        if every == 0 || self.pages_fetched % every != 0 {
            return;
        }
        match self.fetcher.rotate() {
            Ok(()) => info!("Session rotated after {} pages", self.pages_fetched),
            Err(e) => warn!("Session rotation failed, keeping current session: {}", e),
        }
    }
}
