use crate::app::ports::PageFetcher;
use crate::config::CrawlConfig;
use crate::error::{Result, ScraperError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use std::time::Duration;
use tracing::{debug, info};

/// Cookie-keeping reqwest session with browser-like headers
pub struct ReqwestFetcher {
    client: reqwest::Client,
    user_agent: String,
    accept_language: String,
}

impl ReqwestFetcher {
    pub fn new(config: &CrawlConfig) -> Result<Self> {
        let client = build_client(&config.user_agent, &config.accept_language)?;
        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
            accept_language: config.accept_language.clone(),
        })
    }
}

fn build_client(user_agent: &str, accept_language: &str) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_str(user_agent)
            .map_err(|e| ScraperError::Config(format!("Invalid user agent: {e}")))?,
    );
    headers.insert(
        ACCEPT_LANGUAGE,
        HeaderValue::from_str(accept_language)
            .map_err(|e| ScraperError::Config(format!("Invalid accept-language: {e}")))?,
    );
    let client = reqwest::Client::builder()
        .default_headers(headers)
        .cookie_store(true)
        .gzip(true)
        .build()?;
    Ok(client)
}

#[async_trait]
impl PageFetcher for ReqwestFetcher {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        debug!("HTTP GET request to: {}", url);
        let resp = self.client.get(url).timeout(timeout).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ScraperError::Fetch {
                url: url.to_string(),
                message: format!("status {}", status.as_u16()),
            });
        }
        let body = resp.text().await?;
        debug!("HTTP response: status={}, size={} bytes", status.as_u16(), body.len());
        Ok(body)
    }

    fn rotate(&mut self) -> Result<()> {
        self.client = build_client(&self.user_agent, &self.accept_language)?;
        info!("Rotated HTTP session");
        Ok(())
    }
}
