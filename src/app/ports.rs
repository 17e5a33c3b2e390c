use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Capability that turns a URL into page HTML.
///
/// Implementations do not retry; `CrawlSession` owns the retry policy.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String>;

    /// Drop the current connection/session state and start a fresh one.
    fn rotate(&mut self) -> Result<()> {
        Ok(())
    }
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Box<T> {
    async fn fetch(&self, url: &str, timeout: Duration) -> Result<String> {
        (**self).fetch(url, timeout).await
    }

    fn rotate(&mut self) -> Result<()> {
        (**self).rotate()
    }
}
