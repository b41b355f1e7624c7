use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;

use crate::Result;

/// Source of raw page HTML. Fails on network errors and non-success statuses.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// `Fetch` backed by a `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    /// Requests a page and returns a `Result<String>` containing the HTML.
    async fn fetch(&self, url: &str) -> Result<String> {
        tracing::debug!(url, "requesting page");
        let res = self.client.get(url).send().await?.error_for_status()?;
        let html = res.text().await?;
        Ok(html)
    }
}
