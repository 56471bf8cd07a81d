use crate::config::ScraperConfig;
use crate::error::FetchError;
use anyhow::{Context, Result};
use std::time::Duration;
use tracing::debug;

pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .gzip(true)
            // Accept cookies so session-based pages work
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self { inner })
    }

    /// GET a URL as text. One attempt; a non-2xx status is an error.
    pub async fn get_text(&self, url: &str, page: u32) -> Result<String, FetchError> {
        debug!("GET {}", url);

        let resp = self
            .inner
            .get(url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { page, source })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status { page, status: status.as_u16() });
        }

        resp.text()
            .await
            .map_err(|source| FetchError::Transport { page, source })
    }
}
