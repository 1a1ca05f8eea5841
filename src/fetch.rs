use std::time::Duration;

use anyhow::Result;
use tracing::{debug, warn};

use crate::config::Settings;
use crate::error::ScrapeError;

/// Page source for the crawler. `None` means the page could not be had;
/// callers carry on without it.
#[allow(async_fn_in_trait)]
pub trait Fetch {
    async fn fetch(&self, url: &str) -> Option<String>;
}

/// Plain HTTP GET with a fixed user agent and a per-request timeout.
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(settings.user_agent.clone())
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;
        Ok(HttpFetcher { client })
    }

    async fn get(&self, url: &str) -> Result<String, ScrapeError> {
        let failure = |reason: String| ScrapeError::FetchFailure {
            url: url.to_string(),
            reason,
        };

        let resp = self.client.get(url).send().await.map_err(|e| {
            failure(if e.is_timeout() { "timed out".to_string() } else { e.to_string() })
        })?;

        let status = resp.status();
        if status.as_u16() >= 400 {
            return Err(failure(format!("HTTP {}", status.as_u16())));
        }
        resp.text().await.map_err(|e| failure(e.to_string()))
    }
}

impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        match self.get(url).await {
            Ok(body) => {
                debug!(url, bytes = body.len(), "Fetched");
                Some(body)
            }
            Err(e) => {
                warn!(error = %e, "Fetch failed");
                None
            }
        }
    }
}
