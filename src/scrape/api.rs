//! Third-party scraping API backend
//!
//! Serves the `api` scraper type: each fetch is delegated to a
//! Firecrawl-compatible scraping service authenticated with a
//! caller-supplied bearer credential. Upstream auth and quota failures
//! map to distinct error variants so operators can tell a bad key from
//! an exhausted plan; everything else collapses to a generic upstream
//! error.

use crate::scrape::{ScrapeBackend, ScrapeError, ScrapeResult, ScrapedPage};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use url::Url;

/// Default endpoint of the scraping service
const DEFAULT_ENDPOINT: &str = "https://api.firecrawl.dev/v1/scrape";

/// Scrape backend delegating to an external scraping API
pub struct ApiBackend {
    client: Client,
    endpoint: String,
    api_key: String,
}

/// Upstream response envelope
#[derive(Debug, Deserialize)]
struct ApiResponse {
    data: Option<ApiData>,
}

#[derive(Debug, Deserialize)]
struct ApiData {
    html: Option<String>,
    metadata: Option<ApiMetadata>,
}

#[derive(Debug, Deserialize)]
struct ApiMetadata {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: Option<String>,
}

impl ApiBackend {
    /// Creates a backend against the default endpoint
    pub fn new(api_key: String, request_timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_endpoint(api_key, DEFAULT_ENDPOINT.to_string(), request_timeout)
    }

    /// Creates a backend against a custom endpoint (used by tests)
    pub fn with_endpoint(
        api_key: String,
        endpoint: String,
        request_timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl ScrapeBackend for ApiBackend {
    async fn fetch(&self, url: &Url) -> ScrapeResult {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "url": url.as_str(),
                "formats": ["html"],
                "onlyMainContent": false,
            }))
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ScrapeError::Timeout
                } else {
                    ScrapeError::Request(e.to_string())
                }
            })?;

        let status = response.status().as_u16();
        match status {
            401 => return Err(ScrapeError::InvalidCredential),
            402 | 429 => return Err(ScrapeError::QuotaExceeded),
            s if s >= 400 => {
                let message = response
                    .json::<ApiErrorBody>()
                    .await
                    .ok()
                    .and_then(|body| body.message)
                    .unwrap_or_else(|| "unknown error".to_string());
                return Err(ScrapeError::Upstream { status, message });
            }
            _ => {}
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| ScrapeError::Request(e.to_string()))?;

        let data = body.data.ok_or(ScrapeError::EmptyBody)?;
        let html = data.html.unwrap_or_default();
        if html.is_empty() {
            return Err(ScrapeError::EmptyBody);
        }

        let title = data
            .metadata
            .and_then(|m| m.title)
            .unwrap_or_default();

        Ok(ScrapedPage {
            url: url.clone(),
            html,
            title,
        })
    }
}
