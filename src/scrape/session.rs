//! Session-based scrape backend
//!
//! Serves the `headless` scraper type: one long-lived, browser-emulating
//! HTTP client (cookie store, browser User-Agent, gzip/brotli) is built
//! when the session launches and reused for the homepage and every
//! sublink of an analysis, so per-page setup cost is paid once. The
//! session is exclusively owned by its analysis and released through
//! `close()` when the batch is done.

use crate::scrape::{ScrapeBackend, ScrapeError, ScrapeResult, ScrapedPage, BROWSER_USER_AGENT};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::time::Duration;
use url::Url;

/// One scraping session backed by a shared HTTP client
pub struct SessionBackend {
    client: Client,
}

impl SessionBackend {
    /// Launches a new session
    ///
    /// # Arguments
    ///
    /// * `request_timeout` - Per-request timeout applied to every fetch
    pub fn launch(request_timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(request_timeout)
            .connect_timeout(Duration::from_secs(10))
            .cookie_store(true)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// Releases the session
    ///
    /// Consumes the backend so no further fetches can run against a
    /// closed session.
    pub async fn close(self) {
        drop(self.client);
    }
}

#[async_trait]
impl ScrapeBackend for SessionBackend {
    async fn fetch(&self, url: &Url) -> ScrapeResult {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(classify_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::Status(status.as_u16()));
        }

        let html = response.text().await.map_err(classify_error)?;
        if html.is_empty() {
            return Err(ScrapeError::EmptyBody);
        }

        let title = extract_title(&html);

        Ok(ScrapedPage {
            url: url.clone(),
            html,
            title,
        })
    }
}

/// Maps a reqwest error to the backend's tagged error type
fn classify_error(e: reqwest::Error) -> ScrapeError {
    if e.is_timeout() {
        ScrapeError::Timeout
    } else {
        ScrapeError::Request(e.to_string())
    }
}

/// Extracts the page title, or an empty string when absent
fn extract_title(html: &str) -> String {
    let document = Html::parse_document(html);
    let selector = match Selector::parse("title") {
        Ok(s) => s,
        Err(_) => return String::new(),
    };

    document
        .select(&selector)
        .next()
        .map(|el| el.text().collect::<String>().trim().to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_builds_client() {
        let backend = SessionBackend::launch(Duration::from_secs(30));
        assert!(backend.is_ok());
    }

    #[test]
    fn test_extract_title() {
        let html = "<html><head><title>  Hello World </title></head><body></body></html>";
        assert_eq!(extract_title(html), "Hello World");
    }

    #[test]
    fn test_extract_title_missing() {
        assert_eq!(extract_title("<html><body>no title</body></html>"), "");
    }
}
