//! Scrape backends for Geo-Lens
//!
//! Defines the backend capability the pipeline depends on — fetch a URL,
//! get back HTML and a title — plus two conforming implementations:
//! a session backend that amortizes one client across a whole analysis,
//! and a third-party scraping API keyed by a caller credential. Failures
//! never panic past this boundary; everything surfaces as `ScrapeError`.

mod api;
mod batch;
mod session;

pub use api::ApiBackend;
pub use batch::run_batch;
pub use session::SessionBackend;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

/// A successfully scraped page
#[derive(Debug, Clone)]
pub struct ScrapedPage {
    /// The URL that was fetched
    pub url: Url,

    /// Full page HTML
    pub html: String,

    /// Page title as reported by the backend (may be empty)
    pub title: String,
}

/// Tagged failure from a scrape backend
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Request failed: {0}")]
    Request(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Upstream returned HTTP {0}")]
    Status(u16),

    #[error("Invalid scraping API credential")]
    InvalidCredential,

    #[error("Scraping API rate limit or quota exceeded")]
    QuotaExceeded,

    #[error("Upstream scraping API error ({status}): {message}")]
    Upstream { status: u16, message: String },

    #[error("Empty response body")]
    EmptyBody,
}

/// Result type alias for scrape operations
pub type ScrapeResult = std::result::Result<ScrapedPage, ScrapeError>;

/// The capability every scrape backend must satisfy
///
/// `fetch` must not panic; all failure modes map to a `ScrapeError`
/// variant so callers can treat partial batch failure as routine.
#[async_trait]
pub trait ScrapeBackend: Send + Sync {
    async fn fetch(&self, url: &Url) -> ScrapeResult;
}

/// Browser-like User-Agent sent by the session backend; many sites serve
/// stripped-down or blocked pages to obvious bot agents
pub(crate) const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
