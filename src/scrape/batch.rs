//! Bounded-concurrency batch scraping
//!
//! Runs a list of scrape calls in chunks: every fetch inside a chunk is
//! polled concurrently, chunks run one after another, so peak outbound
//! connections never exceed the configured limit. Individual failures
//! are logged and dropped; partial crawl success is an expected outcome,
//! not an error.

use crate::scrape::{ScrapeBackend, ScrapedPage};
use futures::future::join_all;
use url::Url;

/// Default number of concurrent fetches within one batch
pub const DEFAULT_CONCURRENCY: usize = 3;

/// Scrapes a set of URLs with bounded concurrency
///
/// # Arguments
///
/// * `backend` - The scrape backend serving every fetch
/// * `urls` - URLs to fetch
/// * `concurrency` - Maximum in-flight fetches (values below 1 are
///   treated as 1)
///
/// # Returns
///
/// Only the successful, non-empty results, in settle order; failed
/// fetches are excluded and never retried
pub async fn run_batch<B: ScrapeBackend + ?Sized>(
    backend: &B,
    urls: &[Url],
    concurrency: usize,
) -> Vec<ScrapedPage> {
    let chunk_size = concurrency.max(1);
    let mut results = Vec::with_capacity(urls.len());

    for chunk in urls.chunks(chunk_size) {
        let fetches = chunk.iter().map(|url| backend.fetch(url));

        for (url, outcome) in chunk.iter().zip(join_all(fetches).await) {
            match outcome {
                Ok(page) if !page.html.is_empty() => results.push(page),
                Ok(_) => {
                    tracing::warn!("Dropping {} from batch: empty HTML", url);
                }
                Err(e) => {
                    tracing::warn!("Dropping {} from batch: {}", url, e);
                }
            }
        }
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::{ScrapeError, ScrapeResult};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Backend that fails URLs containing "fail" and records peak
    /// concurrent fetches
    struct ScriptedBackend {
        in_flight: AtomicUsize,
        peak: Mutex<usize>,
    }

    impl ScriptedBackend {
        fn new() -> Self {
            Self {
                in_flight: AtomicUsize::new(0),
                peak: Mutex::new(0),
            }
        }

        fn peak(&self) -> usize {
            *self.peak.lock().unwrap()
        }
    }

    #[async_trait]
    impl ScrapeBackend for ScriptedBackend {
        async fn fetch(&self, url: &Url) -> ScrapeResult {
            let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            {
                let mut peak = self.peak.lock().unwrap();
                if current > *peak {
                    *peak = current;
                }
            }

            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if url.path().contains("fail") {
                return Err(ScrapeError::Status(500));
            }

            Ok(ScrapedPage {
                url: url.clone(),
                html: format!("<html><body>{}</body></html>", url.path()),
                title: String::new(),
            })
        }
    }

    fn urls(paths: &[&str]) -> Vec<Url> {
        paths
            .iter()
            .map(|p| Url::parse(&format!("https://example.com{}", p)).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_failed_fetches_are_dropped() {
        let backend = ScriptedBackend::new();
        let urls = urls(&["/a", "/b", "/fail", "/c", "/d"]);

        let results = run_batch(&backend, &urls, 3).await;

        assert_eq!(results.len(), 4);
        assert!(results.iter().all(|p| !p.url.path().contains("fail")));
    }

    #[tokio::test]
    async fn test_concurrency_is_bounded() {
        let backend = ScriptedBackend::new();
        let urls = urls(&["/1", "/2", "/3", "/4", "/5", "/6", "/7"]);

        let results = run_batch(&backend, &urls, 3).await;

        assert_eq!(results.len(), 7);
        assert!(
            backend.peak() <= 3,
            "peak concurrency {} exceeded limit",
            backend.peak()
        );
    }

    #[tokio::test]
    async fn test_empty_input_yields_empty_output() {
        let backend = ScriptedBackend::new();
        let results = run_batch(&backend, &[], 3).await;
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_zero_concurrency_treated_as_one() {
        let backend = ScriptedBackend::new();
        let urls = urls(&["/x", "/y"]);

        let results = run_batch(&backend, &urls, 0).await;

        assert_eq!(results.len(), 2);
        assert_eq!(backend.peak(), 1);
    }

    #[tokio::test]
    async fn test_all_failures_yield_empty_output() {
        let backend = ScriptedBackend::new();
        let urls = urls(&["/fail-1", "/fail-2"]);

        let results = run_batch(&backend, &urls, 3).await;
        assert!(results.is_empty());
    }
}
