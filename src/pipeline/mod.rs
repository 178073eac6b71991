//! Analysis orchestration
//!
//! Wires the whole flow together: submission (rate limit, URL
//! validation, job creation) and execution (scrape homepage, discover
//! sublinks, batch-scrape, score, persist). Execution runs under a hard
//! wall-clock deadline; whatever the outcome, the job record always ends
//! in a terminal state.

use crate::config::Config;
use crate::limiter::RateLimiter;
use crate::links::discover_sublinks;
use crate::model::{AnalysisStatus, NewPageScore, ScraperType};
use crate::scoring::score_page;
use crate::scrape::{run_batch, ApiBackend, ScrapeBackend, ScrapeError, SessionBackend};
use crate::storage::{Datastore, StorageError};
use crate::url::{validate_url, ValidationError};
use crate::GeoError;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// Message persisted when the homepage cannot be fetched
const HOMEPAGE_FAILURE_MESSAGE: &str = "Failed to scrape homepage";

/// Message persisted when the deadline elapses
const DEADLINE_FAILURE_MESSAGE: &str = "Analysis timed out";

/// Message persisted for any other internal failure
const INTERNAL_FAILURE_MESSAGE: &str = "Analysis failed unexpectedly";

/// A request to start a new analysis
#[derive(Debug, Clone)]
pub struct SubmitRequest {
    /// Target URL as entered by the caller
    pub url: String,

    /// Requested backend; the configured default applies when absent
    pub scraper_type: Option<ScraperType>,

    /// API credential, required when the `api` backend is selected
    pub credential: Option<String>,

    /// Identity the rate limiter buckets this caller under
    pub client_key: String,
}

/// Errors surfaced to the caller at submission time
#[derive(Debug, Error)]
pub enum SubmitError {
    #[error("Rate limit exceeded, retry in {retry_after_seconds}s")]
    RateLimited { retry_after_seconds: u64 },

    #[error("URL validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("The api scraper requires an API key")]
    MissingCredential,

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// The analysis pipeline
///
/// Generic over the storage backend so tests can run against an
/// in-memory database.
pub struct Pipeline<S: Datastore> {
    storage: Arc<Mutex<S>>,
    limiter: RateLimiter,
    config: Config,
}

impl<S: Datastore> Pipeline<S> {
    pub fn new(storage: Arc<Mutex<S>>, config: Config) -> Self {
        let limiter = RateLimiter::from_config(&config.limits);
        Self {
            storage,
            limiter,
            config,
        }
    }

    fn with_storage<R>(&self, f: impl FnOnce(&mut S) -> R) -> R {
        let mut guard = self.storage.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut guard)
    }

    /// The backend used when the caller does not request one
    fn default_scraper_type(&self) -> ScraperType {
        ScraperType::from_db_string(&self.config.scraper.backend)
            .unwrap_or(ScraperType::Headless)
    }

    /// Accepts a new analysis request
    ///
    /// Checks the rate limit, validates the URL (including its resolved
    /// addresses), and creates the job in the `pending` state.
    ///
    /// # Returns
    ///
    /// The ID of the created analysis
    pub async fn submit(&self, request: &SubmitRequest) -> Result<i64, SubmitError> {
        let decision = self.limiter.check(&request.client_key);
        if !decision.allowed {
            return Err(SubmitError::RateLimited {
                retry_after_seconds: decision.retry_after_seconds,
            });
        }

        let validated = validate_url(&request.url).await?;
        let scraper_type = request
            .scraper_type
            .unwrap_or_else(|| self.default_scraper_type());

        if scraper_type == ScraperType::Api && request.credential.is_none() {
            return Err(SubmitError::MissingCredential);
        }

        let domain = validated.host_str().unwrap_or_default().to_string();
        let id = self.with_storage(|s| {
            s.create_analysis(validated.as_str(), &domain, scraper_type)
        })?;

        tracing::info!(
            "Accepted analysis {} for {} via {} scraper",
            id,
            validated,
            scraper_type
        );
        Ok(id)
    }

    /// Runs a pending analysis to a terminal state
    ///
    /// Builds the backend the job was submitted with, then delegates to
    /// [`run_with_backend`](Self::run_with_backend).
    pub async fn run(
        &self,
        analysis_id: i64,
        credential: Option<&str>,
    ) -> crate::Result<AnalysisStatus> {
        let record = self.with_storage(|s| s.get_analysis(analysis_id))?;
        let request_timeout = Duration::from_secs(self.config.scraper.request_timeout_seconds);

        match record.scraper_type {
            ScraperType::Headless => {
                let session = SessionBackend::launch(request_timeout)?;
                let outcome = self.run_with_backend(analysis_id, &session).await;
                session.close().await;
                outcome
            }
            ScraperType::Api => {
                let key = credential.ok_or(GeoError::Scrape {
                    url: record.url.clone(),
                    source: ScrapeError::InvalidCredential,
                })?;
                let backend = ApiBackend::new(key.to_string(), request_timeout)?;
                self.run_with_backend(analysis_id, &backend).await
            }
        }
    }

    /// Runs a pending analysis against an already-built backend
    ///
    /// The job moves to `processing` before the first network call. The
    /// crawl-and-score phase runs under the configured deadline; on
    /// expiry or error the job is marked `failed` with a user-safe
    /// message while diagnostics go to the logs.
    pub async fn run_with_backend<B: ScrapeBackend + ?Sized>(
        &self,
        analysis_id: i64,
        backend: &B,
    ) -> crate::Result<AnalysisStatus> {
        let record = self.with_storage(|s| s.get_analysis(analysis_id))?;
        let url = Url::parse(&record.url)?;

        self.with_storage(|s| s.mark_processing(analysis_id))?;

        let deadline = Duration::from_secs(self.config.analysis.deadline_seconds);
        let outcome =
            tokio::time::timeout(deadline, self.crawl_and_score(backend, analysis_id, &url))
                .await;

        match outcome {
            Ok(Ok(overall_score)) => {
                self.with_storage(|s| s.mark_completed(analysis_id, overall_score))?;
                tracing::info!(
                    "Analysis {} completed with overall score {}",
                    analysis_id,
                    overall_score
                );
                Ok(AnalysisStatus::Completed)
            }
            Ok(Err(e)) => {
                tracing::error!("Analysis {} failed: {}", analysis_id, e);
                let message = match e {
                    GeoError::Scrape { .. } => HOMEPAGE_FAILURE_MESSAGE,
                    _ => INTERNAL_FAILURE_MESSAGE,
                };
                self.with_storage(|s| s.mark_failed(analysis_id, message))?;
                Ok(AnalysisStatus::Failed)
            }
            Err(_) => {
                tracing::error!(
                    "Analysis {} exceeded its {}s deadline",
                    analysis_id,
                    deadline.as_secs()
                );
                self.with_storage(|s| s.mark_failed(analysis_id, DEADLINE_FAILURE_MESSAGE))?;
                Ok(AnalysisStatus::Failed)
            }
        }
    }

    /// Scrapes the homepage and its sublinks, scores every fetched page,
    /// and persists the rows
    ///
    /// # Returns
    ///
    /// The overall score: the rounded mean of the per-page scores
    async fn crawl_and_score<B: ScrapeBackend + ?Sized>(
        &self,
        backend: &B,
        analysis_id: i64,
        url: &Url,
    ) -> crate::Result<u32> {
        let homepage = backend.fetch(url).await.map_err(|e| GeoError::Scrape {
            url: url.to_string(),
            source: e,
        })?;

        // A homepage with no markup cannot be scored; treat it the same
        // as a failed fetch rather than trusting the backend to have
        // rejected it
        if homepage.html.trim().is_empty() {
            return Err(GeoError::Scrape {
                url: url.to_string(),
                source: ScrapeError::EmptyBody,
            });
        }

        // Discover same-origin sublinks from the homepage markup
        let discovered = discover_sublinks(url, &homepage.html);
        let mut sublinks = Vec::new();
        for link in discovered {
            if link == *url || link == homepage.url {
                continue;
            }
            // Re-validate each sublink; markup is attacker-controlled
            match validate_url(link.as_str()).await {
                Ok(valid) => sublinks.push(valid),
                Err(e) => {
                    tracing::warn!("Dropping sublink {}: {}", link, e);
                }
            }
        }

        let batch = run_batch(backend, &sublinks, self.config.analysis.batch_concurrency).await;
        tracing::info!(
            "Analysis {}: scraped {}/{} sublinks",
            analysis_id,
            batch.len(),
            sublinks.len()
        );

        let mut rows = Vec::with_capacity(batch.len() + 1);
        for page in std::iter::once(&homepage).chain(batch.iter()) {
            let result = score_page(&page.html, &page.url);
            rows.push(NewPageScore {
                url: page.url.to_string(),
                score: result.total_score,
                breakdown: result.breakdown,
                raw_content: page.html.clone(),
            });
        }

        let overall = if rows.is_empty() {
            0
        } else {
            let sum: u32 = rows.iter().map(|r| r.score).sum();
            (sum as f64 / rows.len() as f64).round() as u32
        };

        self.with_storage(|s| s.insert_page_scores(analysis_id, &rows))?;

        Ok(overall)
    }
}
