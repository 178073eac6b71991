//! Geo-Lens: GEO (Generative Engine Optimization) readiness analyzer
//!
//! This crate analyzes a website's readiness for AI-generated search answers.
//! Given a URL it crawls a bounded set of same-origin pages, extracts
//! structural and semantic signals from each page's HTML, and computes a
//! deterministic 0-100 score per page and per site.

pub mod config;
pub mod limiter;
pub mod links;
pub mod model;
pub mod pipeline;
pub mod scoring;
pub mod scrape;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Geo-Lens operations
#[derive(Debug, Error)]
pub enum GeoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] url::ValidationError),

    #[error("Scrape error for {url}: {source}")]
    Scrape {
        url: String,
        source: scrape::ScrapeError,
    },

    #[error("Storage error: {0}")]
    StorageError(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Analysis not found: {0}")]
    AnalysisNotFound(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Result type alias for Geo-Lens operations
pub type Result<T> = std::result::Result<T, GeoError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{AnalysisStatus, GeoFactor, ScoreBreakdown, ScraperType};
pub use pipeline::{Pipeline, SubmitError, SubmitRequest};
pub use scoring::{score_page, PageScore};
pub use url::validate_url;
