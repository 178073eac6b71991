use serde::Deserialize;

/// Main configuration structure for Geo-Lens
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub analysis: AnalysisConfig,
    pub scraper: ScraperConfig,
    pub limits: LimitsConfig,
    pub output: OutputConfig,
}

/// Analysis pipeline behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of scrape calls run concurrently within one batch
    #[serde(rename = "batch-concurrency")]
    pub batch_concurrency: usize,

    /// Hard wall-clock deadline for one analysis, in seconds.
    /// Kept below the typical 60s kill of serverless hosts so the job
    /// record never gets stuck in `processing`.
    #[serde(rename = "deadline-seconds")]
    pub deadline_seconds: u64,
}

/// Scrape backend configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    /// Default backend when the caller does not specify one
    /// ("headless" or "api")
    pub backend: String,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-seconds")]
    pub request_timeout_seconds: u64,
}

/// Submission rate-limit configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum submissions per client key within one window
    #[serde(rename = "max-requests")]
    pub max_requests: usize,

    /// Sliding window length in seconds
    #[serde(rename = "window-seconds")]
    pub window_seconds: u64,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            analysis: AnalysisConfig::default(),
            scraper: ScraperConfig::default(),
            limits: LimitsConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            batch_concurrency: 3,
            deadline_seconds: 55,
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            backend: "headless".to_string(),
            request_timeout_seconds: 30,
        }
    }
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_requests: 5,
            window_seconds: 60,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            database_path: "./geolens.db".to_string(),
        }
    }
}
