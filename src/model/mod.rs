//! Core data model for Geo-Lens
//!
//! Defines the analysis job lifecycle, the scraper selection enum, and
//! the persisted record shapes shared by the pipeline and storage layers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of one analysis job
///
/// Moves forward only: `Pending -> Processing -> {Completed | Failed}`.
/// Both `Completed` and `Failed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnalysisStatus {
    /// Job accepted, pipeline not yet started
    Pending,

    /// Pipeline running; set before any network call
    Processing,

    /// All page scores computed and persisted
    Completed,

    /// Homepage failure, deadline, or unhandled internal error
    Failed,
}

impl AnalysisStatus {
    /// Returns true if no further transition can occur
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Returns true if a transition from `self` to `next` is legal
    pub fn can_transition_to(&self, next: AnalysisStatus) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Processing)
                | (Self::Processing, Self::Completed)
                | (Self::Processing, Self::Failed)
        )
    }

    /// Converts the status to its database string representation
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Parses a status from its database string representation
    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(Self::Pending),
            "processing" => Some(Self::Processing),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

impl fmt::Display for AnalysisStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// Which scrape backend serves an analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScraperType {
    /// Session-based backend: one long-lived client per analysis
    Headless,

    /// Third-party scraping API keyed by a caller-supplied credential
    Api,
}

impl ScraperType {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Headless => "headless",
            Self::Api => "api",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "headless" => Some(Self::Headless),
            "api" => Some(Self::Api),
            _ => None,
        }
    }
}

impl fmt::Display for ScraperType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_string())
    }
}

/// One scored rubric factor with its evidence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeoFactor {
    pub score: u32,
    pub max_score: u32,
    pub label: String,
    pub details: String,
}

/// The ten-factor score breakdown for one page
///
/// Field names serialize in camelCase so the persisted JSON matches the
/// rubric's published key names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreBreakdown {
    pub schema_markup: GeoFactor,
    pub content_structure: GeoFactor,
    pub meta_tags: GeoFactor,
    pub faq_content: GeoFactor,
    #[serde(rename = "authorEEAT")]
    pub author_eeat: GeoFactor,
    pub content_freshness: GeoFactor,
    pub internal_linking: GeoFactor,
    pub image_alt_text: GeoFactor,
    pub ai_crawlability: GeoFactor,
    pub answer_forward_writing: GeoFactor,
}

impl ScoreBreakdown {
    /// All ten factors in rubric order
    pub fn factors(&self) -> [&GeoFactor; 10] {
        [
            &self.schema_markup,
            &self.content_structure,
            &self.meta_tags,
            &self.faq_content,
            &self.author_eeat,
            &self.content_freshness,
            &self.internal_linking,
            &self.image_alt_text,
            &self.ai_crawlability,
            &self.answer_forward_writing,
        ]
    }

    /// Sum of the ten factor scores
    pub fn total(&self) -> u32 {
        self.factors().iter().map(|f| f.score).sum()
    }

    /// Sum of the ten factor maximums; always 100 for a valid breakdown
    pub fn max_total(&self) -> u32 {
        self.factors().iter().map(|f| f.max_score).sum()
    }
}

/// One persisted analysis job
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    pub id: i64,
    pub url: String,
    pub domain: String,
    pub scraper_type: ScraperType,
    pub status: AnalysisStatus,
    /// Written exactly once, at the `completed` transition
    pub overall_score: Option<u32>,
    /// User-safe text only; internal diagnostics stay in the logs
    pub error_message: Option<String>,
    pub created_at: String,
}

/// One persisted page score row
#[derive(Debug, Clone)]
pub struct PageScoreRecord {
    pub id: i64,
    pub analysis_id: i64,
    pub url: String,
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    /// Fetched HTML, retained for later inspection
    pub raw_content: String,
    pub created_at: String,
}

/// A page score ready for insertion (id and timestamp assigned by storage)
#[derive(Debug, Clone)]
pub struct NewPageScore {
    pub url: String,
    pub score: u32,
    pub breakdown: ScoreBreakdown,
    pub raw_content: String,
}

/// One row of the domain rankings listing
#[derive(Debug, Clone)]
pub struct RankingRow {
    pub id: i64,
    pub domain: String,
    pub url: String,
    pub overall_score: u32,
    pub created_at: String,
}

/// A page of rankings plus pagination metadata
#[derive(Debug, Clone)]
pub struct RankingsPage {
    pub rows: Vec<RankingRow>,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
    pub total_items: u32,
}
