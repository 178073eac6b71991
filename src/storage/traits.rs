//! Storage traits and error types
//!
//! Defines the trait interface the pipeline persists through, plus the
//! storage error type. The analysis lifecycle is enforced here: status
//! transitions that skip a state or leave a terminal state are rejected.

use crate::model::{
    AnalysisRecord, AnalysisStatus, NewPageScore, PageScoreRecord, RankingsPage, ScraperType,
};
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Analysis not found: {0}")]
    AnalysisNotFound(i64),

    #[error("Invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: AnalysisStatus,
        to: AnalysisStatus,
    },

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for analysis storage backends
///
/// Implementations persist analysis jobs and their per-page scores.
/// Status updates must be guarded: a transition is only applied when the
/// row is currently in the expected predecessor state.
pub trait Datastore {
    /// Creates a new analysis in the `pending` state
    ///
    /// # Arguments
    ///
    /// * `url` - The validated target URL
    /// * `domain` - The host component of the URL
    /// * `scraper_type` - Which backend will serve the analysis
    ///
    /// # Returns
    ///
    /// The ID of the newly created analysis
    fn create_analysis(
        &mut self,
        url: &str,
        domain: &str,
        scraper_type: ScraperType,
    ) -> StorageResult<i64>;

    /// Gets an analysis by ID
    fn get_analysis(&self, analysis_id: i64) -> StorageResult<AnalysisRecord>;

    /// Moves an analysis from `pending` to `processing`
    fn mark_processing(&mut self, analysis_id: i64) -> StorageResult<()>;

    /// Moves an analysis from `processing` to `completed`, recording the
    /// overall score
    fn mark_completed(&mut self, analysis_id: i64, overall_score: u32) -> StorageResult<()>;

    /// Moves an analysis from `processing` to `failed`, recording a
    /// user-safe error message
    fn mark_failed(&mut self, analysis_id: i64, error_message: &str) -> StorageResult<()>;

    /// Inserts all page scores for an analysis in one transaction
    fn insert_page_scores(
        &mut self,
        analysis_id: i64,
        scores: &[NewPageScore],
    ) -> StorageResult<()>;

    /// Gets the page scores of an analysis in insertion order
    fn get_page_scores(&self, analysis_id: i64) -> StorageResult<Vec<PageScoreRecord>>;

    /// Gets one page of the domain rankings
    ///
    /// Each domain appears at most once, represented by its most recent
    /// completed analysis, ordered by score descending.
    fn rankings(&self, page: u32) -> StorageResult<RankingsPage>;
}
