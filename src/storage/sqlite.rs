//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Datastore
//! trait. Status transitions are guarded at the SQL level: each UPDATE
//! carries the expected predecessor status in its WHERE clause, so a
//! late writer racing a deadline cannot overwrite a terminal state.

use crate::model::{
    AnalysisRecord, AnalysisStatus, NewPageScore, PageScoreRecord, RankingRow, RankingsPage,
    ScraperType,
};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Datastore, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

/// Number of domains per rankings page
pub const RANKINGS_PAGE_SIZE: u32 = 50;

/// SQLite storage backend
pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        // Configure SQLite for better performance
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing)
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }

    /// Applies a guarded status transition
    ///
    /// The UPDATE only matches when the row still holds `from`; zero
    /// affected rows means the analysis is missing or in another state.
    fn guarded_transition(
        &mut self,
        analysis_id: i64,
        from: AnalysisStatus,
        to: AnalysisStatus,
        sql: &str,
        extra: &[&dyn rusqlite::ToSql],
    ) -> StorageResult<()> {
        let mut bound: Vec<&dyn rusqlite::ToSql> = extra.to_vec();
        let from_str = from.to_db_string();
        let to_str = to.to_db_string();
        bound.push(&to_str);
        bound.push(&analysis_id);
        bound.push(&from_str);

        let affected = self.conn.execute(sql, bound.as_slice())?;
        if affected == 0 {
            let current = self.get_analysis(analysis_id)?;
            return Err(StorageError::InvalidTransition {
                from: current.status,
                to,
            });
        }
        Ok(())
    }
}

fn map_analysis_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<AnalysisRecord> {
    Ok(AnalysisRecord {
        id: row.get(0)?,
        url: row.get(1)?,
        domain: row.get(2)?,
        scraper_type: ScraperType::from_db_string(&row.get::<_, String>(3)?)
            .unwrap_or(ScraperType::Headless),
        status: AnalysisStatus::from_db_string(&row.get::<_, String>(4)?)
            .unwrap_or(AnalysisStatus::Failed),
        overall_score: row.get(5)?,
        error_message: row.get(6)?,
        created_at: row.get(7)?,
    })
}

impl Datastore for SqliteStorage {
    fn create_analysis(
        &mut self,
        url: &str,
        domain: &str,
        scraper_type: ScraperType,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO analyses (url, domain, scraper_type, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                url,
                domain,
                scraper_type.to_db_string(),
                AnalysisStatus::Pending.to_db_string(),
                now
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_analysis(&self, analysis_id: i64) -> StorageResult<AnalysisRecord> {
        let mut stmt = self.conn.prepare(
            "SELECT id, url, domain, scraper_type, status, overall_score, error_message, created_at
             FROM analyses WHERE id = ?1",
        )?;

        stmt.query_row(params![analysis_id], map_analysis_row)
            .optional()?
            .ok_or(StorageError::AnalysisNotFound(analysis_id))
    }

    fn mark_processing(&mut self, analysis_id: i64) -> StorageResult<()> {
        self.guarded_transition(
            analysis_id,
            AnalysisStatus::Pending,
            AnalysisStatus::Processing,
            "UPDATE analyses SET status = ?1 WHERE id = ?2 AND status = ?3",
            &[],
        )
    }

    fn mark_completed(&mut self, analysis_id: i64, overall_score: u32) -> StorageResult<()> {
        self.guarded_transition(
            analysis_id,
            AnalysisStatus::Processing,
            AnalysisStatus::Completed,
            "UPDATE analyses SET overall_score = ?1, status = ?2 WHERE id = ?3 AND status = ?4",
            &[&overall_score],
        )
    }

    fn mark_failed(&mut self, analysis_id: i64, error_message: &str) -> StorageResult<()> {
        self.guarded_transition(
            analysis_id,
            AnalysisStatus::Processing,
            AnalysisStatus::Failed,
            "UPDATE analyses SET error_message = ?1, status = ?2 WHERE id = ?3 AND status = ?4",
            &[&error_message],
        )
    }

    fn insert_page_scores(
        &mut self,
        analysis_id: i64,
        scores: &[NewPageScore],
    ) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn.transaction()?;

        for score in scores {
            let breakdown = serde_json::to_string(&score.breakdown)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            tx.execute(
                "INSERT INTO page_scores (analysis_id, url, score, scores_breakdown, raw_content, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    analysis_id,
                    score.url,
                    score.score,
                    breakdown,
                    score.raw_content,
                    now
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    fn get_page_scores(&self, analysis_id: i64) -> StorageResult<Vec<PageScoreRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, analysis_id, url, score, scores_breakdown, raw_content, created_at
             FROM page_scores WHERE analysis_id = ?1 ORDER BY id",
        )?;

        let rows = stmt
            .query_map(params![analysis_id], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, u32>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, String>(5)?,
                    row.get::<_, String>(6)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut scores = Vec::with_capacity(rows.len());
        for (id, analysis_id, url, score, breakdown_json, raw_content, created_at) in rows {
            let breakdown = serde_json::from_str(&breakdown_json)
                .map_err(|e| StorageError::Serialization(e.to_string()))?;
            scores.push(PageScoreRecord {
                id,
                analysis_id,
                url,
                score,
                breakdown,
                raw_content,
                created_at,
            });
        }

        Ok(scores)
    }

    fn rankings(&self, page: u32) -> StorageResult<RankingsPage> {
        let page = page.max(1);

        let total_items: u32 = self.conn.query_row(
            "SELECT COUNT(DISTINCT domain) FROM analyses
             WHERE status = ?1 AND overall_score IS NOT NULL",
            params![AnalysisStatus::Completed.to_db_string()],
            |row| row.get(0),
        )?;
        let total_pages = total_items.div_ceil(RANKINGS_PAGE_SIZE);

        let offset = (page - 1) * RANKINGS_PAGE_SIZE;
        let mut stmt = self.conn.prepare(
            "SELECT a.id, a.domain, a.url, a.overall_score, a.created_at
             FROM analyses a
             JOIN (
                 SELECT domain, MAX(id) AS latest_id
                 FROM analyses
                 WHERE status = ?1 AND overall_score IS NOT NULL
                 GROUP BY domain
             ) latest ON a.id = latest.latest_id
             ORDER BY a.overall_score DESC, a.created_at DESC
             LIMIT ?2 OFFSET ?3",
        )?;

        let rows = stmt
            .query_map(
                params![
                    AnalysisStatus::Completed.to_db_string(),
                    RANKINGS_PAGE_SIZE,
                    offset
                ],
                |row| {
                    Ok(RankingRow {
                        id: row.get(0)?,
                        domain: row.get(1)?,
                        url: row.get(2)?,
                        overall_score: row.get(3)?,
                        created_at: row.get(4)?,
                    })
                },
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RankingsPage {
            rows,
            page,
            page_size: RANKINGS_PAGE_SIZE,
            total_pages,
            total_items,
        })
    }
}
