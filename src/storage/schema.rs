//! Database schema definitions

use rusqlite::Connection;

/// Initializes the database schema
///
/// Creates all tables and indexes if they don't already exist.
pub fn initialize_schema(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS analyses (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            url TEXT NOT NULL,
            domain TEXT NOT NULL,
            scraper_type TEXT NOT NULL,
            status TEXT NOT NULL,
            overall_score INTEGER,
            error_message TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS page_scores (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            analysis_id INTEGER NOT NULL REFERENCES analyses(id),
            url TEXT NOT NULL,
            score INTEGER NOT NULL,
            scores_breakdown TEXT NOT NULL,
            raw_content TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_page_scores_analysis_id
            ON page_scores(analysis_id);

        CREATE INDEX IF NOT EXISTS idx_analyses_domain
            ON analyses(domain);

        CREATE INDEX IF NOT EXISTS idx_analyses_status
            ON analyses(status);
    ",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_initializes() {
        let conn = Connection::open_in_memory().unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }

    #[test]
    fn test_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_schema(&conn).unwrap();
        assert!(initialize_schema(&conn).is_ok());
    }
}
