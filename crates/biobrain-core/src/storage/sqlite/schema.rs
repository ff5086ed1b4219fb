use rusqlite::Connection;

use crate::storage::error::StoreResult;

pub const SCHEMA_VERSION: u32 = 3;

pub fn apply_pragmas(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        PRAGMA journal_mode = WAL;
        PRAGMA synchronous = NORMAL;
        PRAGMA busy_timeout = 5000;
        ",
    )?;
    Ok(())
}

pub fn create_migrations_table(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS schema_migrations (
            version    INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL
        );
        ",
    )?;
    Ok(())
}

/// The table as the first released version created it: no `date_added`,
/// no `limitation`.
pub fn create_papers_table(conn: &Connection) -> StoreResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS papers (
            id             INTEGER PRIMARY KEY AUTOINCREMENT,
            title          TEXT NOT NULL,
            first_author   TEXT,
            year           INTEGER,
            category       TEXT,
            problem_solved TEXT,
            key_finding    TEXT,
            methodology    TEXT,
            rating         INTEGER DEFAULT 4
        );
        ",
    )?;
    Ok(())
}

pub fn has_column(conn: &Connection, table: &str, column: &str) -> StoreResult<bool> {
    let exists = conn
        .prepare("SELECT 1 FROM pragma_table_info(?1) WHERE name = ?2")?
        .exists(rusqlite::params![table, column])?;
    Ok(exists)
}

/// True for the "table/column already exists" family of SQLite errors.
pub fn is_already_exists(err: &rusqlite::Error) -> bool {
    let message = err.to_string();
    message.contains("already exists") || message.contains("duplicate column name")
}
