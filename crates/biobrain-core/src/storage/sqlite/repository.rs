use std::sync::MutexGuard;

use chrono::NaiveDateTime;
use rusqlite::types::Value;
use rusqlite::{params, Connection};

use crate::models::{format_date, Paper, PaperRecord, RecordId};
use crate::storage::error::StoreResult;
use crate::storage::row::{
    decode_or_skip, RawRow, COL_CATEGORY, COL_DATE_ADDED, COL_FIRST_AUTHOR, COL_KEY_FINDING,
    COL_LIMITATION, COL_METHODOLOGY, COL_PROBLEM_SOLVED, COL_RATING, COL_TITLE, COL_YEAR,
};

/// Column order of the SELECT in [`SqlitePaperRepository::list`], after `id`.
const SELECT_COLUMNS: [&str; 10] = [
    COL_DATE_ADDED,
    COL_TITLE,
    COL_FIRST_AUTHOR,
    COL_YEAR,
    COL_CATEGORY,
    COL_PROBLEM_SOLVED,
    COL_KEY_FINDING,
    COL_METHODOLOGY,
    COL_LIMITATION,
    COL_RATING,
];

pub struct SqlitePaperRepository<'a> {
    conn: MutexGuard<'a, Connection>,
}

impl<'a> SqlitePaperRepository<'a> {
    pub fn new(conn: MutexGuard<'a, Connection>) -> Self {
        Self { conn }
    }

    pub fn insert(&self, paper: &Paper, date_added: &NaiveDateTime) -> StoreResult<RecordId> {
        self.conn.execute(
            "INSERT INTO papers
                (date_added, title, first_author, year, category, problem_solved,
                 key_finding, methodology, limitation, rating)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                format_date(date_added),
                paper.title,
                paper.author,
                paper.year,
                paper.tags.serialize(),
                paper.problem_solved,
                paper.key_finding,
                paper.methodology,
                paper.limitation,
                paper.rating,
            ],
        )?;
        Ok(RecordId(self.conn.last_insert_rowid()))
    }

    /// All rows in insertion order.
    pub fn list(&self) -> StoreResult<Vec<PaperRecord>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, date_added, title, first_author, year, category, problem_solved,
                    key_finding, methodology, limitation, rating
             FROM papers ORDER BY id",
        )?;

        let rows = stmt
            .query_map([], |row| {
                let id: i64 = row.get(0)?;
                let mut raw = RawRow::new();
                for (i, column) in SELECT_COLUMNS.iter().enumerate() {
                    if let Some(text) = value_to_text(row.get(i + 1)?) {
                        raw.set(column, text);
                    }
                }
                Ok((id, raw))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(rows
            .iter()
            .enumerate()
            .filter_map(|(i, (id, raw))| decode_or_skip(i + 1, RecordId(*id), raw))
            .collect())
    }

    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 = self.conn.query_row("SELECT COUNT(*) FROM papers", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// SQLite is dynamically typed; older versions may have stored years as
/// text or reals. Everything goes through the same text coercion.
fn value_to_text(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Integer(n) => Some(n.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Text(s) => Some(s),
        Value::Blob(b) => Some(String::from_utf8_lossy(&b).to_string()),
    }
}
