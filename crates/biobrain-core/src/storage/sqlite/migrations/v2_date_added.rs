use rusqlite::Connection;

use super::Migration;
use crate::storage::error::StoreResult;
use crate::storage::sqlite::schema::has_column;

pub struct V2DateAdded;

impl Migration for V2DateAdded {
    fn version(&self) -> u32 {
        2
    }

    fn description(&self) -> &'static str {
        "Add date_added column to papers table"
    }

    fn up(&self, conn: &Connection) -> StoreResult<()> {
        if !has_column(conn, "papers", "date_added")? {
            conn.execute_batch(
                "
                ALTER TABLE papers ADD COLUMN date_added TEXT;
                CREATE INDEX IF NOT EXISTS idx_papers_date_added ON papers(date_added);
                ",
            )?;
        }
        Ok(())
    }
}
