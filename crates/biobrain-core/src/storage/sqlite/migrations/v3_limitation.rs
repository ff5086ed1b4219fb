use rusqlite::Connection;

use super::Migration;
use crate::storage::error::StoreResult;
use crate::storage::sqlite::schema::has_column;

pub struct V3Limitation;

impl Migration for V3Limitation {
    fn version(&self) -> u32 {
        3
    }

    fn description(&self) -> &'static str {
        "Add limitation column to papers table"
    }

    fn up(&self, conn: &Connection) -> StoreResult<()> {
        if !has_column(conn, "papers", "limitation")? {
            conn.execute_batch("ALTER TABLE papers ADD COLUMN limitation TEXT;")?;
        }
        Ok(())
    }
}
