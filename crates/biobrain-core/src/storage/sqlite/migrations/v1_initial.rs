use rusqlite::Connection;

use super::Migration;
use crate::storage::error::StoreResult;
use crate::storage::sqlite::schema;

pub struct V1Initial;

impl Migration for V1Initial {
    fn version(&self) -> u32 {
        1
    }

    fn description(&self) -> &'static str {
        "Initial papers table"
    }

    fn up(&self, conn: &Connection) -> StoreResult<()> {
        schema::create_papers_table(conn)
    }
}
