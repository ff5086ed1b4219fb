mod connection;
mod migrations;
mod repository;
mod schema;

pub use connection::ConnectionPool;
pub use migrations::{get_applied_versions, run_migrations, Migration};
pub use repository::SqlitePaperRepository;
pub use schema::SCHEMA_VERSION;

use std::path::Path;

use crate::models::{now_minute, Paper, PaperRecord, RecordId};

use super::error::StoreResult;
use super::store::PaperStore;

/// Local relational backend.
pub struct SqliteStore {
    pool: ConnectionPool,
}

impl SqliteStore {
    pub fn open(path: &Path) -> StoreResult<Self> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let pool = ConnectionPool::open(path)?;
        Ok(Self { pool })
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        let pool = ConnectionPool::open_in_memory()?;
        Ok(Self { pool })
    }

    pub fn applied_versions(&self) -> StoreResult<Vec<u32>> {
        let conn = self.pool.get_connection()?;
        get_applied_versions(&conn)
    }

    pub fn count(&self) -> StoreResult<usize> {
        let conn = self.pool.get_connection()?;
        SqlitePaperRepository::new(conn).count()
    }
}

impl PaperStore for SqliteStore {
    fn backend(&self) -> &'static str {
        "sqlite"
    }

    fn ensure_initialized(&self) -> StoreResult<()> {
        let conn = self.pool.get_connection()?;
        run_migrations(&conn)
    }

    fn append(&self, paper: &Paper) -> StoreResult<RecordId> {
        let date_added = paper.date_added.unwrap_or_else(now_minute);
        let conn = self.pool.get_connection()?;
        let id = SqlitePaperRepository::new(conn).insert(paper, &date_added)?;
        tracing::debug!(%id, title = %paper.title, "appended paper");
        Ok(id)
    }

    fn read_all(&self) -> StoreResult<Vec<PaperRecord>> {
        let conn = self.pool.get_connection()?;
        SqlitePaperRepository::new(conn).list()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ListOrder;
    use crate::tags::parse_tag_string;
    use rusqlite::Connection;
    use tempfile::TempDir;

    #[test]
    fn test_append_then_list_roundtrip() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_initialized().unwrap();

        let mut paper = Paper::new("Prime editing", 2019);
        paper.author = "Anzalone AV".into();
        paper.tags = parse_tag_string("Gene Therapy, CRISPR");
        paper.limitation = "Delivery".into();

        let id = store.append(&paper).unwrap();
        let records = store.list_all(ListOrder::NewestFirst).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);

        paper.date_added = Some(records[0].date_added);
        assert_eq!(records[0].to_paper(), paper);
    }

    #[test]
    fn test_ensure_initialized_twice_keeps_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_initialized().unwrap();
        store.append(&Paper::new("Kept", 2020)).unwrap();
        store.ensure_initialized().unwrap();
        assert_eq!(store.count().unwrap(), 1);
        assert_eq!(store.applied_versions().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_append_before_init_is_an_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        assert!(store.append(&Paper::new("Nowhere", 2020)).is_err());
    }

    #[test]
    fn test_legacy_database_is_upgraded() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("legacy.db");
        {
            let conn = Connection::open(&path).unwrap();
            conn.execute_batch(
                "CREATE TABLE papers (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    title TEXT, first_author TEXT, year INTEGER, category TEXT,
                    problem_solved TEXT, key_finding TEXT, methodology TEXT, rating INTEGER
                 );
                 INSERT INTO papers (title, first_author, year, category, rating)
                 VALUES ('Old', 'Doe J', '2018', 'AI', NULL);",
            )
            .unwrap();
        }

        let store = SqliteStore::open(&path).unwrap();
        store.ensure_initialized().unwrap();
        store.append(&Paper::new("New", 2025)).unwrap();

        let records = store.list_all(ListOrder::InsertionOrder).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].title, "Old");
        assert_eq!(records[0].year, 2018);
        assert_eq!(records[0].rating, 4);
        assert_eq!(records[0].limitation, "");
        assert_eq!(records[0].date_added, crate::models::legacy_date_added());

        let newest = store.list_all(ListOrder::NewestFirst).unwrap();
        assert_eq!(newest[0].title, "New");
    }

    #[test]
    fn test_corrupt_year_skips_only_that_row() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.ensure_initialized().unwrap();
        store.append(&Paper::new("Good", 2020)).unwrap();
        {
            let conn = store.pool.get_connection().unwrap();
            conn.execute(
                "INSERT INTO papers (title, year) VALUES ('Bad', 'unknown')",
                [],
            )
            .unwrap();
            conn.execute("INSERT INTO papers (title, year) VALUES ('Huge', 1e20)", [])
                .unwrap();
        }
        store.append(&Paper::new("Also good", 2021)).unwrap();

        let titles: Vec<String> = store
            .list_all(ListOrder::InsertionOrder)
            .unwrap()
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(titles, vec!["Good", "Also good"]);
        assert_eq!(store.count().unwrap(), 4);
    }
}
