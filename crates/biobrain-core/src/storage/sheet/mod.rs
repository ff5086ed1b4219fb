//! Spreadsheet-style backend.
//!
//! A worksheet is read and written as a whole table, the way a hosted
//! spreadsheet connection exposes it. Appending is read, add one row,
//! overwrite: concurrent writers from different processes are
//! last-write-wins and can lose each other's rows.

mod csv_sheet;
mod table;

pub use csv_sheet::CsvSheetConnection;
pub use table::SheetTable;

use crate::models::{now_minute, Paper, PaperRecord, RecordId};

use super::error::StoreResult;
use super::row::{decode_or_skip, encode_paper, COLUMNS, COL_AUTHOR, COL_FIRST_AUTHOR};
use super::store::PaperStore;

/// Whole-table access to named worksheets.
pub trait SheetConnection {
    /// Creates the worksheet with the given header row. Returns `false` when
    /// it already exists, which is not an error.
    fn create(&self, worksheet: &str, headers: &[&str]) -> StoreResult<bool>;

    fn read(&self, worksheet: &str) -> StoreResult<SheetTable>;

    /// Replaces the worksheet's contents.
    fn update(&self, worksheet: &str, table: &SheetTable) -> StoreResult<()>;
}

pub struct SheetStore<C: SheetConnection> {
    conn: C,
    worksheet: String,
}

impl<C: SheetConnection> SheetStore<C> {
    pub fn new(conn: C, worksheet: impl Into<String>) -> Self {
        Self {
            conn,
            worksheet: worksheet.into(),
        }
    }

    pub fn connection(&self) -> &C {
        &self.conn
    }
}

impl<C: SheetConnection> PaperStore for SheetStore<C> {
    fn backend(&self) -> &'static str {
        "sheet"
    }

    fn ensure_initialized(&self) -> StoreResult<()> {
        if self.conn.create(&self.worksheet, &COLUMNS)? {
            tracing::info!(worksheet = %self.worksheet, "created worksheet");
        }
        Ok(())
    }

    fn append(&self, paper: &Paper) -> StoreResult<RecordId> {
        let date_added = paper.date_added.unwrap_or_else(now_minute);
        let existing = self.conn.read(&self.worksheet)?;

        // An empty sheet gets a fresh canonical header instead of a merge.
        let mut table = if existing.is_empty() {
            SheetTable::with_headers(&COLUMNS)
        } else {
            existing
        };

        let author_column = if table.column(COL_AUTHOR).is_none()
            && table.column(COL_FIRST_AUTHOR).is_some()
        {
            COL_FIRST_AUTHOR
        } else {
            COL_AUTHOR
        };

        let values = encode_paper(paper, &date_added).map(|(column, value)| {
            if column == COL_AUTHOR {
                (author_column, value)
            } else {
                (column, value)
            }
        });
        table.push_row(values);
        self.conn.update(&self.worksheet, &table)?;

        let id = RecordId(table.len() as i64);
        tracing::debug!(%id, worksheet = %self.worksheet, title = %paper.title, "appended paper");
        Ok(id)
    }

    fn read_all(&self) -> StoreResult<Vec<PaperRecord>> {
        let table = self.conn.read(&self.worksheet)?;
        Ok((0..table.len())
            .filter_map(|i| decode_or_skip(i + 1, RecordId(i as i64 + 1), &table.raw_row(i)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::ListOrder;
    use crate::tags::parse_tag_string;
    use std::cell::RefCell;
    use std::collections::HashMap;

    /// In-memory worksheets, counting writes.
    #[derive(Default)]
    struct MemorySheets {
        sheets: RefCell<HashMap<String, SheetTable>>,
        updates: RefCell<usize>,
    }

    impl SheetConnection for MemorySheets {
        fn create(&self, worksheet: &str, headers: &[&str]) -> StoreResult<bool> {
            let mut sheets = self.sheets.borrow_mut();
            if sheets.contains_key(worksheet) {
                return Ok(false);
            }
            sheets.insert(worksheet.to_string(), SheetTable::with_headers(headers));
            Ok(true)
        }

        fn read(&self, worksheet: &str) -> StoreResult<SheetTable> {
            self.sheets
                .borrow()
                .get(worksheet)
                .cloned()
                .ok_or_else(|| crate::storage::StoreError::NotInitialized(worksheet.to_string()))
        }

        fn update(&self, worksheet: &str, table: &SheetTable) -> StoreResult<()> {
            *self.updates.borrow_mut() += 1;
            self.sheets
                .borrow_mut()
                .insert(worksheet.to_string(), table.clone());
            Ok(())
        }
    }

    #[test]
    fn test_first_append_to_empty_sheet() {
        let store = SheetStore::new(MemorySheets::default(), "Sheet1");
        store.ensure_initialized().unwrap();

        let mut paper = Paper::new("Base editing", 2021);
        paper.tags = parse_tag_string("Gene Therapy");
        let id = store.append(&paper).unwrap();
        assert_eq!(id, RecordId(1));

        let records = store.list_all(ListOrder::NewestFirst).unwrap();
        assert_eq!(records.len(), 1);
        paper.date_added = Some(records[0].date_added);
        assert_eq!(records[0].to_paper(), paper);
        assert_eq!(*store.connection().updates.borrow(), 1);
    }

    #[test]
    fn test_append_preserves_legacy_columns() {
        let conn = MemorySheets::default();
        let mut legacy = SheetTable::with_headers(&["title", "first_author", "year", "category", "notes"]);
        legacy.rows.push(vec![
            "Old".into(),
            "Doe J".into(),
            "2018.0".into(),
            "AI".into(),
            "keep me".into(),
        ]);
        conn.sheets.borrow_mut().insert("Sheet1".into(), legacy);

        let store = SheetStore::new(conn, "Sheet1");
        store.ensure_initialized().unwrap();

        let mut paper = Paper::new("New", 2025);
        paper.author = "Roe R".into();
        assert_eq!(store.append(&paper).unwrap(), RecordId(2));

        let table = store.connection().read("Sheet1").unwrap();
        assert!(table.column("author").is_none());
        let notes = table.column("notes").unwrap();
        assert_eq!(table.rows[0][notes], "keep me");

        let records = store.read_all().unwrap();
        assert_eq!(records[0].author, "Doe J");
        assert_eq!(records[0].year, 2018);
        assert_eq!(records[0].date_added, crate::models::legacy_date_added());
        assert_eq!(records[1].author, "Roe R");
    }

    #[test]
    fn test_blank_year_cell_skips_only_that_row() {
        let store = SheetStore::new(MemorySheets::default(), "Sheet1");
        store.ensure_initialized().unwrap();
        store.append(&Paper::new("Damaged", 2020)).unwrap();
        store.append(&Paper::new("Intact", 2021)).unwrap();
        {
            let mut sheets = store.connection().sheets.borrow_mut();
            let table = sheets.get_mut("Sheet1").unwrap();
            let year = table.column("year").unwrap();
            table.rows[0][year] = String::new();
        }

        let records = store.list_all(ListOrder::NewestFirst).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].title, "Intact");
        assert_eq!(records[0].id, RecordId(2));

        // the damaged row stays in the sheet
        assert_eq!(store.append(&Paper::new("Later", 2022)).unwrap(), RecordId(3));
        assert_eq!(store.connection().read("Sheet1").unwrap().len(), 3);
    }

    #[test]
    fn test_append_without_worksheet_fails() {
        let store = SheetStore::new(MemorySheets::default(), "Sheet1");
        assert!(store.append(&Paper::new("Lost", 2020)).is_err());
        assert_eq!(*store.connection().updates.borrow(), 0);
    }
}
