pub mod coerce;
mod error;
pub mod library;
pub mod row;
pub mod sheet;
pub mod sqlite;
mod store;

pub use error::{StoreError, StoreResult};
pub use library::{distinct_tags, filter_by_tag, sort_records, ListOrder};
pub use sheet::{CsvSheetConnection, SheetConnection, SheetStore, SheetTable};
pub use sqlite::SqliteStore;
pub use store::PaperStore;

use crate::config::{AppConfig, StoreBackend};

/// Opens the backend selected in config. Does not initialize it.
pub fn open_store(config: &AppConfig) -> StoreResult<Box<dyn PaperStore>> {
    match config.store.backend {
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::open(&config.database_path())?)),
        StoreBackend::Sheet => Ok(Box::new(SheetStore::new(
            CsvSheetConnection::new(config.sheet_dir()),
            config.store.worksheet.clone(),
        ))),
    }
}
