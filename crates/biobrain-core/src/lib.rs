pub mod config;
pub mod error;
pub mod models;
pub mod storage;
pub mod tags;

pub use config::{AppConfig, StoreBackend};
pub use error::{BioBrainError, Result};
pub use models::*;

pub use tags::{merge, parse_tag_string, serialize, split_preset_and_custom, TagSet, TagsField};

pub use storage::{
    distinct_tags, filter_by_tag, open_store, CsvSheetConnection, ListOrder, PaperStore,
    SheetConnection, SheetStore, SqliteStore, StoreError, StoreResult,
};
