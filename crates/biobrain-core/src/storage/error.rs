use thiserror::Error;

/// Failure at the store boundary. Every backend I/O error ends up here.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Store not initialized: {0}")]
    NotInitialized(String),

    #[error("Migration error at version {version}: {message}")]
    Migration { version: u32, message: String },

    #[error("Invalid value {value:?} in column '{column}' of row {row}")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("Missing value in column '{column}' of row {row}")]
    MissingValue { row: usize, column: &'static str },

    #[error("Invalid worksheet name: {0:?}")]
    InvalidWorksheet(String),

    #[error("Store connection is unusable after a panic")]
    Poisoned,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Worksheet error: {0}")]
    Sheet(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;
