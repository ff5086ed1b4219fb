use thiserror::Error;

use crate::storage::StoreError;

/// All errors that can occur in biobrain-core.
#[derive(Debug, Error)]
pub enum BioBrainError {
    #[error("Could not read text from PDF: {0}")]
    Extraction(String),

    #[error("AI response error: {0}")]
    AiResponse(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Config error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

/// Exit codes used by the CLI.
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    GeneralError = 1,
    InvalidArgs = 3,
    StoreError = 4,
    AiError = 5,
    NetworkError = 6,
}

pub type Result<T> = std::result::Result<T, BioBrainError>;
