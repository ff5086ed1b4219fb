use thiserror::Error;

#[derive(Debug, Error)]
pub enum AiError {
    #[error("PDF extraction error: {0}")]
    Extraction(String),

    #[error("AI response error: {0}")]
    Response(String),

    #[error("API key not set: environment variable {0} is empty")]
    MissingApiKey(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl From<AiError> for biobrain_core::BioBrainError {
    fn from(err: AiError) -> Self {
        match err {
            AiError::Extraction(msg) => Self::Extraction(msg),
            other => Self::AiResponse(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, AiError>;
