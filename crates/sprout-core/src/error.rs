use thiserror::Error;

#[derive(Debug, Error)]
pub enum SproutError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Classification failed: {0}")]
    Classification(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SproutError {
    /// Short, stable error code for callers rendering a response.
    pub fn code(&self) -> &'static str {
        match self {
            SproutError::Config(_) => "CONFIG_ERROR",
            SproutError::Classification(_) => "CLASSIFICATION_ERROR",
            SproutError::Serialization(_) => "SERIALIZATION_ERROR",
            SproutError::Io(_) => "IO_ERROR",
        }
    }
}

pub type Result<T> = std::result::Result<T, SproutError>;
