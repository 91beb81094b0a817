use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse record set JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Invalid timestamp '{value}', expected format 'yyyy-MM-dd HH:mm': {source}")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    #[error("Invalid time window: end ({end}) must be after start ({start})")]
    InvalidTimeWindow { start: String, end: String },

    #[error("Invalid number of required aircraft: {0} (must be greater than zero)")]
    InvalidRequiredCount(u32),

    #[error("Failed to build internal domain model: {0}")]
    ModelConstructionError(String),
}

pub type Result<T> = std::result::Result<T, Error>;
