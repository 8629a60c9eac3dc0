//! Error types for the extraction subsystem.

use std::time::Duration;

use thiserror::Error;

/// Extraction subsystem error type.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// Invalid configuration or unsupported values.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A rule pattern failed to compile.
    #[error("invalid rule pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// The model reply was not valid JSON and held no JSON array.
    #[error("malformed model output: {0}")]
    MalformedOutput(String),
    /// The model reply was valid JSON but not an array.
    #[error("model output is {0}, expected a JSON array")]
    WrongShape(String),
    /// The text-generation call exceeded its deadline.
    #[error("text generation timed out after {0:?}")]
    Timeout(Duration),
    /// HTTP client error from Rig.
    #[error("http client error: {0}")]
    HttpClient(#[from] rig::http_client::Error),
    /// Completion error.
    #[error("completion error: {0}")]
    Completion(#[from] rig::completion::CompletionError),
    /// A stored note was requested but does not exist.
    #[error("note not found: {0}")]
    NoteNotFound(i64),
    /// Stored data could not be decoded.
    #[error("invalid stored record: {0}")]
    InvalidRecord(String),
    /// `SQLite` storage error (sync).
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// `SQLite` storage error (async).
    #[error("tokio-rusqlite error: {0}")]
    TokioSqlite(#[from] tokio_rusqlite::Error),
    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// URL parse error.
    #[error("url parse error: {0}")]
    Url(#[from] url::ParseError),
    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    /// Whether this error belongs to the model-strategy taxonomy
    /// (malformed output, wrong shape, transport failure).
    ///
    /// These never reach callers of a strategy; they degrade to an empty list.
    #[must_use]
    pub const fn is_strategy_failure(&self) -> bool {
        matches!(
            self,
            Self::MalformedOutput(_)
                | Self::WrongShape(_)
                | Self::Timeout(_)
                | Self::HttpClient(_)
                | Self::Completion(_)
        )
    }
}

/// Convenience result alias for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
