use thiserror::Error;
use uuid::Uuid;

/// Errors raised by the history layer itself.
///
/// Store failures never appear here: they are returned to the caller as the
/// store produced them.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Record type not configured for history: {0}")]
    NotConfigured(String),

    #[error("Malformed history on record {record_id}: {reason}")]
    MalformedHistory { record_id: Uuid, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type HistoryResult<T> = Result<T, HistoryError>;

/// Errors produced by record store implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Duplicate record id: {0}")]
    DuplicateId(Uuid),

    #[error("Record not found: {0}")]
    NotFound(Uuid),

    #[error("Unsupported filter: {0}")]
    UnsupportedFilter(String),

    #[error("Store rejected the operation: {0}")]
    Rejected(String),
}
