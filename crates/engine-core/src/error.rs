use connectors::error::{ApiError, DbError};
use thiserror::Error;

/// A page could not be fetched.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Search API request failed: {0}")]
    Api(#[from] ApiError),

    #[error("Fetch retries exhausted after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: usize, last_error: String },

    #[error("Fetch failed: {0}")]
    Other(String),
}

/// A record could not be written to the store.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("Database error: {0}")]
    Db(#[from] DbError),

    #[error("Sink is closed")]
    Closed,

    #[error("Sink error: {0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum StateStoreError {
    #[error("Checkpoint I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to encode checkpoint: {0}")]
    Encode(String),

    #[error("Stored checkpoint is unreadable: {0}")]
    Corrupt(String),

    #[error("Sled error: {0}")]
    Sled(#[from] sled::Error),
}

#[derive(Error, Debug)]
pub enum ProgressError {
    #[error("Failed to read checkpoint: {0}")]
    State(#[from] StateStoreError),
}
