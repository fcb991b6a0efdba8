use connectors::error::{ApiError, ConnectorError};
use engine_config::error::SettingsError;
use engine_core::error::{SinkError, StateStoreError};
use engine_processing::error::CrawlError;
use thiserror::Error;

/// Top-level errors for wiring and running a crawl.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to open checkpoint store: {0}")]
    StateStore(#[from] StateStoreError),

    #[error("Failed to build search API client: {0}")]
    Api(#[from] ApiError),

    #[error("Database connection failed: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Database setup failed: {0}")]
    Sink(#[from] SinkError),

    #[error("Crawl failed: {0}")]
    Crawl(#[from] CrawlError),

    /// The crawl task panicked or was aborted.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}
