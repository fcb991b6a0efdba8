use connectors::error::ConnectorError;
use engine_config::error::SettingsError;
use engine_core::error::{ProgressError, SinkError, StateStoreError};
use engine_runtime::error::RuntimeError;
use model::errors::GeoError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid settings: {0}")]
    Settings(#[from] SettingsError),

    #[error("Crawl failed: {0}")]
    Runner(#[from] RuntimeError),

    #[error("Checkpoint error: {0}")]
    StateStore(#[from] StateStoreError),

    #[error("Failed to load progress: {0}")]
    Progress(#[from] ProgressError),

    #[error("Database connection failed: {0}")]
    Connector(#[from] ConnectorError),

    #[error("Database error: {0}")]
    Sink(#[from] SinkError),

    #[error("Invalid grid: {0}")]
    Grid(#[from] GeoError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
