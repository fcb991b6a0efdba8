use model::errors::GeoError;
use thiserror::Error;

/// Errors raised while loading or validating crawl settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Failed to read settings file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// An environment variable was set but could not be parsed.
    #[error("Invalid value {value:?} for {key}: {reason}")]
    InvalidEnv {
        key: String,
        value: String,
        reason: String,
    },

    /// A numeric setting that must be positive was zero.
    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("Invalid crawl region: {0}")]
    Region(#[from] GeoError),

    #[error("Invalid setting {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}
