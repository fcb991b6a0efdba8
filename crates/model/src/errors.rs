use thiserror::Error;

/// Errors raised while building bounding regions or partitioning them.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeoError {
    #[error("Invalid bounds: west ({west}) must be less than east ({east})")]
    InvertedLongitude { west: f64, east: f64 },

    #[error("Invalid bounds: south ({south}) must be less than north ({north})")]
    InvertedLatitude { south: f64, north: f64 },

    #[error("Coordinate '{name}' is not a finite number")]
    NonFinite { name: &'static str },

    #[error("Grid size must be at least 1")]
    ZeroGridSize,

    #[error("Grid size {n} exceeds the maximum of {max}")]
    GridTooLarge { n: usize, max: usize },
}

/// Raised by record normalizers when a raw item cannot become a domain record.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Missing required field '{0}'")]
    MissingField(String),

    #[error("Field '{field}' has an invalid value: {reason}")]
    InvalidField { field: String, reason: String },

    #[error("Unsupported payload: {0}")]
    UnsupportedPayload(String),
}

impl ValidationError {
    pub fn invalid(field: &str, reason: impl Into<String>) -> Self {
        ValidationError::InvalidField {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Short, stable label used in logs and rejected-item files.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::MissingField(_) => "missing_field",
            ValidationError::InvalidField { .. } => "invalid_field",
            ValidationError::UnsupportedPayload(_) => "unsupported_payload",
        }
    }
}
