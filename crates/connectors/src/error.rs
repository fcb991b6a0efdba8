use thiserror::Error;

/// Failures talking to the upstream search API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (DNS, connect, TLS, timeout, body read).
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Search API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The body was not the JSON we expected.
    #[error("Failed to decode search response: {0}")]
    Decode(String),

    /// The body was JSON but none of the known result layouts. `body` is the
    /// start of the response, kept for inspection.
    #[error("Unrecognised search response for page {page}: {body}")]
    UnexpectedLayout { page: u32, body: String },

    /// The client could not be configured.
    #[error("Invalid API client configuration: {0}")]
    Config(String),
}

/// All errors coming from the database layer.
#[derive(Debug, Error)]
pub enum DbError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// A statement ran but did not produce the expected result.
    #[error("Write error: {0}")]
    Write(String),
}

/// Errors happening while establishing a database connection.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Invalid connection URL: {0}")]
    InvalidUrl(String),

    #[error("Connection failed: {0}")]
    Connection(#[from] tokio_postgres::Error),

    #[error("TLS configuration error: {0}")]
    TlsConfig(#[from] native_tls::Error),
}
