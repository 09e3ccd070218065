//! Error types at each collaborator boundary.
//!
//! Reference and generation failures are always recovered by the caller
//! (sentinels / fallback strings); store failures surface as 5xx.

/// Failures talking to the public reference API.
#[derive(Debug, thiserror::Error)]
pub enum ReferenceError {
    #[error("reference request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("reference API returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    #[error("malformed reference data: {0}")]
    Malformed(String),
}

/// Failures talking to the text-generation gateway.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("generation is disabled by configuration")]
    Disabled,

    #[error("generation service unavailable: {0}")]
    Unavailable(String),

    #[error("generation request failed: {0}")]
    Request(String),

    #[error("generation returned no text")]
    EmptyResponse,
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Request(e.to_string())
    }
}

/// Failures of the catalog store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("catalog is empty")]
    Empty,

    #[error("invalid stored record: {0}")]
    InvalidRecord(String),
}

/// Startup configuration problems.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}
