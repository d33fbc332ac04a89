use std::num::ParseIntError;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("value for compromised check cannot be empty")]
    EmptyValue,

    #[error("invalid SHA-1 hex digest: {0:?}")]
    InvalidDigest(String),

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("HTTP request failed for {path}: {source}")]
    HttpRequest {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("unexpected API response status {status} for {path}")]
    HttpStatus { path: String, status: u16 },

    #[error("invalid occurrence count {count:?} in range response")]
    InvalidCount {
        suffix: String,
        count: String,
        #[source]
        source: ParseIntError,
    },

    #[cfg(feature = "tokio")]
    #[error("lookup task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

impl Error {
    /// Input was rejected before any cache or network activity.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::EmptyValue | Error::InvalidDigest(_))
    }

    /// The range request failed or returned a non-success status.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Client(_) | Error::HttpRequest { .. } | Error::HttpStatus { .. }
        )
    }

    /// The range response contained a malformed count for the matching suffix.
    pub fn is_parse(&self) -> bool {
        matches!(self, Error::InvalidCount { .. })
    }
}
