use compute::error::ComputeError;
use thiserror::Error;
use tracing::error;

/// Error types for backend calls
#[derive(Error, Debug)]
pub enum ClientError {
    /// No base URL was configured
    #[error("API base URL is not configured")]
    MissingBaseUrl,

    /// The configured base URL does not parse
    #[error("Invalid API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The backend answered with a non-2xx status
    #[error("HTTP error: {status}")]
    Transport { status: u16, body: String },

    /// The request never produced a response (connection, timeout, ...)
    #[error("Request failed: {0}")]
    Request(String),

    /// The request could not be built from the filters
    #[error(transparent)]
    Compute(#[from] ComputeError),
}

impl ClientError {
    /// HTTP status of a transport error.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Raw response body of a transport error, or the error text otherwise.
    pub fn body(&self) -> String {
        match self {
            ClientError::Transport { body, .. } => body.clone(),
            other => other.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(e: reqwest::Error) -> Self {
        let err = ClientError::Request(e.to_string());
        error!(?err, timeout = e.is_timeout(), "Backend request failed");
        err
    }
}

/// Type alias for Result with ClientError
pub type Result<T> = std::result::Result<T, ClientError>;
