//! Error types for the web tools

use thiserror::Error;

/// Errors raised by the search and scrape tools
#[derive(Debug, Error)]
pub enum WebToolError {
    /// Tool input did not match its schema
    #[error("Invalid parameters: {0}")]
    InvalidParameters(String),

    /// API key required by the tool is not configured
    #[error("{0} is not set")]
    MissingApiKey(&'static str),

    /// URL could not be used
    #[error("Invalid URL {url}: {reason}")]
    InvalidUrl {
        url: String,
        reason: String,
    },

    /// Remote server answered with a non-success status
    #[error("HTTP {status} from {url}")]
    HttpStatus {
        url: String,
        status: u16,
    },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Response body could not be decoded
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Tools report failures through the core error type
impl From<WebToolError> for crew_core::Error {
    fn from(err: WebToolError) -> Self {
        crew_core::Error::ProcessingFailed(err.to_string())
    }
}
