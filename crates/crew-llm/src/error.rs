//! Errors a model call can end with
//!
//! The runtime never retries: any of these ends the agent turn and surfaces
//! as a failed analysis.

use thiserror::Error;

/// Result type for model calls
pub type Result<T> = std::result::Result<T, LLMError>;

#[derive(Error, Debug)]
pub enum LLMError {
    /// Non-success status without a more specific variant
    #[error("API request failed: {0}")]
    RequestFailed(String),

    /// 401 from the endpoint, usually a missing or wrong `OPENAI_API_KEY`
    #[error("Invalid API key or authentication failed")]
    AuthenticationFailed,

    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),

    /// 400, e.g. a tool schema the endpoint refuses
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// 404, the configured agent or manager model is unknown to the endpoint
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Transport failure, including the request timeout
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Body did not match the chat-completions shape
    #[error("Unexpected response format: {0}")]
    UnexpectedResponse(String),
}

impl LLMError {
    /// Map a non-success HTTP status and its body for a call to `model`
    pub fn from_status(status: u16, model: &str, body: String) -> Self {
        match status {
            401 => Self::AuthenticationFailed,
            429 => Self::RateLimitExceeded(body),
            400 => Self::InvalidRequest(body),
            404 => Self::ModelNotFound(model.to_string()),
            _ => Self::RequestFailed(format!("HTTP {status}: {body}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            LLMError::from_status(401, "gpt-4o-mini", String::new()),
            LLMError::AuthenticationFailed
        ));
        assert!(matches!(
            LLMError::from_status(429, "gpt-4o-mini", "slow down".to_string()),
            LLMError::RateLimitExceeded(body) if body == "slow down"
        ));

        let missing = LLMError::from_status(404, "gpt-3.5-turbo", "{}".to_string());
        assert_eq!(missing.to_string(), "Model not found: gpt-3.5-turbo");

        let other = LLMError::from_status(503, "gpt-4o-mini", "overloaded".to_string());
        assert_eq!(other.to_string(), "API request failed: HTTP 503: overloaded");
    }
}
