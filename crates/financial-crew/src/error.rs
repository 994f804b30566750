//! Error types for the financial analysis shell

use thiserror::Error;

/// Errors raised while preparing or running an analysis
#[derive(Debug, Error)]
pub enum AppError {
    /// A task template referenced a field the request does not have
    #[error("Template error: {0}")]
    Template(#[from] minijinja::Error),

    /// The crew engine failed or the model could not be reached
    #[error("Engine error: {0}")]
    Engine(#[from] crew_core::Error),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Unparsable environment variable
    #[error(transparent)]
    Env(#[from] crew_utils::EnvError),
}

/// Result type alias for shell operations
pub type Result<T> = std::result::Result<T, AppError>;

/// Convert AppError to crew_core::Error
impl From<AppError> for crew_core::Error {
    fn from(err: AppError) -> Self {
        match err {
            AppError::Engine(inner) => inner,
            other => crew_core::Error::ProcessingFailed(other.to_string()),
        }
    }
}
