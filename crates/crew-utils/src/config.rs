//! Environment configuration helpers
//!
//! Configuration is read once at startup. Values come from the process
//! environment, optionally seeded from a `.env` file in the working directory.

use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

/// Error raised when an environment variable holds an unparsable value
#[derive(Debug, Error)]
#[error("Invalid value for {name}: {value:?}")]
pub struct EnvError {
    /// Variable name
    pub name: String,
    /// Raw value found in the environment
    pub value: String,
}

/// Load variables from a `.env` file if one exists
///
/// Variables already present in the environment win over the file.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => tracing::warn!(error = %e, "Failed to load .env file"),
    }
}

/// Read a string variable, falling back to `default` when unset or empty
pub fn env_or(name: &str, default: &str) -> String {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

/// Read and parse a variable, falling back to `default` when unset or empty
pub fn env_parse_or<T: FromStr>(name: &str, default: T) -> Result<T, EnvError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|_| EnvError {
                name: name.to_string(),
                value,
            })
        }
        _ => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_or_default() {
        assert_eq!(
            env_or("CREW_UTILS_TEST_SURELY_UNSET", "fallback"),
            "fallback"
        );
    }

    #[test]
    fn test_env_parse_or() {
        unsafe {
            std::env::set_var("CREW_UTILS_TEST_NUMBER", "42");
            std::env::set_var("CREW_UTILS_TEST_BAD_NUMBER", "forty-two");
        }

        assert_eq!(env_parse_or("CREW_UTILS_TEST_NUMBER", 0_u32).unwrap(), 42);
        assert_eq!(env_parse_or("CREW_UTILS_TEST_MISSING_NUMBER", 7_u32).unwrap(), 7);

        let err = env_parse_or("CREW_UTILS_TEST_BAD_NUMBER", 0_u32).unwrap_err();
        assert_eq!(err.name, "CREW_UTILS_TEST_BAD_NUMBER");
        assert!(err.to_string().contains("forty-two"));

        unsafe {
            std::env::remove_var("CREW_UTILS_TEST_NUMBER");
            std::env::remove_var("CREW_UTILS_TEST_BAD_NUMBER");
        }
    }
}
