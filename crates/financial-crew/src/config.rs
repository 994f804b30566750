//! Configuration for the financial analysis crew

use crate::error::{AppError, Result};
use crew_utils::{env_or, env_parse_or};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable names read by [`AppConfig::from_env`]
pub mod env {
    pub const BIND_ADDR: &str = "BIND_ADDR";
    pub const AGENT_MODEL: &str = "OPENAI_MODEL_NAME";
    pub const MANAGER_MODEL: &str = "MANAGER_MODEL";
    pub const MANAGER_TEMPERATURE: &str = "MANAGER_TEMPERATURE";
    pub const MAX_ITERATIONS: &str = "MAX_ITERATIONS";
    pub const REQUEST_TIMEOUT_SECS: &str = "REQUEST_TIMEOUT_SECS";
}

/// Settings for the web page and the crew it launches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Address the web page listens on
    pub bind_addr: String,

    /// Model used by the four analyst agents
    pub agent_model: String,

    /// Sampling temperature of the analyst agents
    pub agent_temperature: f32,

    /// Model used by the coordinating manager
    pub manager_model: String,

    /// Sampling temperature of the manager
    pub manager_temperature: f32,

    /// Tool-calling round trips allowed per agent and task
    pub max_iterations: usize,

    /// Timeout for LLM and tool HTTP requests
    pub request_timeout: Duration,

    /// Characters of page text the scrape tool hands back
    pub scrape_max_chars: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8501".to_string(),
            agent_model: "gpt-4o-mini".to_string(),
            agent_temperature: 0.7,
            manager_model: "gpt-3.5-turbo".to_string(),
            manager_temperature: 0.7,
            max_iterations: 15,
            request_timeout: Duration::from_secs(180),
            scrape_max_chars: 12_000,
        }
    }
}

impl AppConfig {
    /// Create a new configuration builder
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// Read the configuration from the environment
    ///
    /// Unset or empty variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        let config = Self {
            bind_addr: env_or(env::BIND_ADDR, &defaults.bind_addr),
            agent_model: env_or(env::AGENT_MODEL, &defaults.agent_model),
            agent_temperature: defaults.agent_temperature,
            manager_model: env_or(env::MANAGER_MODEL, &defaults.manager_model),
            manager_temperature: env_parse_or(
                env::MANAGER_TEMPERATURE,
                defaults.manager_temperature,
            )?,
            max_iterations: env_parse_or(env::MAX_ITERATIONS, defaults.max_iterations)?,
            request_timeout: Duration::from_secs(env_parse_or(
                env::REQUEST_TIMEOUT_SECS,
                defaults.request_timeout.as_secs(),
            )?),
            scrape_max_chars: defaults.scrape_max_chars,
        };

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.max_iterations == 0 {
            return Err(AppError::Config(
                "max_iterations must be greater than 0".to_string(),
            ));
        }

        for (name, value) in [
            ("agent_temperature", self.agent_temperature),
            ("manager_temperature", self.manager_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(AppError::Config(format!(
                    "{name} must be between 0.0 and 2.0, got {value}"
                )));
            }
        }

        if self.bind_addr.trim().is_empty() {
            return Err(AppError::Config("bind_addr must not be empty".to_string()));
        }

        Ok(())
    }
}

/// Builder for AppConfig
#[derive(Debug, Default)]
pub struct AppConfigBuilder {
    bind_addr: Option<String>,
    agent_model: Option<String>,
    agent_temperature: Option<f32>,
    manager_model: Option<String>,
    manager_temperature: Option<f32>,
    max_iterations: Option<usize>,
    request_timeout: Option<Duration>,
    scrape_max_chars: Option<usize>,
}

impl AppConfigBuilder {
    /// Set the listen address
    pub fn bind_addr(mut self, addr: impl Into<String>) -> Self {
        self.bind_addr = Some(addr.into());
        self
    }

    /// Set the analyst model
    pub fn agent_model(mut self, model: impl Into<String>) -> Self {
        self.agent_model = Some(model.into());
        self
    }

    /// Set the analyst temperature
    pub fn agent_temperature(mut self, temperature: f32) -> Self {
        self.agent_temperature = Some(temperature);
        self
    }

    /// Set the manager model
    pub fn manager_model(mut self, model: impl Into<String>) -> Self {
        self.manager_model = Some(model.into());
        self
    }

    /// Set the manager temperature
    pub fn manager_temperature(mut self, temperature: f32) -> Self {
        self.manager_temperature = Some(temperature);
        self
    }

    /// Set maximum tool-calling iterations
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = Some(max);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set the scrape character budget
    pub fn scrape_max_chars(mut self, max_chars: usize) -> Self {
        self.scrape_max_chars = Some(max_chars);
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<AppConfig> {
        let defaults = AppConfig::default();

        let config = AppConfig {
            bind_addr: self.bind_addr.unwrap_or(defaults.bind_addr),
            agent_model: self.agent_model.unwrap_or(defaults.agent_model),
            agent_temperature: self.agent_temperature.unwrap_or(defaults.agent_temperature),
            manager_model: self.manager_model.unwrap_or(defaults.manager_model),
            manager_temperature: self
                .manager_temperature
                .unwrap_or(defaults.manager_temperature),
            max_iterations: self.max_iterations.unwrap_or(defaults.max_iterations),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            scrape_max_chars: self.scrape_max_chars.unwrap_or(defaults.scrape_max_chars),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.bind_addr, "0.0.0.0:8501");
        assert_eq!(config.manager_model, "gpt-3.5-turbo");
        assert!((config.manager_temperature - 0.7).abs() < f32::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder() {
        let config = AppConfig::builder()
            .agent_model("gpt-4o")
            .manager_temperature(0.2)
            .max_iterations(5)
            .request_timeout(Duration::from_secs(30))
            .build()
            .unwrap();

        assert_eq!(config.agent_model, "gpt-4o");
        assert_eq!(config.max_iterations, 5);
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert_eq!(config.manager_model, "gpt-3.5-turbo");
    }

    #[test]
    fn test_validation() {
        assert!(matches!(
            AppConfig::builder().max_iterations(0).build(),
            Err(AppError::Config(_))
        ));

        let err = AppConfig::builder()
            .manager_temperature(2.5)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("manager_temperature"));

        assert!(AppConfig::builder().agent_temperature(-0.1).build().is_err());
        assert!(AppConfig::builder().bind_addr(" ").build().is_err());
    }
}
