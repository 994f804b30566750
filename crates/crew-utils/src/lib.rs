//! Shared utilities for financial-crew
//!
//! Logging setup and environment-variable helpers used by the binaries and the
//! application configuration.

pub mod config;
pub mod logging;

pub use config::{EnvError, env_or, env_parse_or, load_dotenv};
pub use logging::init_tracing_with;
